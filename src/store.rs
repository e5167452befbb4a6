use std::collections::HashMap;
use std::sync::{PoisonError, RwLock, RwLockReadGuard, RwLockWriteGuard};

use serde::Serialize;
use uuid::{Builder, Uuid};

/// Values that carry the field their collection keeps unique
pub trait Keyed {
    /// Raw (not yet normalized) uniqueness field
    fn key(&self) -> &str;
}

/// Case-insensitive projection used for uniqueness checks
pub fn normalize(key: &str) -> String {
    key.to_lowercase()
}

/// A stored value together with its identifier
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Record<V> {
    pub id: Uuid,
    #[serde(flatten)]
    pub value: V,
}

struct Entry<V> {
    normalized_key: String,
    value: V,
}

impl<V: Keyed> Entry<V> {
    fn new(value: V) -> Self {
        Self {
            normalized_key: normalize(value.key()),
            value,
        }
    }
}

/// In-memory record store with case-insensitive key lookup
///
/// Every primitive takes the lock for a single step. `insert_unique` is the
/// only compound operation: its scan and insert share one write guard.
pub struct RecordStore<V> {
    data: RwLock<HashMap<Uuid, Entry<V>>>,
}

impl<V: Keyed + Clone> RecordStore<V> {
    /// Create a new empty store
    pub fn new() -> Self {
        Self {
            data: RwLock::new(HashMap::new()),
        }
    }

    // Every mutation is a single HashMap call, so a poisoned map is still consistent.
    fn read(&self) -> RwLockReadGuard<'_, HashMap<Uuid, Entry<V>>> {
        self.data.read().unwrap_or_else(PoisonError::into_inner)
    }

    fn write(&self) -> RwLockWriteGuard<'_, HashMap<Uuid, Entry<V>>> {
        self.data.write().unwrap_or_else(PoisonError::into_inner)
    }

    fn fresh_id(data: &HashMap<Uuid, Entry<V>>) -> Uuid {
        loop {
            let id = Builder::from_random_bytes(rand::random()).into_uuid();
            if !data.contains_key(&id) {
                return id;
            }
        }
    }

    fn find_in(data: &HashMap<Uuid, Entry<V>>, normalized: &str) -> Option<Record<V>> {
        data.iter()
            .find(|(_, entry)| entry.normalized_key == normalized)
            .map(|(id, entry)| Record {
                id: *id,
                value: entry.value.clone(),
            })
    }

    /// Allocate an identifier that no live record uses
    pub fn generate_id(&self) -> Uuid {
        Self::fresh_id(&self.read())
    }

    /// Find the first record whose key matches ignoring case
    ///
    /// Which record is returned when several match is unspecified.
    pub fn find_by_normalized_key(&self, key: &str) -> Option<Record<V>> {
        Self::find_in(&self.read(), &normalize(key))
    }

    /// Store a value under an id obtained from `generate_id`
    ///
    /// Does not check uniqueness. An id already in use is left untouched.
    pub fn insert(&self, id: Uuid, value: V) {
        self.write().entry(id).or_insert_with(|| Entry::new(value));
    }

    /// Insert the value under a fresh id unless a record with the same
    /// normalized key exists, in which case that record is returned as `Err`
    pub fn insert_unique(&self, value: V) -> Result<Record<V>, Record<V>> {
        let mut data = self.write();
        if let Some(existing) = Self::find_in(&data, &normalize(value.key())) {
            return Err(existing);
        }

        let id = Self::fresh_id(&data);
        data.insert(id, Entry::new(value.clone()));
        Ok(Record { id, value })
    }

    /// Get the record stored at `id`
    pub fn get(&self, id: &Uuid) -> Option<Record<V>> {
        self.read().get(id).map(|entry| Record {
            id: *id,
            value: entry.value.clone(),
        })
    }

    /// Overwrite the value at `id`, returning the previous record
    ///
    /// Returns `None` and stores nothing when `id` is absent.
    pub fn replace(&self, id: &Uuid, value: V) -> Option<Record<V>> {
        let mut data = self.write();
        let entry = data.get_mut(id)?;
        let previous = std::mem::replace(entry, Entry::new(value));
        Some(Record {
            id: *id,
            value: previous.value,
        })
    }

    /// Remove the record at `id`, if any
    pub fn remove(&self, id: &Uuid) -> Option<Record<V>> {
        self.write().remove(id).map(|entry| Record {
            id: *id,
            value: entry.value,
        })
    }

    /// Remove every record
    pub fn clear(&self) {
        self.write().clear();
    }

    /// Number of live records
    pub fn len(&self) -> usize {
        self.read().len()
    }

    pub fn is_empty(&self) -> bool {
        self.read().is_empty()
    }
}

impl<V: Keyed + Clone> Default for RecordStore<V> {
    fn default() -> Self {
        Self::new()
    }
}
