//! Collection services
//!
//! A `CollectionService` owns the create/read/update/delete protocol for one
//! resource type on top of a shared `RecordStore`. Creation is the only
//! operation that enforces key uniqueness; updates may collide with another
//! record's key and are accepted as-is.

pub mod book;
pub mod error;
pub mod word;

use std::sync::Arc;

use tracing::{info, warn};
use uuid::Uuid;

use crate::store::{Keyed, Record, RecordStore};

pub use book::Book;
pub use error::{FieldError, Lookup, ServiceError, ServiceResult};
pub use word::Word;

/// A resource type served by a collection
pub trait Payload: Keyed + Clone + Send + Sync + std::fmt::Debug + 'static {
    /// Resource noun used in messages ("book", "word")
    const KIND: &'static str;
    /// Name of the field that must stay unique
    const KEY_FIELD: &'static str;

    /// Check required fields
    fn validate(&self) -> Result<(), Vec<FieldError>>;
}

/// Resource types whose collection can be queried by key
pub trait Searchable: Payload {}

/// CRUD protocol for one resource type
pub struct CollectionService<P> {
    store: Arc<RecordStore<P>>,
}

impl<P> Clone for CollectionService<P> {
    fn clone(&self) -> Self {
        Self {
            store: Arc::clone(&self.store),
        }
    }
}

impl<P: Payload> CollectionService<P> {
    /// Create a service backed by the given store
    pub fn new(store: Arc<RecordStore<P>>) -> Self {
        Self { store }
    }

    fn validate(input: &P) -> ServiceResult<()> {
        input.validate().map_err(|fields| {
            warn!("Rejected {} {:?}: missing required fields", P::KIND, input);
            ServiceError::Validation {
                kind: P::KIND,
                fields,
            }
        })
    }

    fn not_found(id: Uuid) -> ServiceError {
        let err = ServiceError::NotFound {
            kind: P::KIND,
            lookup: Lookup::Id(id),
        };
        warn!("{}", err);
        err
    }

    /// Create a record unless one with the same key exists
    pub fn create(&self, input: P) -> ServiceResult<Record<P>> {
        info!("Create {}: {:?}", P::KIND, input);
        Self::validate(&input)?;

        let key = input.key().to_string();
        match self.store.insert_unique(input) {
            Ok(record) => {
                info!("{} created: {:?}", P::KIND, record);
                Ok(record)
            }
            Err(existing) => {
                let err = ServiceError::Conflict { kind: P::KIND, key };
                warn!("{} (existing id {})", err, existing.id);
                Err(err)
            }
        }
    }

    /// Read the record with the given id
    pub fn read(&self, id: Uuid) -> ServiceResult<Record<P>> {
        info!("Read {} with ID: {}", P::KIND, id);
        self.store.get(&id).ok_or_else(|| Self::not_found(id))
    }

    /// Replace the payload of an existing record
    ///
    /// Key uniqueness is not re-checked here.
    pub fn update(&self, id: Uuid, input: P) -> ServiceResult<Record<P>> {
        info!("Update {} with ID: {}", P::KIND, id);
        Self::validate(&input)?;

        match self.store.replace(&id, input.clone()) {
            Some(previous) => {
                info!("Updated {:?} to {:?}", previous.value, input);
                Ok(Record { id, value: input })
            }
            None => Err(Self::not_found(id)),
        }
    }

    /// Delete the record with the given id
    ///
    /// Deleting an unknown id succeeds. Returns whether a record was removed.
    pub fn delete(&self, id: Uuid) -> bool {
        info!("Delete {} with ID: {}", P::KIND, id);
        let removed = self.store.remove(&id);
        info!("{} deleted: {:?}", P::KIND, removed);
        removed.is_some()
    }

    /// Delete every record of this collection
    pub fn delete_all(&self) {
        info!("Delete all {}s ({} live)", P::KIND, self.store.len());
        self.store.clear();
    }
}

impl<P: Searchable> CollectionService<P> {
    /// Read a record by its key, ignoring case
    pub fn read_by_key(&self, key: &str) -> ServiceResult<Record<P>> {
        info!("Read {} by {}: {}", P::KIND, P::KEY_FIELD, key);
        self.store.find_by_normalized_key(key).ok_or_else(|| {
            let err = ServiceError::NotFound {
                kind: P::KIND,
                lookup: Lookup::Key {
                    field: P::KEY_FIELD,
                    value: key.to_string(),
                },
            };
            warn!("{}", err);
            err
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Barrier;

    fn books() -> CollectionService<Book> {
        CollectionService::new(Arc::new(RecordStore::new()))
    }

    fn words() -> CollectionService<Word> {
        CollectionService::new(Arc::new(RecordStore::new()))
    }

    #[test]
    fn test_create_then_read() {
        let service = books();
        let created = service
            .create(Book::new("Brave new world", "Aldous Huxley"))
            .unwrap();
        assert!(!created.id.is_nil());

        let read = service.read(created.id).unwrap();
        assert_eq!(read, created);
        assert_eq!(read.value, Book::new("Brave new world", "Aldous Huxley"));
    }

    #[test]
    fn test_create_conflict_ignores_case() {
        let service = words();
        service.create(Word::new("Hello")).unwrap();

        let err = service.create(Word::new("HELLO")).unwrap_err();
        assert_eq!(
            err,
            ServiceError::Conflict {
                kind: "word",
                key: "HELLO".to_string(),
            }
        );
    }

    #[test]
    fn test_create_validation() {
        let err = books().create(Book::new("  ", "Someone")).unwrap_err();
        assert!(matches!(err, ServiceError::Validation { kind: "book", .. }));

        let err = words().create(Word::new("")).unwrap_err();
        assert_eq!(
            err,
            ServiceError::Validation {
                kind: "word",
                fields: vec![FieldError::new("word", "word is required")],
            }
        );
    }

    #[test]
    fn test_blank_author_allowed() {
        let created = books().create(Book::new("Brave new world", "")).unwrap();
        assert_eq!(created.value.author, "");
    }

    #[test]
    fn test_delete_is_idempotent() {
        let service = words();
        let created = service.create(Word::new("gone")).unwrap();

        assert!(service.delete(created.id));
        assert!(!service.delete(created.id));
        assert!(!service.delete(Uuid::from_u128(0x5eed)));
        assert!(matches!(
            service.read(created.id),
            Err(ServiceError::NotFound { .. })
        ));
    }

    #[test]
    fn test_unknown_id_not_found() {
        let service = books();
        let id = Uuid::from_u128(0x5eed);
        let expected = ServiceError::NotFound {
            kind: "book",
            lookup: Lookup::Id(id),
        };

        assert_eq!(service.read(id).unwrap_err(), expected);
        assert_eq!(
            service.update(id, Book::new("1984", "George Orwell")).unwrap_err(),
            expected
        );
    }

    #[test]
    fn test_deleted_id_not_found() {
        let service = books();
        let created = service.create(Book::new("Dune", "Frank Herbert")).unwrap();
        assert!(service.delete(created.id));

        let expected = ServiceError::NotFound {
            kind: "book",
            lookup: Lookup::Id(created.id),
        };
        assert_eq!(
            service
                .update(created.id, Book::new("Dune", "Frank Herbert"))
                .unwrap_err(),
            expected
        );
        assert_eq!(service.read(created.id).unwrap_err(), expected);
        assert!(!service.delete(created.id));
        // the failed update did not resurrect the record
        assert!(service.read_by_key("Dune").is_err());
    }

    #[test]
    fn test_update_keeps_id_and_allows_collision() {
        let service = books();
        let first = service.create(Book::new("Dune", "Frank Herbert")).unwrap();
        let second = service.create(Book::new("Emma", "Jane Austen")).unwrap();

        let updated = service
            .update(second.id, Book::new("DUNE", "Someone Else"))
            .unwrap();
        assert_eq!(updated.id, second.id);
        assert_eq!(service.read(second.id).unwrap().value.title, "DUNE");
        assert_eq!(service.read(first.id).unwrap().value.title, "Dune");
    }

    #[test]
    fn test_update_validation_precedes_lookup() {
        let err = words().update(Uuid::from_u128(0x5eed), Word::new(" ")).unwrap_err();
        assert!(matches!(err, ServiceError::Validation { .. }));
    }

    #[test]
    fn test_read_by_key() {
        let service = books();
        let created = service.create(Book::new("Dune", "Frank Herbert")).unwrap();

        assert_eq!(service.read_by_key("dUNE").unwrap(), created);
        assert_eq!(
            service.read_by_key("Emma").unwrap_err(),
            ServiceError::NotFound {
                kind: "book",
                lookup: Lookup::Key {
                    field: "title",
                    value: "Emma".to_string(),
                },
            }
        );
    }

    #[test]
    fn test_delete_all() {
        let service = words();
        let ids: Vec<_> = ["a", "b", "c"]
            .iter()
            .map(|w| service.create(Word::new(*w)).unwrap().id)
            .collect();

        service.delete_all();
        for id in ids {
            assert!(service.read(id).is_err());
        }
        // keys are free again
        assert!(service.create(Word::new("a")).is_ok());
    }

    #[test]
    fn test_concurrent_create_same_key() {
        const THREADS: usize = 50;
        let service = books();
        let barrier = Barrier::new(THREADS);

        let results: Vec<_> = std::thread::scope(|s| {
            let handles: Vec<_> = (0..THREADS)
                .map(|i| {
                    let service = service.clone();
                    let barrier = &barrier;
                    s.spawn(move || {
                        barrier.wait();
                        service.create(Book::new("Dup", &format!("author {}", i)))
                    })
                })
                .collect();
            handles.into_iter().map(|h| h.join().unwrap()).collect()
        });

        let created = results.iter().filter(|r| r.is_ok()).count();
        let conflicts = results
            .iter()
            .filter(|r| matches!(r, Err(ServiceError::Conflict { .. })))
            .count();
        assert_eq!(created, 1);
        assert_eq!(conflicts, THREADS - 1);
    }

    #[test]
    fn test_book_lifecycle() {
        let service = books();
        let created = service
            .create(Book::new("Brave new world", "Aldous Huxley"))
            .unwrap();

        let err = service
            .create(Book::new("Brave new world", "Aldous Huxley"))
            .unwrap_err();
        assert_eq!(err.to_string(), "The book 'Brave new world' already exists");

        let read = service.read(created.id).unwrap();
        assert_eq!(read.value.title, "Brave new world");
        assert_eq!(read.value.author, "Aldous Huxley");

        service
            .update(created.id, Book::new("1984", "George Orwell"))
            .unwrap();
        let read = service.read(created.id).unwrap();
        assert_eq!(read.value, Book::new("1984", "George Orwell"));

        assert!(service.delete(created.id));
        assert!(service.read(created.id).is_err());
    }
}
