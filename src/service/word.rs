use serde::{Deserialize, Serialize};

use super::book::nullable_string;
use super::{FieldError, Payload};
use crate::store::Keyed;

/// A single word, unique within the collection ignoring case
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Word {
    #[serde(default, deserialize_with = "nullable_string")]
    pub word: String,
}

impl Word {
    pub fn new(word: impl Into<String>) -> Self {
        Self { word: word.into() }
    }
}

impl Keyed for Word {
    fn key(&self) -> &str {
        &self.word
    }
}

impl Payload for Word {
    const KIND: &'static str = "word";
    const KEY_FIELD: &'static str = "word";

    fn validate(&self) -> Result<(), Vec<FieldError>> {
        if self.word.trim().is_empty() {
            return Err(vec![FieldError::new("word", "word is required")]);
        }
        Ok(())
    }
}
