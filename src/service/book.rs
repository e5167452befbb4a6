use serde::{Deserialize, Deserializer, Serialize};

use super::{FieldError, Payload, Searchable};
use crate::store::Keyed;

/// Book payload: the title is unique within the collection
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Book {
    #[serde(default, deserialize_with = "nullable_string")]
    pub title: String,
    #[serde(default, deserialize_with = "nullable_string")]
    pub author: String,
}

impl Book {
    pub fn new(title: impl Into<String>, author: impl Into<String>) -> Self {
        Self {
            title: title.into(),
            author: author.into(),
        }
    }
}

impl Keyed for Book {
    fn key(&self) -> &str {
        &self.title
    }
}

impl Payload for Book {
    const KIND: &'static str = "book";
    const KEY_FIELD: &'static str = "title";

    fn validate(&self) -> Result<(), Vec<FieldError>> {
        // author may be blank
        if self.title.trim().is_empty() {
            return Err(vec![FieldError::new("title", "title is required")]);
        }
        Ok(())
    }
}

impl Searchable for Book {}

/// Treat an explicit JSON `null` like a missing field
pub(crate) fn nullable_string<'de, D>(deserializer: D) -> Result<String, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(Option::<String>::deserialize(deserializer)?.unwrap_or_default())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_missing_fields_deserialize_blank() {
        let book: Book = serde_json::from_str(r#"{"author": null}"#).unwrap();
        assert_eq!(book, Book::new("", ""));
        assert_eq!(
            book.validate(),
            Err(vec![FieldError::new("title", "title is required")])
        );
    }

    #[test]
    fn test_validate() {
        assert!(Book::new("Dune", "").validate().is_ok());
        assert!(Book::new(" \t", "Frank Herbert").validate().is_err());
    }
}
