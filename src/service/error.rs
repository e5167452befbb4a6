use std::fmt;

use thiserror::Error;
use uuid::Uuid;

/// Result type for collection operations
pub type ServiceResult<T> = Result<T, ServiceError>;

/// A required field that failed validation
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FieldError {
    pub field: &'static str,
    pub message: &'static str,
}

impl FieldError {
    pub fn new(field: &'static str, message: &'static str) -> Self {
        Self { field, message }
    }
}

fn join_messages(fields: &[FieldError]) -> String {
    fields
        .iter()
        .map(|e| e.message)
        .collect::<Vec<_>>()
        .join(", ")
}

/// How a missing record was addressed
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Lookup {
    Id(Uuid),
    Key { field: &'static str, value: String },
}

impl fmt::Display for Lookup {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Lookup::Id(id) => write!(f, "ID '{}'", id),
            Lookup::Key { field, value } => write!(f, "{} '{}'", field, value),
        }
    }
}

/// Business outcomes of a collection operation
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ServiceError {
    /// Input is missing a required field
    #[error("invalid {kind}: {}", join_messages(.fields))]
    Validation {
        kind: &'static str,
        fields: Vec<FieldError>,
    },

    /// A record with the same key already exists
    #[error("The {kind} '{key}' already exists")]
    Conflict { kind: &'static str, key: String },

    /// No live record for the id or key
    #[error("The {kind} with {lookup} does not exist")]
    NotFound { kind: &'static str, lookup: Lookup },
}
