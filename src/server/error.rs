use std::time::{SystemTime, UNIX_EPOCH};

use axum::Json;
use axum::extract::rejection::{JsonRejection, PathRejection, QueryRejection};
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use serde::Serialize;
use serde_json::{Map, Value};
use thiserror::Error;
use tracing::warn;

use crate::service::ServiceError;

/// Errors a handler can answer with
///
/// Requests whose body, path or query cannot be decoded never reach the
/// service; they are answered with 400 and the same JSON body shape.
#[derive(Debug, Error)]
pub enum ApiError {
    #[error(transparent)]
    Service(#[from] ServiceError),

    #[error("{}", .0.body_text())]
    Body(#[from] JsonRejection),

    #[error("{}", .0.body_text())]
    Path(#[from] PathRejection),

    #[error("{}", .0.body_text())]
    Query(#[from] QueryRejection),
}

/// Body for conflict and not-found responses
#[derive(Debug, Serialize)]
pub struct ExceptionResponse {
    pub timestamp: u64,
    pub message: String,
}

/// Body for validation failures, one `{field: message}` object per field
#[derive(Debug, Serialize)]
pub struct ValidationResponse {
    pub timestamp: u64,
    pub errors: Vec<Map<String, Value>>,
}

fn timestamp_ms() -> u64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|d| d.as_millis() as u64)
        .unwrap_or(0)
}

impl ServiceError {
    /// HTTP status for this outcome
    pub fn status_code(&self) -> StatusCode {
        match self {
            ServiceError::Validation { .. } => StatusCode::BAD_REQUEST,
            ServiceError::Conflict { .. } => StatusCode::CONFLICT,
            ServiceError::NotFound { .. } => StatusCode::NOT_FOUND,
        }
    }
}

impl IntoResponse for ServiceError {
    fn into_response(self) -> Response {
        let status = self.status_code();
        let timestamp = timestamp_ms();
        match self {
            ServiceError::Validation { fields, .. } => {
                let errors = fields
                    .into_iter()
                    .map(|e| {
                        let mut obj = Map::new();
                        obj.insert(e.field.to_string(), Value::from(e.message));
                        obj
                    })
                    .collect();
                (status, Json(ValidationResponse { timestamp, errors })).into_response()
            }
            other => {
                let body = ExceptionResponse {
                    timestamp,
                    message: other.to_string(),
                };
                (status, Json(body)).into_response()
            }
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        match self {
            ApiError::Service(err) => err.into_response(),
            rejected => {
                warn!("Malformed request: {}", rejected);
                let body = ExceptionResponse {
                    timestamp: timestamp_ms(),
                    message: rejected.to_string(),
                };
                (StatusCode::BAD_REQUEST, Json(body)).into_response()
            }
        }
    }
}
