//! HTTP routes for the book and word collections

use axum::extract::{FromRequest, FromRequestParts, State};
use axum::http::StatusCode;
use axum::routing::{MethodRouter, get, post};
use axum::{Json, Router};
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::error::ApiError;
use crate::service::{Book, CollectionService, Payload, Word};
use crate::store::Record;

/// JSON request body, rejected with an `ApiError`
#[derive(FromRequest)]
#[from_request(via(axum::Json), rejection(ApiError))]
pub struct Body<T>(pub T);

/// Path parameters, rejected with an `ApiError`
#[derive(FromRequestParts)]
#[from_request(via(axum::extract::Path), rejection(ApiError))]
pub struct Path<T>(pub T);

/// Query string, rejected with an `ApiError`
#[derive(FromRequestParts)]
#[from_request(via(axum::extract::Query), rejection(ApiError))]
pub struct Query<T>(pub T);

/// Trait alias for payloads that can travel over HTTP
pub trait JsonPayload: Payload + Serialize + DeserializeOwned {}

impl<P: Payload + Serialize + DeserializeOwned> JsonPayload for P {}

#[derive(Debug, Deserialize)]
pub struct TitleQuery {
    pub title: String,
}

async fn create<P: JsonPayload>(
    State(service): State<CollectionService<P>>,
    Body(input): Body<P>,
) -> Result<(StatusCode, Json<Record<P>>), ApiError> {
    let record = service.create(input)?;
    Ok((StatusCode::CREATED, Json(record)))
}

async fn read<P: JsonPayload>(
    State(service): State<CollectionService<P>>,
    Path(id): Path<Uuid>,
) -> Result<Json<Record<P>>, ApiError> {
    Ok(Json(service.read(id)?))
}

async fn update<P: JsonPayload>(
    State(service): State<CollectionService<P>>,
    Path(id): Path<Uuid>,
    Body(input): Body<P>,
) -> Result<Json<Record<P>>, ApiError> {
    Ok(Json(service.update(id, input)?))
}

async fn delete<P: JsonPayload>(
    State(service): State<CollectionService<P>>,
    Path(id): Path<Uuid>,
) -> StatusCode {
    service.delete(id);
    StatusCode::NO_CONTENT
}

async fn delete_all<P: JsonPayload>(State(service): State<CollectionService<P>>) -> StatusCode {
    service.delete_all();
    StatusCode::NO_CONTENT
}

async fn read_by_title(
    State(service): State<CollectionService<Book>>,
    Query(query): Query<TitleQuery>,
) -> Result<Json<Record<Book>>, ApiError> {
    Ok(Json(service.read_by_key(&query.title)?))
}

fn item_routes<P: JsonPayload>() -> MethodRouter<CollectionService<P>> {
    get(read::<P>).put(update::<P>).delete(delete::<P>)
}

/// `/books` routes
pub fn book_routes(service: CollectionService<Book>) -> Router {
    Router::new()
        .route(
            "/",
            post(create::<Book>)
                .get(read_by_title)
                .delete(delete_all::<Book>),
        )
        .route("/:id", item_routes::<Book>())
        .with_state(service)
}

/// `/words` routes
pub fn word_routes(service: CollectionService<Word>) -> Router {
    Router::new()
        .route("/", post(create::<Word>).delete(delete_all::<Word>))
        .route("/:id", item_routes::<Word>())
        .with_state(service)
}
