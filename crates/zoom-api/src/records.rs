//! Handlers shared by the three record collections.
//!
//! | Method   | Path                  | Notes |
//! |----------|-----------------------|-------|
//! | `GET`    | `/{collection}`       | Insertion order |
//! | `POST`   | `/{collection}`       | 201 + created record |
//! | `PUT`    | `/{collection}/{id}`  | Partial body; unknown fields are 400 |
//! | `DELETE` | `/{collection}/{id}`  | `{"message":"<Kind> deleted"}` |
//!
//! Each handler is generic over the record kind; the router instantiates one
//! copy per collection.

use axum::{
  Json,
  extract::{FromRequest, FromRequestParts, Path, Request, State},
  http::{StatusCode, request::Parts},
  response::IntoResponse,
};
use serde::de::DeserializeOwned;
use serde_json::json;
use uuid::Uuid;
use zoom_core::{Record, store::PropertyStore};

use crate::{ApiState, error::ApiError};

// ─── Extractors ──────────────────────────────────────────────────────────────

/// A JSON body whose rejection (malformed JSON, missing or unknown fields)
/// renders as a 400 in the API's error shape.
pub struct ValidJson<T>(pub T);

impl<T, St> FromRequest<St> for ValidJson<T>
where
  T: DeserializeOwned,
  St: Send + Sync,
{
  type Rejection = ApiError;

  async fn from_request(req: Request, state: &St) -> Result<Self, Self::Rejection> {
    let Json(value) = Json::<T>::from_request(req, state)
      .await
      .map_err(|e| ApiError::BadRequest(e.body_text()))?;
    Ok(Self(value))
  }
}

/// The `{id}` path segment. An id that is not a UUID cannot name a record,
/// so it is a 404 rather than a 400.
pub struct RecordId(pub Uuid);

impl<St> FromRequestParts<St> for RecordId
where
  St: Send + Sync,
{
  type Rejection = ApiError;

  async fn from_request_parts(
    parts: &mut Parts,
    state: &St,
  ) -> Result<Self, Self::Rejection> {
    let Path(raw) = Path::<String>::from_request_parts(parts, state)
      .await
      .map_err(|e| ApiError::BadRequest(e.body_text()))?;
    Uuid::parse_str(&raw)
      .map(Self)
      .map_err(|_| ApiError::NotFound(format!("no record with id {raw}")))
  }
}

// ─── List ────────────────────────────────────────────────────────────────────

/// `GET /{collection}`
pub async fn list<S, E>(
  State(state): State<ApiState<S>>,
) -> Result<Json<Vec<E>>, ApiError>
where
  S: PropertyStore,
  E: Record,
{
  let records = state
    .store
    .list::<E>()
    .await
    .map_err(ApiError::from_store)?;
  Ok(Json(records))
}

// ─── Create ──────────────────────────────────────────────────────────────────

/// `POST /{collection}`
pub async fn create<S, E>(
  State(state): State<ApiState<S>>,
  ValidJson(input): ValidJson<E::New>,
) -> Result<impl IntoResponse, ApiError>
where
  S: PropertyStore,
  E: Record,
{
  let record = state
    .store
    .create::<E>(input)
    .await
    .map_err(ApiError::from_store)?;
  Ok((StatusCode::CREATED, Json(record)))
}

// ─── Update ──────────────────────────────────────────────────────────────────

/// `PUT /{collection}/{id}`
pub async fn update<S, E>(
  State(state): State<ApiState<S>>,
  RecordId(id): RecordId,
  ValidJson(patch): ValidJson<E::Patch>,
) -> Result<Json<E>, ApiError>
where
  S: PropertyStore,
  E: Record,
{
  let record = state
    .store
    .update::<E>(id, patch)
    .await
    .map_err(ApiError::from_store)?;
  Ok(Json(record))
}

// ─── Delete ──────────────────────────────────────────────────────────────────

/// `DELETE /{collection}/{id}`
pub async fn delete<S, E>(
  State(state): State<ApiState<S>>,
  RecordId(id): RecordId,
) -> Result<impl IntoResponse, ApiError>
where
  S: PropertyStore,
  E: Record,
{
  state
    .store
    .delete::<E>(id)
    .await
    .map_err(ApiError::from_store)?;
  Ok(Json(json!({ "message": format!("{} deleted", E::KIND.label()) })))
}
