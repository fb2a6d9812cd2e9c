//! API error type and [`axum::response::IntoResponse`] implementation.

use axum::{
  Json,
  http::StatusCode,
  response::{IntoResponse, Response},
};
use serde_json::json;
use thiserror::Error;
use tracing::error;
use zoom_core::store::StoreError;

/// An error returned by a record handler. Rendered as `{"error": "<message>"}`.
#[derive(Debug, Error)]
pub enum ApiError {
  #[error("not found: {0}")]
  NotFound(String),

  #[error("bad request: {0}")]
  BadRequest(String),

  #[error("conflict: {0}")]
  Conflict(String),

  #[error("store error: {0}")]
  Store(#[source] Box<dyn std::error::Error + Send + Sync>),
}

impl ApiError {
  /// Sort a store error into a client error or a fault by its domain cause.
  pub fn from_store<E: StoreError>(err: E) -> Self {
    let mapped = match err.as_core() {
      Some(e @ zoom_core::Error::Validation(_)) => Some(Self::BadRequest(e.to_string())),
      Some(e @ zoom_core::Error::NotFound { .. }) => Some(Self::NotFound(e.to_string())),
      Some(e @ zoom_core::Error::Duplicate(_)) => Some(Self::Conflict(e.to_string())),
      _ => None,
    };
    mapped.unwrap_or_else(|| Self::Store(Box::new(err)))
  }
}

impl IntoResponse for ApiError {
  fn into_response(self) -> Response {
    let (status, message) = match &self {
      ApiError::NotFound(m) => (StatusCode::NOT_FOUND, m.clone()),
      ApiError::BadRequest(m) => (StatusCode::BAD_REQUEST, m.clone()),
      ApiError::Conflict(m) => (StatusCode::CONFLICT, m.clone()),
      ApiError::Store(e) => {
        error!(error = %e, "store fault");
        (StatusCode::INTERNAL_SERVER_ERROR, e.to_string())
      }
    };
    (status, Json(json!({ "error": message }))).into_response()
  }
}
