//! Error type for `zoom-store-sqlite`.

use thiserror::Error;
use zoom_core::store::StoreError;

#[derive(Debug, Error)]
pub enum Error {
  #[error("{0}")]
  Core(#[from] zoom_core::Error),

  #[error("database error: {0}")]
  Database(#[from] tokio_rusqlite::Error),

  #[error("json error: {0}")]
  Json(#[from] serde_json::Error),

  #[error("uuid parse error: {0}")]
  Uuid(#[from] uuid::Error),

  /// The `id` column and the document's own `id` disagree.
  #[error("corrupt document in {table}: {detail}")]
  Corrupt { table: &'static str, detail: String },
}

impl StoreError for Error {
  fn as_core(&self) -> Option<&zoom_core::Error> {
    match self {
      Error::Core(e) => Some(e),
      _ => None,
    }
  }
}

pub type Result<T, E = Error> = std::result::Result<T, E>;
