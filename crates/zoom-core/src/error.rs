//! Error types for `zoom-core`.

use thiserror::Error;
use uuid::Uuid;

use crate::record::RecordKind;

#[derive(Debug, Error)]
pub enum Error {
  /// A required field is missing or a field value is out of range.
  #[error("validation failed: {0}")]
  Validation(String),

  #[error("{kind} not found: {id}")]
  NotFound { kind: RecordKind, id: Uuid },

  /// A uniqueness constraint (tenant username) would be violated.
  #[error("duplicate {0}: the username is already taken")]
  Duplicate(RecordKind),

  #[error("serialization error: {0}")]
  Serialization(#[from] serde_json::Error),
}

pub type Result<T, E = Error> = std::result::Result<T, E>;

/// Reject blank values for a required text field.
pub(crate) fn require(field: &'static str, value: &str) -> Result<()> {
  if value.trim().is_empty() {
    return Err(Error::Validation(format!("{field} is required")));
  }
  Ok(())
}
