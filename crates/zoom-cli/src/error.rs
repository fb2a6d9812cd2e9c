//! Error type for the client side.

use reqwest::StatusCode;
use thiserror::Error;
use uuid::Uuid;
use zoom_core::{RecordKind, Role};

#[derive(Debug, Error)]
pub enum ClientError {
  /// The request never produced a response: refused connection, DNS
  /// failure or timeout.
  #[error("Cannot reach the server ({0}). Check that it is running.")]
  Connectivity(String),

  /// The server rejected the credentials.
  #[error("{0}")]
  Unauthorized(String),

  #[error("{0}")]
  Validation(String),

  #[error("{0}")]
  NotFound(String),

  #[error("{0}")]
  Conflict(String),

  #[error("server error ({status}): {message}")]
  Server { status: u16, message: String },

  #[error("unexpected response body: {0}")]
  Decode(String),

  #[error("failed to build HTTP client: {0}")]
  Build(String),

  // ── Local failures; nothing was sent ─────────────────────────────────────
  #[error("only the {0} may do this")]
  Forbidden(Role),

  #[error("not logged in")]
  NotLoggedIn,

  #[error("{kind} {id} is not in the local snapshot")]
  UnknownRecord { kind: RecordKind, id: Uuid },

  #[error("You are in the tenant role. Log in with the admin role instead.")]
  WrongLoginRole,
}

pub type Result<T, E = ClientError> = std::result::Result<T, E>;

impl ClientError {
  /// Classify a failed send.
  pub(crate) fn from_send(err: reqwest::Error) -> Self {
    Self::Connectivity(err.to_string())
  }

  /// Classify a failure while reading a response body.
  pub(crate) fn from_body(err: reqwest::Error) -> Self {
    if err.is_decode() {
      Self::Decode(err.to_string())
    } else {
      Self::Connectivity(err.to_string())
    }
  }

  /// Map a non-success status and the server's message.
  pub(crate) fn from_status(status: StatusCode, message: String) -> Self {
    match status {
      StatusCode::BAD_REQUEST => Self::Validation(message),
      StatusCode::UNAUTHORIZED => Self::Unauthorized(message),
      StatusCode::NOT_FOUND => Self::NotFound(message),
      StatusCode::CONFLICT => Self::Conflict(message),
      _ => Self::Server { status: status.as_u16(), message },
    }
  }

  /// True when the failure happened before anything reached the network.
  pub fn is_local(&self) -> bool {
    matches!(
      self,
      Self::Forbidden(_)
        | Self::NotLoggedIn
        | Self::UnknownRecord { .. }
        | Self::WrongLoginRole
    )
  }
}
