//! `POST /login`.
//!
//! Unlike the record handlers, every response here has the
//! [`LoginResponse`] shape, failures included.

use axum::{
  Json,
  extract::{State, rejection::JsonRejection},
  http::StatusCode,
};
use tracing::error;
use zoom_core::{
  auth::{AuthError, LoginRequest, LoginResponse},
  store::PropertyStore,
};

use crate::ApiState;

/// `POST /login` with body `{"username":..,"password":..,"type":"admin"|"tenant"}`
pub async fn handler<S>(
  State(state): State<ApiState<S>>,
  body: Result<Json<LoginRequest>, JsonRejection>,
) -> (StatusCode, Json<LoginResponse>)
where
  S: PropertyStore,
{
  let Json(request) = match body {
    Ok(b) => b,
    Err(e) => {
      return (StatusCode::BAD_REQUEST, Json(LoginResponse::rejected(e.body_text())));
    }
  };

  match state.gate.authenticate(state.store.as_ref(), &request).await {
    Ok(identity) => (StatusCode::OK, Json(LoginResponse::accepted(identity))),
    Err(e @ AuthError::Unauthorized(_)) => {
      (StatusCode::UNAUTHORIZED, Json(LoginResponse::rejected(e.to_string())))
    }
    Err(AuthError::Store(e)) => {
      error!(error = %e, "login lookup failed");
      (
        StatusCode::INTERNAL_SERVER_ERROR,
        Json(LoginResponse::rejected("Server error")),
      )
    }
  }
}
