//! HTTP server assembly for Zoom.
//!
//! Mounts the [`zoom_api`] router under `/api` next to a liveness probe and
//! wraps everything in request tracing and permissive CORS for the browser
//! front end.

pub mod auth;

use std::{path::PathBuf, sync::Arc};

use axum::{Router, routing::get};
use serde::Deserialize;
use tower_http::{cors::CorsLayer, trace::TraceLayer};
use zoom_api::ApiState;
use zoom_core::{
  auth::{AdminCredential, AuthGate},
  store::PropertyStore,
};

use auth::Argon2Verifier;

// ─── Configuration ────────────────────────────────────────────────────────────

/// Runtime server configuration, deserialised from `config.toml` and
/// `ZOOM_*` environment variables.
#[derive(Deserialize, Clone)]
pub struct ServerConfig {
  #[serde(default = "default_host")]
  pub host:                String,
  #[serde(default = "default_port")]
  pub port:                u16,
  #[serde(default = "default_store_path")]
  pub store_path:          PathBuf,
  pub admin_username:      String,
  /// PHC string produced by argon2, e.g. `$argon2id$v=19$…`
  pub admin_password_hash: String,
}

fn default_host() -> String { "127.0.0.1".to_string() }

fn default_port() -> u16 { 5000 }

fn default_store_path() -> PathBuf { PathBuf::from("zoom.db") }

impl ServerConfig {
  /// The auth gate for this configuration: argon2 for the admin, plaintext
  /// comparison for tenants.
  pub fn auth_gate(&self) -> AuthGate {
    AuthGate::new(
      AdminCredential {
        username: self.admin_username.clone(),
        secret:   self.admin_password_hash.clone(),
      },
      Arc::new(Argon2Verifier),
    )
  }
}

// ─── Router ───────────────────────────────────────────────────────────────────

/// Build the complete application router.
pub fn router<S>(state: ApiState<S>) -> Router
where
  S: PropertyStore + 'static,
{
  Router::new()
    .route("/health", get(health))
    .nest("/api", zoom_api::api_router(state))
    .layer(TraceLayer::new_for_http())
    .layer(CorsLayer::permissive())
}

async fn health() -> &'static str { "ok" }

// ─── Integration tests ────────────────────────────────────────────────────────
