//! JSON REST API for Zoom.
//!
//! Exposes an axum [`Router`] backed by any [`zoom_core::store::PropertyStore`].
//! TLS, CORS and transport concerns are the caller's responsibility.
//!
//! # Mounting
//!
//! ```rust,ignore
//! .nest("/api", zoom_api::api_router(state))
//! ```

pub mod error;
pub mod login;
pub mod records;

use std::sync::Arc;

use axum::{
  Router,
  routing::{get, post, put},
};
use zoom_core::{
  auth::AuthGate, complaint::Complaint, staff::Staff, store::PropertyStore,
  tenant::Tenant,
};

pub use error::ApiError;

/// Shared state threaded through all handlers.
pub struct ApiState<S> {
  pub store: Arc<S>,
  pub gate:  Arc<AuthGate>,
}

impl<S> ApiState<S> {
  pub fn new(store: Arc<S>, gate: AuthGate) -> Self {
    Self { store, gate: Arc::new(gate) }
  }
}

impl<S> Clone for ApiState<S> {
  fn clone(&self) -> Self {
    Self { store: self.store.clone(), gate: self.gate.clone() }
  }
}

/// Build a fully-materialised API router.
///
/// The returned `Router<()>` can be nested into any parent router regardless
/// of its own state type.
pub fn api_router<S>(state: ApiState<S>) -> Router<()>
where
  S: PropertyStore + 'static,
{
  Router::new()
    // Tenants
    .route(
      "/tenants",
      get(records::list::<S, Tenant>).post(records::create::<S, Tenant>),
    )
    .route(
      "/tenants/{id}",
      put(records::update::<S, Tenant>).delete(records::delete::<S, Tenant>),
    )
    // Staff
    .route(
      "/staff",
      get(records::list::<S, Staff>).post(records::create::<S, Staff>),
    )
    .route(
      "/staff/{id}",
      put(records::update::<S, Staff>).delete(records::delete::<S, Staff>),
    )
    // Complaints (never deleted)
    .route(
      "/complaints",
      get(records::list::<S, Complaint>).post(records::create::<S, Complaint>),
    )
    .route("/complaints/{id}", put(records::update::<S, Complaint>))
    // Auth
    .route("/login", post(login::handler::<S>))
    .with_state(state)
}

// ─── Router tests ────────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
  use super::*;

  use axum::{
    body::Body,
    http::{Request, StatusCode, header},
  };
  use serde_json::{Value, json};
  use tower::ServiceExt as _;
  use zoom_core::auth::{AdminCredential, Plaintext};
  use zoom_store_sqlite::SqliteStore;

  async fn make_state() -> ApiState<SqliteStore> {
    let store = SqliteStore::open_in_memory().await.unwrap();
    let gate = AuthGate::new(
      AdminCredential { username: "zoom4404".into(), secret: "Zoom123".into() },
      Arc::new(Plaintext),
    );
    ApiState::new(Arc::new(store), gate)
  }

  async fn oneshot_raw(
    state:  ApiState<SqliteStore>,
    method: &str,
    uri:    &str,
    body:   Option<Value>,
  ) -> (StatusCode, Value) {
    let mut builder = Request::builder().method(method).uri(uri);
    let body = match body {
      Some(v) => {
        builder = builder.header(header::CONTENT_TYPE, "application/json");
        Body::from(v.to_string())
      }
      None => Body::empty(),
    };
    let resp = api_router(state)
      .oneshot(builder.body(body).unwrap())
      .await
      .unwrap();
    let status = resp.status();
    let bytes = axum::body::to_bytes(resp.into_body(), usize::MAX)
      .await
      .unwrap();
    let value = if bytes.is_empty() {
      Value::Null
    } else {
      serde_json::from_slice(&bytes).unwrap_or(Value::Null)
    };
    (status, value)
  }

  fn tenant_a1() -> Value {
    json!({
      "name": "A",
      "username": "a1",
      "building": "B1",
      "apartment": "101",
      "password": "pw"
    })
  }

  // ── Tenants ─────────────────────────────────────────────────────────────────

  #[tokio::test]
  async fn create_tenant_echoes_credentials_and_lists_once() {
    let state = make_state().await;
    let (status, created) =
      oneshot_raw(state.clone(), "POST", "/tenants", Some(tenant_a1())).await;
    assert_eq!(status, StatusCode::CREATED);
    assert!(created["id"].is_string());
    assert_eq!(created["username"], "a1");
    assert_eq!(created["password"], "pw");

    let (status, all) = oneshot_raw(state, "GET", "/tenants", None).await;
    assert_eq!(status, StatusCode::OK);
    let a1s = all
      .as_array()
      .unwrap()
      .iter()
      .filter(|t| t["username"] == "a1")
      .count();
    assert_eq!(a1s, 1);
  }

  #[tokio::test]
  async fn missing_field_is_400_with_error_body() {
    let state = make_state().await;
    let (status, body) = oneshot_raw(
      state,
      "POST",
      "/tenants",
      Some(json!({ "name": "A", "username": "a1" })),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert!(body["error"].is_string());
  }

  #[tokio::test]
  async fn duplicate_username_is_409() {
    let state = make_state().await;
    oneshot_raw(state.clone(), "POST", "/tenants", Some(tenant_a1())).await;
    let (status, body) =
      oneshot_raw(state, "POST", "/tenants", Some(tenant_a1())).await;
    assert_eq!(status, StatusCode::CONFLICT);
    assert!(body["error"].is_string());
  }

  #[tokio::test]
  async fn update_with_unknown_field_is_400() {
    let state = make_state().await;
    let (_, created) =
      oneshot_raw(state.clone(), "POST", "/tenants", Some(tenant_a1())).await;
    let uri = format!("/tenants/{}", created["id"].as_str().unwrap());
    let (status, _) =
      oneshot_raw(state, "PUT", &uri, Some(json!({ "role": "admin" }))).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
  }

  #[tokio::test]
  async fn update_and_delete_unknown_id_are_404() {
    let state = make_state().await;
    let uri = format!("/staff/{}", uuid::Uuid::new_v4());
    let (status, _) =
      oneshot_raw(state.clone(), "PUT", &uri, Some(json!({ "paid": true }))).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    let (status, _) = oneshot_raw(state.clone(), "DELETE", &uri, None).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    let (status, _) = oneshot_raw(state, "DELETE", "/staff/not-a-uuid", None).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
  }

  #[tokio::test]
  async fn delete_tenant_returns_message() {
    let state = make_state().await;
    let (_, created) =
      oneshot_raw(state.clone(), "POST", "/tenants", Some(tenant_a1())).await;
    let uri = format!("/tenants/{}", created["id"].as_str().unwrap());
    let (status, body) = oneshot_raw(state, "DELETE", &uri, None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["message"], "Tenant deleted");
  }

  // ── Staff and complaints ────────────────────────────────────────────────────

  #[tokio::test]
  async fn toggling_paid_leaves_salary() {
    let state = make_state().await;
    let (_, created) = oneshot_raw(
      state.clone(),
      "POST",
      "/staff",
      Some(json!({
        "name": "Mike Cleaner",
        "role": "cleaner",
        "building": "Building A",
        "salary": 1500
      })),
    )
    .await;
    assert_eq!(created["paid"], false);
    let uri = format!("/staff/{}", created["id"].as_str().unwrap());
    let (status, updated) =
      oneshot_raw(state, "PUT", &uri, Some(json!({ "paid": true }))).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(updated["paid"], true);
    assert_eq!(updated["salary"], created["salary"]);
  }

  #[tokio::test]
  async fn complaints_have_no_delete_route() {
    let state = make_state().await;
    let (_, created) = oneshot_raw(
      state.clone(),
      "POST",
      "/complaints",
      Some(json!({
        "tenantId": uuid::Uuid::new_v4(),
        "type": "Plumbing",
        "description": "Leaking faucet in kitchen"
      })),
    )
    .await;
    assert_eq!(created["status"], "pending");
    assert!(created["date"].is_string());
    let uri = format!("/complaints/{}", created["id"].as_str().unwrap());
    let (status, _) = oneshot_raw(state, "DELETE", &uri, None).await;
    assert_eq!(status, StatusCode::METHOD_NOT_ALLOWED);
  }

  // ── Login ───────────────────────────────────────────────────────────────────

  #[tokio::test]
  async fn admin_login_succeeds_with_configured_credentials() {
    let state = make_state().await;
    let (status, body) = oneshot_raw(
      state,
      "POST",
      "/login",
      Some(json!({ "username": "zoom4404", "password": "Zoom123", "type": "admin" })),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["success"], true);
    assert_eq!(body["user"]["role"], "admin");
  }

  #[tokio::test]
  async fn tenant_login_with_wrong_password_is_401() {
    let state = make_state().await;
    oneshot_raw(state.clone(), "POST", "/tenants", Some(tenant_a1())).await;
    let (status, body) = oneshot_raw(
      state,
      "POST",
      "/login",
      Some(json!({ "username": "a1", "password": "wrong", "type": "tenant" })),
    )
    .await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
    assert_eq!(body["success"], false);
    assert_eq!(body["message"], "Invalid Tenant Credentials");
  }

  #[tokio::test]
  async fn tenant_login_returns_full_record() {
    let state = make_state().await;
    oneshot_raw(state.clone(), "POST", "/tenants", Some(tenant_a1())).await;
    let (status, body) = oneshot_raw(
      state,
      "POST",
      "/login",
      Some(json!({ "username": "a1", "password": "pw", "type": "tenant" })),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["user"]["role"], "tenant");
    assert_eq!(body["user"]["apartment"], "101");
  }

  #[tokio::test]
  async fn malformed_login_body_keeps_login_shape() {
    let state = make_state().await;
    let (status, body) =
      oneshot_raw(state, "POST", "/login", Some(json!({ "username": "a1" }))).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["success"], false);
  }
}
