//! Async HTTP client wrapping the Zoom JSON API.

use std::{future::Future, time::Duration};

use reqwest::{Client, RequestBuilder};
use serde::{Deserialize, de::DeserializeOwned};
use uuid::Uuid;
use zoom_core::{
  Record,
  auth::{Identity, LoginRequest, LoginResponse},
};

use crate::error::{ClientError, Result};

// ─── Backend ─────────────────────────────────────────────────────────────────

/// The remote operations the state cache depends on.
///
/// [`ApiClient`] is the production implementation; tests substitute an
/// in-process fake.
pub trait Backend: Send + Sync {
  fn login(
    &self,
    request: LoginRequest,
  ) -> impl Future<Output = Result<Identity>> + Send + '_;

  fn list<E: Record>(&self) -> impl Future<Output = Result<Vec<E>>> + Send + '_;

  fn create<E: Record>(
    &self,
    input: E::New,
  ) -> impl Future<Output = Result<E>> + Send + '_;

  fn update<E: Record>(
    &self,
    id: Uuid,
    patch: E::Patch,
  ) -> impl Future<Output = Result<E>> + Send + '_;

  fn delete<E: Record>(&self, id: Uuid) -> impl Future<Output = Result<()>> + Send + '_;
}

// ─── Client ──────────────────────────────────────────────────────────────────

/// Connection settings for the Zoom API.
#[derive(Debug, Clone)]
pub struct ApiConfig {
  pub base_url: String,
  pub timeout:  Duration,
}

impl ApiConfig {
  pub fn new(base_url: impl Into<String>) -> Self {
    Self { base_url: base_url.into(), timeout: Duration::from_secs(30) }
  }
}

/// Async HTTP client for the Zoom JSON REST API.
///
/// Cheap to clone; the inner [`reqwest::Client`] is `Arc`-based.
#[derive(Clone)]
pub struct ApiClient {
  client: Client,
  config: ApiConfig,
}

/// The record endpoints' failure body.
#[derive(Deserialize)]
struct ErrorBody {
  error: String,
}

impl ApiClient {
  pub fn new(config: ApiConfig) -> Result<Self> {
    let client = Client::builder()
      .timeout(config.timeout)
      .build()
      .map_err(|e| ClientError::Build(e.to_string()))?;
    Ok(Self { client, config })
  }

  fn url(&self, path: &str) -> String {
    format!(
      "{}/api{}",
      self.config.base_url.trim_end_matches('/'),
      path
    )
  }

  fn record_url<E: Record>(&self, id: Option<Uuid>) -> String {
    match id {
      Some(id) => self.url(&format!("/{}/{id}", E::KIND.collection())),
      None => self.url(&format!("/{}", E::KIND.collection())),
    }
  }

  /// Send `req` and decode a success body, or turn the status and the
  /// server's `{"error":..}` message into a [`ClientError`].
  async fn send<T: DeserializeOwned>(&self, req: RequestBuilder) -> Result<T> {
    let resp = req.send().await.map_err(ClientError::from_send)?;
    let status = resp.status();
    if status.is_success() {
      return resp.json().await.map_err(ClientError::from_body);
    }
    let message = match resp.json::<ErrorBody>().await {
      Ok(body) => body.error,
      Err(_) => status.to_string(),
    };
    Err(ClientError::from_status(status, message))
  }
}

impl Backend for ApiClient {
  /// `POST /api/login`
  async fn login(&self, request: LoginRequest) -> Result<Identity> {
    let resp = self
      .client
      .post(self.url("/login"))
      .json(&request)
      .send()
      .await
      .map_err(ClientError::from_send)?;

    let status = resp.status();
    match resp.json::<LoginResponse>().await {
      Ok(LoginResponse { success: true, user: Some(user), .. }) => Ok(user),
      Ok(body) => Err(ClientError::from_status(
        status,
        body.message.unwrap_or_else(|| "Invalid username or password".into()),
      )),
      Err(e) if status.is_success() => Err(ClientError::from_body(e)),
      Err(_) => Err(ClientError::from_status(status, status.to_string())),
    }
  }

  /// `GET /api/{collection}`
  async fn list<E: Record>(&self) -> Result<Vec<E>> {
    self.send(self.client.get(self.record_url::<E>(None))).await
  }

  /// `POST /api/{collection}`
  async fn create<E: Record>(&self, input: E::New) -> Result<E> {
    self
      .send(self.client.post(self.record_url::<E>(None)).json(&input))
      .await
  }

  /// `PUT /api/{collection}/{id}`
  async fn update<E: Record>(&self, id: Uuid, patch: E::Patch) -> Result<E> {
    self
      .send(self.client.put(self.record_url::<E>(Some(id))).json(&patch))
      .await
  }

  /// `DELETE /api/{collection}/{id}`
  async fn delete<E: Record>(&self, id: Uuid) -> Result<()> {
    let _: serde_json::Value = self
      .send(self.client.delete(self.record_url::<E>(Some(id))))
      .await?;
    Ok(())
  }
}

// ─── End-to-end tests ────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
  use super::*;

  use std::sync::Arc;

  use zoom_api::ApiState;
  use zoom_core::{
    Role,
    auth::{AdminCredential, AuthGate, Plaintext},
    staff::{NewStaff, Staff, StaffPatch, StaffRole},
    tenant::{NewTenant, Tenant, TenantPatch},
  };
  use zoom_store_sqlite::SqliteStore;

  async fn spawn_server() -> String {
    let store = SqliteStore::open_in_memory().await.unwrap();
    let gate = AuthGate::new(
      AdminCredential { username: "zoom4404".into(), secret: "Zoom123".into() },
      Arc::new(Plaintext),
    );
    let app = axum::Router::new()
      .nest("/api", zoom_api::api_router(ApiState::new(Arc::new(store), gate)));
    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    tokio::spawn(async move { axum::serve(listener, app).await.unwrap() });
    format!("http://{addr}")
  }

  fn client(url: String) -> ApiClient {
    ApiClient::new(ApiConfig::new(url)).unwrap()
  }

  fn login(username: &str, password: &str, role: Role) -> LoginRequest {
    LoginRequest { username: username.into(), password: password.into(), role }
  }

  fn new_tenant(username: &str) -> NewTenant {
    NewTenant {
      name:      "A".into(),
      username:  username.into(),
      password:  "pw".into(),
      building:  "B1".into(),
      apartment: "101".into(),
      email:     None,
    }
  }

  #[tokio::test]
  async fn admin_login_round_trip() {
    let api = client(spawn_server().await);
    let id = api.login(login("zoom4404", "Zoom123", Role::Admin)).await.unwrap();
    assert_eq!(id.role(), Role::Admin);
    assert_eq!(id.username(), "zoom4404");
  }

  #[tokio::test]
  async fn tenant_login_with_wrong_password_is_unauthorized() {
    let api = client(spawn_server().await);
    api.create::<Tenant>(new_tenant("a1")).await.unwrap();

    let err = api.login(login("a1", "wrong", Role::Tenant)).await.unwrap_err();
    let ClientError::Unauthorized(message) = err else {
      panic!("expected Unauthorized, got {err:?}");
    };
    assert_eq!(message, "Invalid Tenant Credentials");

    let id = api.login(login("a1", "pw", Role::Tenant)).await.unwrap();
    assert!(id.tenant_id().is_some());
  }

  #[tokio::test]
  async fn unreachable_server_is_a_connectivity_error() {
    // Bind and drop to obtain a port nothing is listening on.
    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    drop(listener);

    let api = client(format!("http://{addr}"));
    let err = api
      .login(login("zoom4404", "Zoom123", Role::Admin))
      .await
      .unwrap_err();
    assert!(matches!(err, ClientError::Connectivity(_)), "{err:?}");
    assert_ne!(err.to_string(), "Invalid Admin Credentials");
  }

  #[tokio::test]
  async fn record_crud_maps_statuses() {
    let api = client(spawn_server().await);

    let t: Tenant = api.create(new_tenant("a1")).await.unwrap();
    let dup = api.create::<Tenant>(new_tenant("a1")).await.unwrap_err();
    assert!(matches!(dup, ClientError::Conflict(_)), "{dup:?}");

    let updated: Tenant = api.update(t.id, TenantPatch::password("next")).await.unwrap();
    assert_eq!(updated.password, "next");
    assert_eq!(updated.apartment, "101");

    api.delete::<Tenant>(t.id).await.unwrap();
    let gone = api.delete::<Tenant>(t.id).await.unwrap_err();
    assert!(matches!(gone, ClientError::NotFound(_)), "{gone:?}");
    assert!(api.list::<Tenant>().await.unwrap().is_empty());
  }

  #[tokio::test]
  async fn invalid_input_is_a_validation_error() {
    let api = client(spawn_server().await);
    let err = api
      .create::<Staff>(NewStaff {
        name:     "Sam".into(),
        role:     StaffRole::Driver,
        building: "All".into(),
        salary:   -1.0,
        paid:     false,
      })
      .await
      .unwrap_err();
    assert!(matches!(err, ClientError::Validation(_)), "{err:?}");

    let missing = api
      .update::<Staff>(Uuid::new_v4(), StaffPatch::paid(true))
      .await
      .unwrap_err();
    assert!(matches!(missing, ClientError::NotFound(_)), "{missing:?}");
  }
}
