//! The auth gate: credential checks and the session identity they produce.
//!
//! A login is a single check with two branches. The admin branch compares
//! against one configured credential; the tenant branch looks the username up
//! in the store and compares the password stored on the tenant record. Every
//! password comparison goes through a [`CredentialVerifier`], so the stored
//! representation can change without touching the branching logic.
//!
//! Nothing is persisted: there is no token and no expiry. The caller holds
//! the returned [`Identity`] until it logs out.

use std::{fmt, sync::Arc};

use serde::{Deserialize, Deserializer, Serialize, de::Error as _};
use thiserror::Error;
use tracing::{info, warn};
use uuid::Uuid;

use crate::{Role, store::PropertyStore, tenant::Tenant};

// ─── Request ─────────────────────────────────────────────────────────────────

/// Body of `POST /login`.
#[derive(Clone, Serialize, Deserialize)]
pub struct LoginRequest {
  pub username: String,
  pub password: String,
  #[serde(rename = "type")]
  pub role:     Role,
}

impl fmt::Debug for LoginRequest {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    f.debug_struct("LoginRequest")
      .field("username", &self.username)
      .field("password", &"<redacted>")
      .field("role", &self.role)
      .finish()
  }
}

/// Body of every `POST /login` response. `user` is present on success and
/// `message` on failure.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LoginResponse {
  pub success: bool,
  #[serde(default, skip_serializing_if = "Option::is_none")]
  pub user:    Option<Identity>,
  #[serde(default, skip_serializing_if = "Option::is_none")]
  pub message: Option<String>,
}

impl LoginResponse {
  pub fn accepted(user: Identity) -> Self {
    Self { success: true, user: Some(user), message: None }
  }

  pub fn rejected(message: impl Into<String>) -> Self {
    Self { success: false, user: None, message: Some(message.into()) }
  }
}

// ─── Identity ────────────────────────────────────────────────────────────────

/// The administrator's identity: a username and the admin role.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AdminIdentity {
  pub username: String,
  role:         Role,
}

impl AdminIdentity {
  pub fn new(username: impl Into<String>) -> Self {
    Self { username: username.into(), role: Role::Admin }
  }
}

/// The session identity issued by a successful login.
///
/// Serialises flat: `{"username":..,"role":"admin"}` for the admin and the
/// full tenant record (which carries `"role":"tenant"`) for a tenant.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(untagged)]
pub enum Identity {
  Admin(AdminIdentity),
  Tenant(Tenant),
}

impl Identity {
  pub fn role(&self) -> Role {
    match self {
      Self::Admin(_) => Role::Admin,
      Self::Tenant(_) => Role::Tenant,
    }
  }

  pub fn username(&self) -> &str {
    match self {
      Self::Admin(a) => &a.username,
      Self::Tenant(t) => &t.username,
    }
  }

  /// The tenant identifier, for tenant sessions.
  pub fn tenant_id(&self) -> Option<Uuid> {
    match self {
      Self::Admin(_) => None,
      Self::Tenant(t) => Some(t.id),
    }
  }

  /// Name to greet the user with.
  pub fn display_name(&self) -> &str {
    match self {
      Self::Admin(a) => &a.username,
      Self::Tenant(t) => &t.name,
    }
  }
}

impl<'de> Deserialize<'de> for Identity {
  fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
    // The `role` field selects the shape; an untagged derive would accept a
    // tenant record as an admin identity.
    let value = serde_json::Value::deserialize(deserializer)?;
    let role = value
      .get("role")
      .cloned()
      .ok_or_else(|| D::Error::missing_field("role"))?;
    let role: Role = serde_json::from_value(role).map_err(D::Error::custom)?;
    match role {
      Role::Admin => serde_json::from_value(value)
        .map(Identity::Admin)
        .map_err(D::Error::custom),
      Role::Tenant => serde_json::from_value(value)
        .map(Identity::Tenant)
        .map_err(D::Error::custom),
    }
  }
}

// ─── Verification ────────────────────────────────────────────────────────────

/// Compares a supplied password with its stored representation.
pub trait CredentialVerifier: Send + Sync {
  fn verify(&self, supplied: &str, stored: &str) -> bool;
}

/// Exact, case-sensitive comparison against a plaintext stored password.
///
/// Tenant passwords are stored in plaintext; swapping this verifier for a
/// hashing one is the upgrade path.
#[derive(Debug, Clone, Copy, Default)]
pub struct Plaintext;

impl CredentialVerifier for Plaintext {
  fn verify(&self, supplied: &str, stored: &str) -> bool {
    supplied.as_bytes() == stored.as_bytes()
  }
}

/// The single configured admin account. `secret` is whatever representation
/// the admin verifier expects (an argon2 PHC string for the server).
#[derive(Clone)]
pub struct AdminCredential {
  pub username: String,
  pub secret:   String,
}

// ─── Gate ────────────────────────────────────────────────────────────────────

#[derive(Debug, Error)]
pub enum AuthError<E: std::error::Error + 'static> {
  /// Credential mismatch. The message depends only on the requested role,
  /// never on whether the username exists.
  #[error("{}", unauthorized_message(.0))]
  Unauthorized(Role),

  #[error("store error: {0}")]
  Store(#[source] E),
}

fn unauthorized_message(role: &Role) -> &'static str {
  match role {
    Role::Admin => "Invalid Admin Credentials",
    Role::Tenant => "Invalid Tenant Credentials",
  }
}

/// Validates login requests.
#[derive(Clone)]
pub struct AuthGate {
  admin:           AdminCredential,
  admin_verifier:  Arc<dyn CredentialVerifier>,
  tenant_verifier: Arc<dyn CredentialVerifier>,
}

impl AuthGate {
  /// A gate whose tenant passwords are compared in plaintext.
  pub fn new(
    admin: AdminCredential,
    admin_verifier: Arc<dyn CredentialVerifier>,
  ) -> Self {
    Self { admin, admin_verifier, tenant_verifier: Arc::new(Plaintext) }
  }

  pub fn with_tenant_verifier(
    mut self,
    verifier: Arc<dyn CredentialVerifier>,
  ) -> Self {
    self.tenant_verifier = verifier;
    self
  }

  /// Run the credential check for `request`.
  pub async fn authenticate<S: PropertyStore>(
    &self,
    store: &S,
    request: &LoginRequest,
  ) -> Result<Identity, AuthError<S::Error>> {
    match request.role {
      Role::Admin => {
        let ok = request.username == self.admin.username
          && self.admin_verifier.verify(&request.password, &self.admin.secret);
        if ok {
          info!(username = %request.username, "admin login");
          Ok(Identity::Admin(AdminIdentity::new(&request.username)))
        } else {
          warn!(username = %request.username, "rejected admin login");
          Err(AuthError::Unauthorized(Role::Admin))
        }
      }
      Role::Tenant => {
        let tenant = store
          .find_tenant_by_username(&request.username)
          .await
          .map_err(AuthError::Store)?;
        match tenant {
          Some(t) if self.tenant_verifier.verify(&request.password, &t.password) => {
            info!(username = %request.username, tenant_id = %t.id, "tenant login");
            Ok(Identity::Tenant(t))
          }
          _ => {
            warn!(username = %request.username, "rejected tenant login");
            Err(AuthError::Unauthorized(Role::Tenant))
          }
        }
      }
    }
  }
}
