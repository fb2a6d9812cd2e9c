//! The [`Record`] trait shared by every stored entity kind.
//!
//! Tenants, staff and complaints are flat documents with a store-assigned
//! UUID. Each kind names its own creation input and its own partial-update
//! structure, so the store and the HTTP layer can stay generic over the kind.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize, de::DeserializeOwned};
use strum::{Display, EnumString};
use uuid::Uuid;

use crate::Result;

// ─── Kinds ───────────────────────────────────────────────────────────────────

/// Discriminates the three stored collections.
#[derive(
  Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Display,
)]
#[serde(rename_all = "lowercase")]
#[strum(serialize_all = "lowercase")]
pub enum RecordKind {
  Tenant,
  Staff,
  Complaint,
}

impl RecordKind {
  /// Collection name; doubles as the table name and the URL path segment.
  pub fn collection(self) -> &'static str {
    match self {
      Self::Tenant => "tenants",
      Self::Staff => "staff",
      Self::Complaint => "complaints",
    }
  }

  /// Capitalised name used in user-facing messages ("Tenant deleted").
  pub fn label(self) -> &'static str {
    match self {
      Self::Tenant => "Tenant",
      Self::Staff => "Staff",
      Self::Complaint => "Complaint",
    }
  }
}

// ─── Roles ───────────────────────────────────────────────────────────────────

/// The two session roles. Also the `type` field of a login request.
#[derive(
  Debug,
  Clone,
  Copy,
  PartialEq,
  Eq,
  Default,
  Serialize,
  Deserialize,
  Display,
  EnumString,
)]
#[serde(rename_all = "lowercase")]
#[strum(serialize_all = "lowercase")]
pub enum Role {
  Admin,
  #[default]
  Tenant,
}

// ─── Trait ───────────────────────────────────────────────────────────────────

/// A stored entity kind.
///
/// `New` is the creation input (everything but the identifier and any
/// server-assigned fields); `Patch` lists exactly the mutable fields, each
/// optional. Both reject unknown fields when deserialised.
pub trait Record:
  Clone + Send + Sync + Serialize + DeserializeOwned + 'static
{
  const KIND: RecordKind;

  type New: Clone + Send + Sync + Serialize + DeserializeOwned + 'static;
  type Patch: Clone + Send + Sync + Serialize + DeserializeOwned + 'static;

  /// The external identifier.
  fn id(&self) -> Uuid;

  /// Build a validated record from creation input. `today` is the store's
  /// current calendar date, used by kinds that stamp a date at creation.
  fn build(id: Uuid, input: Self::New, today: NaiveDate) -> Result<Self>;

  /// Merge a partial update. Omitted fields are preserved; on error the
  /// record is left unchanged.
  fn apply(&mut self, patch: Self::Patch) -> Result<()>;
}
