//! Maintenance complaints.
//!
//! A complaint points at its tenant by identifier only. Nothing cascades when
//! that tenant is deleted, so readers must expect dangling references.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use strum::{Display, EnumString};
use uuid::Uuid;

use crate::{Record, RecordKind, Result, error::require};

/// Progress of a complaint.
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
pub enum ComplaintStatus {
  #[default]
  Pending,
  InProgress,
  Resolved,
}

/// A maintenance request filed by a tenant.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Complaint {
  pub id:          Uuid,
  /// Weak reference to [`Tenant::id`](crate::tenant::Tenant::id).
  pub tenant_id:   Uuid,
  /// Issue category, e.g. "Plumbing".
  #[serde(rename = "type")]
  pub kind:        String,
  pub description: String,
  #[serde(default)]
  pub status:      ComplaintStatus,
  /// Set by the store at creation; never changes.
  pub date:        NaiveDate,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", deny_unknown_fields)]
pub struct NewComplaint {
  pub tenant_id:   Uuid,
  #[serde(rename = "type")]
  pub kind:        String,
  pub description: String,
  #[serde(default)]
  pub status:      ComplaintStatus,
}

/// The mutable complaint fields. `tenantId` and `date` are fixed.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", deny_unknown_fields)]
pub struct ComplaintPatch {
  #[serde(rename = "type", default, skip_serializing_if = "Option::is_none")]
  pub kind:        Option<String>,
  #[serde(default, skip_serializing_if = "Option::is_none")]
  pub description: Option<String>,
  #[serde(default, skip_serializing_if = "Option::is_none")]
  pub status:      Option<ComplaintStatus>,
}

impl ComplaintPatch {
  pub fn status(status: ComplaintStatus) -> Self {
    Self { status: Some(status), ..Self::default() }
  }
}

impl Complaint {
  fn validate(&self) -> Result<()> {
    require("type", &self.kind)?;
    require("description", &self.description)
  }
}

impl Record for Complaint {
  const KIND: RecordKind = RecordKind::Complaint;

  type New = NewComplaint;
  type Patch = ComplaintPatch;

  fn id(&self) -> Uuid { self.id }

  fn build(id: Uuid, input: NewComplaint, today: NaiveDate) -> Result<Self> {
    let complaint = Self {
      id,
      tenant_id: input.tenant_id,
      kind: input.kind,
      description: input.description,
      status: input.status,
      date: today,
    };
    complaint.validate()?;
    Ok(complaint)
  }

  fn apply(&mut self, patch: ComplaintPatch) -> Result<()> {
    let mut next = self.clone();
    if let Some(kind) = patch.kind {
      next.kind = kind;
    }
    if let Some(description) = patch.description {
      next.description = description;
    }
    if let Some(status) = patch.status {
      next.status = status;
    }
    next.validate()?;
    *self = next;
    Ok(())
  }
}

#[cfg(test)]
mod tests {
  use super::*;

  fn leak() -> Complaint {
    Complaint::build(
      Uuid::new_v4(),
      NewComplaint {
        tenant_id:   Uuid::new_v4(),
        kind:        "Plumbing".into(),
        description: "Leaking faucet in kitchen".into(),
        status:      ComplaintStatus::default(),
      },
      NaiveDate::from_ymd_opt(2023, 10, 25).unwrap(),
    )
    .unwrap()
  }

  #[test]
  fn wire_names() {
    let c = leak();
    let json = serde_json::to_value(&c).unwrap();
    assert_eq!(json["type"], "Plumbing");
    assert_eq!(json["status"], "pending");
    assert_eq!(json["date"], "2023-10-25");
    assert_eq!(json["tenantId"], c.tenant_id.to_string());
  }

  #[test]
  fn resolving_changes_only_status() {
    let mut c = leak();
    let before = c.clone();
    c.apply(ComplaintPatch::status(ComplaintStatus::Resolved)).unwrap();
    assert_eq!(c.status, ComplaintStatus::Resolved);
    assert_eq!(
      Complaint { status: before.status, ..c.clone() },
      before,
      "only status may differ"
    );
  }

  #[test]
  fn date_and_tenant_are_not_patchable() {
    assert!(
      serde_json::from_str::<ComplaintPatch>(r#"{"date":"2020-01-01"}"#)
        .is_err()
    );
    assert!(
      serde_json::from_str::<ComplaintPatch>(
        r#"{"tenantId":"00000000-0000-0000-0000-000000000000"}"#
      )
      .is_err()
    );
  }

  #[test]
  fn in_progress_spelling() {
    let s: ComplaintStatus = serde_json::from_str(r#""inprogress""#).unwrap();
    assert_eq!(s, ComplaintStatus::InProgress);
    assert_eq!(s.to_string(), "inprogress");
  }
}
