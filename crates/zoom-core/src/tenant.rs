//! Tenant accounts.
//!
//! A tenant is both a resident record and a login identity: the username and
//! plaintext password stored here are what the tenant branch of the
//! [`AuthGate`](crate::auth::AuthGate) checks against.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::{
  Record, RecordKind, Result, Role,
  error::{Error, require},
};

/// A resident with login credentials.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Tenant {
  pub id:        Uuid,
  pub name:      String,
  /// Unique across all tenants; enforced by the store.
  pub username:  String,
  pub password:  String,
  pub building:  String,
  pub apartment: String,
  #[serde(default, skip_serializing_if = "Option::is_none")]
  pub email:     Option<String>,
  /// Always [`Role::Tenant`]; never accepted from callers.
  #[serde(default)]
  pub role:      Role,
}

/// Input to `create` for tenants.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct NewTenant {
  pub name:      String,
  pub username:  String,
  pub password:  String,
  pub building:  String,
  pub apartment: String,
  #[serde(default, skip_serializing_if = "Option::is_none")]
  pub email:     Option<String>,
}

/// The mutable tenant fields. `None` leaves a field as it is.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct TenantPatch {
  #[serde(default, skip_serializing_if = "Option::is_none")]
  pub name:      Option<String>,
  #[serde(default, skip_serializing_if = "Option::is_none")]
  pub username:  Option<String>,
  #[serde(default, skip_serializing_if = "Option::is_none")]
  pub password:  Option<String>,
  #[serde(default, skip_serializing_if = "Option::is_none")]
  pub building:  Option<String>,
  #[serde(default, skip_serializing_if = "Option::is_none")]
  pub apartment: Option<String>,
  /// An empty string clears the address.
  #[serde(default, skip_serializing_if = "Option::is_none")]
  pub email:     Option<String>,
}

impl TenantPatch {
  /// A patch that only replaces the password.
  pub fn password(password: impl Into<String>) -> Self {
    Self { password: Some(password.into()), ..Self::default() }
  }
}

impl Tenant {
  fn validate(&self) -> Result<()> {
    require("name", &self.name)?;
    require("username", &self.username)?;
    require("password", &self.password)?;
    require("building", &self.building)?;
    require("apartment", &self.apartment)?;
    if self.role != Role::Tenant {
      return Err(Error::Validation("tenant role must be \"tenant\"".into()));
    }
    Ok(())
  }
}

fn normalise_email(email: Option<String>) -> Option<String> {
  email.filter(|e| !e.trim().is_empty())
}

impl Record for Tenant {
  const KIND: RecordKind = RecordKind::Tenant;

  type New = NewTenant;
  type Patch = TenantPatch;

  fn id(&self) -> Uuid { self.id }

  fn build(id: Uuid, input: NewTenant, _today: NaiveDate) -> Result<Self> {
    let tenant = Self {
      id,
      name: input.name,
      username: input.username,
      password: input.password,
      building: input.building,
      apartment: input.apartment,
      email: normalise_email(input.email),
      role: Role::Tenant,
    };
    tenant.validate()?;
    Ok(tenant)
  }

  fn apply(&mut self, patch: TenantPatch) -> Result<()> {
    let mut next = self.clone();
    if let Some(name) = patch.name {
      next.name = name;
    }
    if let Some(username) = patch.username {
      next.username = username;
    }
    if let Some(password) = patch.password {
      next.password = password;
    }
    if let Some(building) = patch.building {
      next.building = building;
    }
    if let Some(apartment) = patch.apartment {
      next.apartment = apartment;
    }
    if patch.email.is_some() {
      next.email = normalise_email(patch.email);
    }
    next.validate()?;
    *self = next;
    Ok(())
  }
}

#[cfg(test)]
mod tests {
  use super::*;

  fn today() -> NaiveDate { NaiveDate::from_ymd_opt(2024, 3, 1).unwrap() }

  fn input() -> NewTenant {
    NewTenant {
      name:      "A".into(),
      username:  "a1".into(),
      password:  "pw".into(),
      building:  "B1".into(),
      apartment: "101".into(),
      email:     None,
    }
  }

  #[test]
  fn build_sets_tenant_role() {
    let t = Tenant::build(Uuid::new_v4(), input(), today()).unwrap();
    assert_eq!(t.role, Role::Tenant);
    assert_eq!(t.username, "a1");
  }

  #[test]
  fn build_rejects_blank_required_field() {
    let mut i = input();
    i.apartment = "  ".into();
    let err = Tenant::build(Uuid::new_v4(), i, today()).unwrap_err();
    assert!(matches!(err, Error::Validation(ref m) if m.contains("apartment")));
  }

  #[test]
  fn patch_preserves_omitted_fields() {
    let mut t = Tenant::build(Uuid::new_v4(), input(), today()).unwrap();
    let before = t.clone();
    t.apply(TenantPatch::password("new-pw")).unwrap();
    assert_eq!(t.password, "new-pw");
    assert_eq!(t.name, before.name);
    assert_eq!(t.username, before.username);
    assert_eq!(t.id, before.id);
  }

  #[test]
  fn failed_patch_leaves_record_unchanged() {
    let mut t = Tenant::build(Uuid::new_v4(), input(), today()).unwrap();
    let before = t.clone();
    let patch = TenantPatch {
      name: Some("B".into()),
      username: Some(String::new()),
      ..TenantPatch::default()
    };
    assert!(t.apply(patch).is_err());
    assert_eq!(t, before);
  }

  #[test]
  fn empty_email_clears_it() {
    let mut i = input();
    i.email = Some("a@example.com".into());
    let mut t = Tenant::build(Uuid::new_v4(), i, today()).unwrap();
    t.apply(TenantPatch { email: Some(String::new()), ..Default::default() })
      .unwrap();
    assert_eq!(t.email, None);
  }

  #[test]
  fn patch_rejects_unknown_fields() {
    let err = serde_json::from_str::<TenantPatch>(r#"{"role":"admin"}"#);
    assert!(err.is_err());
  }
}
