//! Staff and payroll records.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use strum::{Display, EnumString};
use uuid::Uuid;

use crate::{
  Record, RecordKind, Result,
  error::{Error, require},
};

/// What a staff member does.
#[derive(
  Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Display, EnumString,
)]
#[serde(rename_all = "lowercase")]
#[strum(serialize_all = "lowercase")]
pub enum StaffRole {
  Cleaner,
  Driver,
}

/// A staff member and their payroll state.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Staff {
  pub id:       Uuid,
  pub name:     String,
  pub role:     StaffRole,
  /// Assignment label; `"All"` means every building.
  pub building: String,
  pub salary:   f64,
  /// Payroll settled for the current period.
  #[serde(default)]
  pub paid:     bool,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct NewStaff {
  pub name:     String,
  pub role:     StaffRole,
  pub building: String,
  pub salary:   f64,
  #[serde(default)]
  pub paid:     bool,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct StaffPatch {
  #[serde(default, skip_serializing_if = "Option::is_none")]
  pub name:     Option<String>,
  #[serde(default, skip_serializing_if = "Option::is_none")]
  pub role:     Option<StaffRole>,
  #[serde(default, skip_serializing_if = "Option::is_none")]
  pub building: Option<String>,
  #[serde(default, skip_serializing_if = "Option::is_none")]
  pub salary:   Option<f64>,
  #[serde(default, skip_serializing_if = "Option::is_none")]
  pub paid:     Option<bool>,
}

impl StaffPatch {
  /// A patch that only sets the payroll flag.
  pub fn paid(paid: bool) -> Self {
    Self { paid: Some(paid), ..Self::default() }
  }
}

impl Staff {
  fn validate(&self) -> Result<()> {
    require("name", &self.name)?;
    require("building", &self.building)?;
    if !self.salary.is_finite() || self.salary < 0.0 {
      return Err(Error::Validation(
        "salary must be a non-negative number".into(),
      ));
    }
    Ok(())
  }
}

impl Record for Staff {
  const KIND: RecordKind = RecordKind::Staff;

  type New = NewStaff;
  type Patch = StaffPatch;

  fn id(&self) -> Uuid { self.id }

  fn build(id: Uuid, input: NewStaff, _today: NaiveDate) -> Result<Self> {
    let staff = Self {
      id,
      name: input.name,
      role: input.role,
      building: input.building,
      salary: input.salary,
      paid: input.paid,
    };
    staff.validate()?;
    Ok(staff)
  }

  fn apply(&mut self, patch: StaffPatch) -> Result<()> {
    let mut next = self.clone();
    if let Some(name) = patch.name {
      next.name = name;
    }
    if let Some(role) = patch.role {
      next.role = role;
    }
    if let Some(building) = patch.building {
      next.building = building;
    }
    if let Some(salary) = patch.salary {
      next.salary = salary;
    }
    if let Some(paid) = patch.paid {
      next.paid = paid;
    }
    next.validate()?;
    *self = next;
    Ok(())
  }
}
