//! The client-side snapshot of the three collections and the views derived
//! from it.
//!
//! Views are computed on read and never stored, so they cannot drift from
//! the base collections.

use std::cmp::Ordering;

use fuzzy_matcher::{FuzzyMatcher, skim::SkimMatcherV2};
use uuid::Uuid;
use zoom_core::{
  Record,
  auth::Identity,
  complaint::{Complaint, ComplaintStatus},
  staff::Staff,
  tenant::Tenant,
};

/// Shown wherever a complaint's tenant no longer exists.
pub const UNKNOWN_TENANT: &str = "Unknown Tenant";

// ─── Snapshot ────────────────────────────────────────────────────────────────

#[derive(Debug, Clone, Default, PartialEq)]
pub struct Snapshot {
  pub tenants:    Vec<Tenant>,
  pub staff:      Vec<Staff>,
  pub complaints: Vec<Complaint>,
}

/// A record kind with a collection in the [`Snapshot`].
pub trait Cached: Record {
  fn collection(snapshot: &Snapshot) -> &[Self];
  fn collection_mut(snapshot: &mut Snapshot) -> &mut Vec<Self>;
}

impl Cached for Tenant {
  fn collection(snapshot: &Snapshot) -> &[Self] { &snapshot.tenants }
  fn collection_mut(snapshot: &mut Snapshot) -> &mut Vec<Self> { &mut snapshot.tenants }
}

impl Cached for Staff {
  fn collection(snapshot: &Snapshot) -> &[Self] { &snapshot.staff }
  fn collection_mut(snapshot: &mut Snapshot) -> &mut Vec<Self> { &mut snapshot.staff }
}

impl Cached for Complaint {
  fn collection(snapshot: &Snapshot) -> &[Self] { &snapshot.complaints }
  fn collection_mut(snapshot: &mut Snapshot) -> &mut Vec<Self> {
    &mut snapshot.complaints
  }
}

/// A confirmed change to one record.
#[derive(Debug, Clone)]
pub enum Change<E> {
  Upsert(E),
  Remove(Uuid),
}

impl<E: Record> Change<E> {
  pub fn id(&self) -> Uuid {
    match self {
      Self::Upsert(record) => record.id(),
      Self::Remove(id) => *id,
    }
  }
}

impl Snapshot {
  pub fn get<E: Cached>(&self, id: Uuid) -> Option<&E> {
    E::collection(self).iter().find(|r| r.id() == id)
  }

  /// Apply a confirmed change in place. An upsert of a known id replaces it
  /// at its position; an unknown id is appended.
  pub fn apply<E: Cached>(&mut self, change: Change<E>) {
    let records = E::collection_mut(self);
    match change {
      Change::Upsert(record) => {
        match records.iter_mut().find(|r| r.id() == record.id()) {
          Some(slot) => *slot = record,
          None => records.push(record),
        }
      }
      Change::Remove(id) => records.retain(|r| r.id() != id),
    }
  }

  // ── Views ─────────────────────────────────────────────────────────────────

  pub fn tenant_name(&self, tenant_id: Uuid) -> &str {
    self
      .get::<Tenant>(tenant_id)
      .map(|t| t.name.as_str())
      .unwrap_or(UNKNOWN_TENANT)
  }

  pub fn complaints_for(&self, tenant_id: Uuid) -> Vec<&Complaint> {
    self
      .complaints
      .iter()
      .filter(|c| c.tenant_id == tenant_id)
      .collect()
  }

  /// Pending complaints first, then newest first. Ties keep their order.
  pub fn complaints_by_priority(&self) -> Vec<&Complaint> {
    let mut out: Vec<_> = self.complaints.iter().collect();
    out.sort_by(|a, b| priority(a, b));
    out
  }

  /// Complaints `identity` may see: everything for the admin in priority
  /// order, only their own for a tenant.
  pub fn visible_complaints(&self, identity: &Identity) -> Vec<&Complaint> {
    match identity.tenant_id() {
      None => self.complaints_by_priority(),
      Some(id) => self.complaints_for(id),
    }
  }

  /// Tenants whose name, username, building or apartment fuzzily match.
  pub fn search_tenants(&self, query: &str) -> Vec<&Tenant> {
    if query.is_empty() {
      return self.tenants.iter().collect();
    }
    let matcher = SkimMatcherV2::default();
    self
      .tenants
      .iter()
      .filter(|t| {
        [&t.name, &t.username, &t.building, &t.apartment]
          .iter()
          .any(|field| matcher.fuzzy_match(field, query).is_some())
      })
      .collect()
  }

  pub fn stats(&self) -> DashboardStats {
    DashboardStats {
      total_tenants:      self.tenants.len(),
      total_staff:        self.staff.len(),
      pending_complaints: count_pending(self.complaints.iter()),
      unpaid_salary:      self
        .staff
        .iter()
        .filter(|s| !s.paid)
        .map(|s| s.salary)
        .sum(),
    }
  }

  /// Pending complaints filed by one tenant.
  pub fn pending_for(&self, tenant_id: Uuid) -> usize {
    count_pending(self.complaints_for(tenant_id).into_iter())
  }
}

fn priority(a: &Complaint, b: &Complaint) -> Ordering {
  let pending = |c: &Complaint| c.status == ComplaintStatus::Pending;
  pending(b)
    .cmp(&pending(a))
    .then_with(|| b.date.cmp(&a.date))
}

fn count_pending<'a>(complaints: impl Iterator<Item = &'a Complaint>) -> usize {
  complaints
    .filter(|c| c.status == ComplaintStatus::Pending)
    .count()
}

/// Figures for the admin dashboard.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct DashboardStats {
  pub total_tenants:      usize,
  pub total_staff:        usize,
  pub pending_complaints: usize,
  /// Sum of salaries not yet paid this period.
  pub unpaid_salary:      f64,
}

#[cfg(test)]
mod tests {
  use super::*;
  use chrono::NaiveDate;
  use zoom_core::{
    complaint::NewComplaint,
    staff::{NewStaff, StaffRole},
    tenant::NewTenant,
  };

  fn day(d: u32) -> NaiveDate { NaiveDate::from_ymd_opt(2024, 3, d).unwrap() }

  fn tenant(name: &str, username: &str) -> Tenant {
    Tenant::build(
      Uuid::new_v4(),
      NewTenant {
        name:      name.into(),
        username:  username.into(),
        password:  "pw".into(),
        building:  "Building A".into(),
        apartment: "101".into(),
        email:     None,
      },
      day(1),
    )
    .unwrap()
  }

  fn staff(salary: f64, paid: bool) -> Staff {
    Staff::build(
      Uuid::new_v4(),
      NewStaff {
        name: "Mike".into(),
        role: StaffRole::Cleaner,
        building: "All".into(),
        salary,
        paid,
      },
      day(1),
    )
    .unwrap()
  }

  fn complaint(tenant_id: Uuid, status: ComplaintStatus, date: u32) -> Complaint {
    Complaint::build(
      Uuid::new_v4(),
      NewComplaint {
        tenant_id,
        kind: "Plumbing".into(),
        description: "Leak".into(),
        status,
      },
      day(date),
    )
    .unwrap()
  }

  #[test]
  fn deleted_tenant_shows_as_unknown() {
    let t = tenant("John Doe", "tenant1");
    let mut snap = Snapshot {
      complaints: vec![complaint(t.id, ComplaintStatus::Pending, 1)],
      tenants: vec![t.clone()],
      ..Default::default()
    };
    assert_eq!(snap.tenant_name(t.id), "John Doe");

    snap.apply::<Tenant>(Change::Remove(t.id));
    assert_eq!(snap.complaints.len(), 1);
    assert_eq!(snap.tenant_name(t.id), UNKNOWN_TENANT);
  }

  #[test]
  fn priority_puts_pending_first_then_newest() {
    let tid = Uuid::new_v4();
    let old_pending = complaint(tid, ComplaintStatus::Pending, 2);
    let new_resolved = complaint(tid, ComplaintStatus::Resolved, 9);
    let new_pending = complaint(tid, ComplaintStatus::Pending, 5);
    let snap = Snapshot {
      complaints: vec![old_pending.clone(), new_resolved.clone(), new_pending.clone()],
      ..Default::default()
    };
    let ids: Vec<_> = snap.complaints_by_priority().iter().map(|c| c.id).collect();
    assert_eq!(ids, [new_pending.id, old_pending.id, new_resolved.id]);
  }

  #[test]
  fn tenant_sees_only_own_complaints() {
    let me = tenant("A", "a1");
    let other = tenant("B", "b1");
    let snap = Snapshot {
      complaints: vec![
        complaint(me.id, ComplaintStatus::Pending, 1),
        complaint(other.id, ComplaintStatus::Pending, 1),
        complaint(me.id, ComplaintStatus::Resolved, 2),
      ],
      tenants: vec![me.clone(), other],
      ..Default::default()
    };
    let mine = snap.visible_complaints(&Identity::Tenant(me.clone()));
    assert_eq!(mine.len(), 2);
    assert!(mine.iter().all(|c| c.tenant_id == me.id));
    assert_eq!(snap.pending_for(me.id), 1);
  }

  #[test]
  fn stats_sum_unpaid_salaries() {
    let tid = Uuid::new_v4();
    let snap = Snapshot {
      tenants:    vec![tenant("A", "a1")],
      staff:      vec![staff(1500.0, false), staff(1800.0, true), staff(200.5, false)],
      complaints: vec![
        complaint(tid, ComplaintStatus::Pending, 1),
        complaint(tid, ComplaintStatus::InProgress, 1),
      ],
    };
    let stats = snap.stats();
    assert_eq!(stats.total_tenants, 1);
    assert_eq!(stats.total_staff, 3);
    assert_eq!(stats.pending_complaints, 1);
    assert_eq!(stats.unpaid_salary, 1700.5);
  }

  #[test]
  fn upsert_replaces_in_place() {
    let a = tenant("A", "a1");
    let b = tenant("B", "b1");
    let mut snap = Snapshot { tenants: vec![a.clone(), b.clone()], ..Default::default() };
    let mut renamed = a.clone();
    renamed.name = "Alice".into();
    snap.apply(Change::Upsert(renamed));
    assert_eq!(snap.tenants[0].name, "Alice");
    assert_eq!(snap.tenants[1], b);
  }

  #[test]
  fn search_matches_any_field() {
    let snap = Snapshot {
      tenants: vec![tenant("John Doe", "tenant1"), tenant("Mary", "m2")],
      ..Default::default()
    };
    let hits = snap.search_tenants("jdoe");
    assert_eq!(hits.len(), 1);
    assert_eq!(hits[0].username, "tenant1");
    assert_eq!(snap.search_tenants("").len(), 2);
  }
}
