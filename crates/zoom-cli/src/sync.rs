//! [`StateCache`]: the client's mirror of the server collections.
//!
//! The cache is the only writer of its [`Snapshot`]. Readers get an
//! `Arc<Snapshot>` that never changes under them; every write swaps in a new
//! one.
//!
//! Writes are ordered by sequence tickets taken when a request is issued. A
//! refresh lands only if nothing newer has been applied. A confirmed patch
//! lands only if no later refresh and no later patch to the same record has
//! been applied, so a slow response never rolls back a newer state.

use std::{
  collections::HashMap,
  sync::{
    Arc,
    atomic::{AtomicU64, Ordering},
  },
};

use serde::Deserialize;
use strum::{Display, EnumString};
use tokio::sync::RwLock;
use tracing::{debug, warn};
use uuid::Uuid;
use zoom_core::{
  RecordKind, Role,
  auth::{Identity, LoginRequest},
  complaint::{Complaint, ComplaintPatch, ComplaintStatus, NewComplaint},
  staff::{NewStaff, Staff, StaffPatch},
  tenant::{NewTenant, Tenant, TenantPatch},
};

use crate::{
  cache::{Cached, Change, Snapshot},
  client::Backend,
  error::{ClientError, Result},
  session::Session,
};

/// How the snapshot catches up after a successful mutation. Fixed for the
/// lifetime of a cache.
#[derive(
  Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize, Display, EnumString,
)]
#[serde(rename_all = "kebab-case")]
#[strum(serialize_all = "kebab-case")]
pub enum ReconcilePolicy {
  /// Splice the server's copy of the one changed record into the snapshot.
  #[default]
  ConfirmedPatch,
  /// Re-fetch all three collections.
  FullRefresh,
}

/// What the snapshot reflects. `ticket` is the newest write of any kind,
/// `base` the newest wholesale replacement, and `patched` the newest patch
/// per record since then.
#[derive(Default)]
struct Applied {
  snapshot: Arc<Snapshot>,
  ticket:   u64,
  base:     u64,
  patched:  HashMap<(RecordKind, Uuid), u64>,
}

impl Applied {
  fn replace(&mut self, ticket: u64, snapshot: Snapshot) {
    self.snapshot = Arc::new(snapshot);
    self.ticket = ticket;
    self.base = ticket;
    self.patched.clear();
  }

  /// Apply a change confirmed for a request issued at `ticket`. Returns
  /// false if it was superseded.
  fn patch<E: Cached>(&mut self, ticket: u64, change: Change<E>) -> bool {
    let key = (E::KIND, change.id());
    let superseded = self.patched.get(&key).is_some_and(|t| *t > ticket);
    if ticket <= self.base || superseded {
      return false;
    }
    let mut next = Snapshot::clone(&self.snapshot);
    next.apply(change);
    self.snapshot = Arc::new(next);
    self.patched.insert(key, ticket);
    self.ticket = self.ticket.max(ticket);
    true
  }
}

pub struct StateCache<B> {
  backend: B,
  policy:  ReconcilePolicy,
  session: RwLock<Session>,
  state:   RwLock<Applied>,
  issued:  AtomicU64,
}

impl<B: Backend> StateCache<B> {
  pub fn new(backend: B, policy: ReconcilePolicy) -> Self {
    Self {
      backend,
      policy,
      session: RwLock::new(Session::default()),
      state: RwLock::new(Applied::default()),
      issued: AtomicU64::new(0),
    }
  }

  pub fn backend(&self) -> &B { &self.backend }

  pub fn policy(&self) -> ReconcilePolicy { self.policy }

  fn next_ticket(&self) -> u64 { self.issued.fetch_add(1, Ordering::SeqCst) + 1 }

  /// Empty the snapshot. Anything issued before this is dropped on arrival.
  async fn reset(&self) {
    let ticket = self.next_ticket();
    self.state.write().await.replace(ticket, Snapshot::default());
  }

  // ── Session ───────────────────────────────────────────────────────────────

  /// Log in, dropping whatever the previous session had loaded. A
  /// tenant-role attempt with the admin's conventional username fails
  /// locally with a hint.
  pub async fn login(
    &self,
    username: &str,
    password: &str,
    role: Role,
  ) -> Result<Identity> {
    self.reset().await;
    if role == Role::Tenant && username.eq_ignore_ascii_case("admin") {
      let err = ClientError::WrongLoginRole;
      self.session.write().await.fail(err.to_string());
      return Err(err);
    }

    self.session.write().await.begin();
    let request = LoginRequest {
      username: username.to_owned(),
      password: password.to_owned(),
      role,
    };
    match self.backend.login(request).await {
      Ok(identity) => {
        debug!(username, %role, "logged in");
        self.session.write().await.succeed(identity.clone());
        Ok(identity)
      }
      Err(e) => {
        self.session.write().await.fail(e.to_string());
        Err(e)
      }
    }
  }

  /// Resume a session whose identity was kept from an earlier login.
  pub async fn restore(&self, identity: Identity) {
    self.session.write().await.succeed(identity);
  }

  /// Forget the identity and the snapshot. Refreshes still in flight are
  /// discarded when they land.
  pub async fn logout(&self) {
    self.session.write().await.logout();
    self.reset().await;
  }

  pub async fn identity(&self) -> Option<Identity> {
    self.session.read().await.identity().cloned()
  }

  pub async fn take_login_error(&self) -> Option<String> {
    self.session.write().await.take_login_error()
  }

  async fn require_login(&self) -> Result<Identity> {
    self.identity().await.ok_or(ClientError::NotLoggedIn)
  }

  async fn require_role(&self, role: Role) -> Result<Identity> {
    let identity = self.require_login().await?;
    if identity.role() != role {
      return Err(ClientError::Forbidden(role));
    }
    Ok(identity)
  }

  // ── Reads ─────────────────────────────────────────────────────────────────

  pub async fn snapshot(&self) -> Arc<Snapshot> {
    self.state.read().await.snapshot.clone()
  }

  /// Fetch all three collections and replace the snapshot. On failure the
  /// previous snapshot stays in place.
  pub async fn refresh(&self) -> Result<Arc<Snapshot>> {
    self.require_login().await?;
    let ticket = self.next_ticket();

    let (tenants, staff, complaints) = tokio::try_join!(
      self.backend.list::<Tenant>(),
      self.backend.list::<Staff>(),
      self.backend.list::<Complaint>(),
    )?;

    let mut state = self.state.write().await;
    if ticket > state.ticket {
      state.replace(ticket, Snapshot { tenants, staff, complaints });
    } else {
      debug!(ticket, applied = state.ticket, "discarding stale refresh");
    }
    Ok(state.snapshot.clone())
  }

  /// Bring the snapshot up to date after a mutation issued at `ticket`
  /// succeeded. If a full refresh fails the confirmed change is patched in
  /// instead.
  async fn reconcile<E: Cached>(&self, ticket: u64, change: Change<E>) {
    if self.policy == ReconcilePolicy::FullRefresh {
      match self.refresh().await {
        Ok(_) => return,
        Err(e) => warn!(error = %e, "refresh after mutation failed, patching instead"),
      }
    }
    if !self.state.write().await.patch(ticket, change) {
      debug!(ticket, kind = %E::KIND, "discarding superseded patch");
    }
  }

  // ── Generic mutations ─────────────────────────────────────────────────────

  async fn create<E: Cached>(&self, role: Role, input: E::New) -> Result<E> {
    self.require_role(role).await?;
    let ticket = self.next_ticket();
    let record = self.backend.create::<E>(input).await?;
    self.reconcile(ticket, Change::Upsert(record.clone())).await;
    Ok(record)
  }

  async fn update<E: Cached>(&self, role: Role, id: Uuid, patch: E::Patch) -> Result<E> {
    self.require_role(role).await?;
    let ticket = self.next_ticket();
    let record = self.backend.update::<E>(id, patch).await?;
    self.reconcile(ticket, Change::Upsert(record.clone())).await;
    Ok(record)
  }

  async fn delete<E: Cached>(&self, role: Role, id: Uuid) -> Result<()> {
    self.require_role(role).await?;
    let ticket = self.next_ticket();
    self.backend.delete::<E>(id).await?;
    self.reconcile(ticket, Change::<E>::Remove(id)).await;
    Ok(())
  }

  // ── Admin ─────────────────────────────────────────────────────────────────

  pub async fn create_tenant(&self, input: NewTenant) -> Result<Tenant> {
    self.create(Role::Admin, input).await
  }

  pub async fn update_tenant(&self, id: Uuid, patch: TenantPatch) -> Result<Tenant> {
    self.update(Role::Admin, id, patch).await
  }

  /// Replace a tenant's password; nothing else is sent.
  pub async fn reset_tenant_password(&self, id: Uuid, password: &str) -> Result<Tenant> {
    self.update_tenant(id, TenantPatch::password(password)).await
  }

  pub async fn delete_tenant(&self, id: Uuid) -> Result<()> {
    self.delete::<Tenant>(Role::Admin, id).await
  }

  pub async fn create_staff(&self, input: NewStaff) -> Result<Staff> {
    self.create(Role::Admin, input).await
  }

  pub async fn update_staff(&self, id: Uuid, patch: StaffPatch) -> Result<Staff> {
    self.update(Role::Admin, id, patch).await
  }

  pub async fn delete_staff(&self, id: Uuid) -> Result<()> {
    self.delete::<Staff>(Role::Admin, id).await
  }

  /// Flip `paid` relative to the cached record. Only `paid` is sent.
  pub async fn toggle_salary_payment(&self, id: Uuid) -> Result<Staff> {
    self.require_role(Role::Admin).await?;
    let paid = self
      .snapshot()
      .await
      .get::<Staff>(id)
      .map(|s| s.paid)
      .ok_or(ClientError::UnknownRecord { kind: RecordKind::Staff, id })?;
    self.update_staff(id, StaffPatch::paid(!paid)).await
  }

  pub async fn set_complaint_status(
    &self,
    id: Uuid,
    status: ComplaintStatus,
  ) -> Result<Complaint> {
    self
      .update(Role::Admin, id, ComplaintPatch::status(status))
      .await
  }

  // ── Tenant ────────────────────────────────────────────────────────────────

  /// File a pending complaint for the logged-in tenant.
  pub async fn file_complaint(&self, kind: &str, description: &str) -> Result<Complaint> {
    let identity = self.require_role(Role::Tenant).await?;
    let tenant_id = identity
      .tenant_id()
      .ok_or(ClientError::Forbidden(Role::Tenant))?;
    let input = NewComplaint {
      tenant_id,
      kind: kind.to_owned(),
      description: description.to_owned(),
      status: ComplaintStatus::Pending,
    };
    self.create(Role::Tenant, input).await
  }
}
