//! The `PropertyStore` trait.
//!
//! The trait is implemented by storage backends (e.g. `zoom-store-sqlite`).
//! Higher layers (`zoom-api`, the auth gate) depend on this abstraction, not
//! on any concrete backend.

use std::future::Future;

use uuid::Uuid;

use crate::{record::Record, tenant::Tenant};

/// Errors a backend can return. Domain failures (validation, unknown id,
/// duplicate username) are exposed through [`StoreError::as_core`] so callers
/// can tell them apart from storage faults.
pub trait StoreError: std::error::Error + Send + Sync + 'static {
  fn as_core(&self) -> Option<&crate::Error>;
}

/// Durable keyed storage for the three record collections.
///
/// Every operation is a single store call; there are no cross-record
/// transactions. A single `update` or `delete` is atomic with respect to the
/// record it touches.
///
/// All methods return `Send` futures so the trait can be used in
/// multi-threaded async runtimes (e.g. tokio with `axum`).
pub trait PropertyStore: Send + Sync {
  type Error: StoreError;

  /// All records of kind `E`, in insertion order.
  fn list<E: Record>(
    &self,
  ) -> impl Future<Output = Result<Vec<E>, Self::Error>> + Send + '_;

  /// Assign a fresh identifier, validate `input` and persist the record.
  fn create<E: Record>(
    &self,
    input: E::New,
  ) -> impl Future<Output = Result<E, Self::Error>> + Send + '_;

  /// Merge `patch` into the record with `id` and return the merged record.
  /// Fails with [`Error::NotFound`](crate::Error::NotFound) for an unknown id.
  fn update<E: Record>(
    &self,
    id: Uuid,
    patch: E::Patch,
  ) -> impl Future<Output = Result<E, Self::Error>> + Send + '_;

  /// Hard-delete the record with `id`. Referencing records are untouched.
  fn delete<E: Record>(
    &self,
    id: Uuid,
  ) -> impl Future<Output = Result<(), Self::Error>> + Send + '_;

  /// Exact, case-sensitive username lookup.
  fn find_tenant_by_username<'a>(
    &'a self,
    username: &'a str,
  ) -> impl Future<Output = Result<Option<Tenant>, Self::Error>> + Send + 'a;
}
