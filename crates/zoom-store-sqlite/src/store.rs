//! [`SqliteStore`]: the SQLite implementation of [`PropertyStore`].

use std::path::Path;

use chrono::Utc;
use rusqlite::OptionalExtension as _;
use tracing::debug;
use uuid::Uuid;

use zoom_core::{
  Record,
  store::PropertyStore,
  tenant::Tenant,
};

use crate::{
  encode::{RawDocument, decode_doc, encode_doc, encode_uuid},
  schema::SCHEMA,
  Error, Result,
};

// ─── Store ───────────────────────────────────────────────────────────────────

/// A property store backed by a single SQLite file.
///
/// All calls run one at a time on the connection's thread, so a merge inside
/// [`PropertyStore::update`] is never interleaved with another write.
///
/// Cloning is cheap; the inner connection is reference-counted.
#[derive(Clone)]
pub struct SqliteStore {
  conn: tokio_rusqlite::Connection,
}

/// Outcome of a read-merge-write inside one transaction.
enum Merge<E> {
  Missing,
  Rejected(Error),
  Merged(E),
}

impl SqliteStore {
  /// Open (or create) a store at `path` and run schema initialisation.
  pub async fn open(path: impl AsRef<Path>) -> Result<Self> {
    let conn = tokio_rusqlite::Connection::open(path).await?;
    let store = Self { conn };
    store.init_schema().await?;
    Ok(store)
  }

  /// Open an in-memory store, for tests.
  pub async fn open_in_memory() -> Result<Self> {
    let conn = tokio_rusqlite::Connection::open_in_memory().await?;
    let store = Self { conn };
    store.init_schema().await?;
    Ok(store)
  }

  async fn init_schema(&self) -> Result<()> {
    self
      .conn
      .call(|conn| {
        conn.execute_batch(SCHEMA)?;
        Ok(())
      })
      .await?;
    Ok(())
  }
}

/// Map a unique-index violation on write to the domain's duplicate error.
fn classify<E: Record>(err: tokio_rusqlite::Error) -> Error {
  let duplicate = matches!(
    &err,
    tokio_rusqlite::Error::Rusqlite(rusqlite::Error::SqliteFailure(f, _))
      if f.code == rusqlite::ErrorCode::ConstraintViolation
  );
  if duplicate {
    Error::Core(zoom_core::Error::Duplicate(E::KIND))
  } else {
    Error::Database(err)
  }
}

fn not_found<E: Record>(id: Uuid) -> Error {
  Error::Core(zoom_core::Error::NotFound { kind: E::KIND, id })
}

// ─── PropertyStore impl ──────────────────────────────────────────────────────

impl PropertyStore for SqliteStore {
  type Error = Error;

  async fn list<E: Record>(&self) -> Result<Vec<E>> {
    let sql = format!("SELECT id, doc FROM {} ORDER BY seq", E::KIND.collection());

    let raws: Vec<RawDocument> = self
      .conn
      .call(move |conn| {
        let mut stmt = conn.prepare(&sql)?;
        let rows = stmt
          .query_map([], |row| {
            Ok(RawDocument { id: row.get(0)?, doc: row.get(1)? })
          })?
          .collect::<rusqlite::Result<Vec<_>>>()?;
        Ok(rows)
      })
      .await?;

    raws.into_iter().map(RawDocument::into_record).collect()
  }

  async fn create<E: Record>(&self, input: E::New) -> Result<E> {
    let record = E::build(Uuid::new_v4(), input, Utc::now().date_naive())?;

    let id_str = encode_uuid(record.id());
    let doc    = encode_doc(&record)?;
    let sql    = format!("INSERT INTO {} (id, doc) VALUES (?1, ?2)", E::KIND.collection());

    self
      .conn
      .call(move |conn| {
        conn.execute(&sql, rusqlite::params![id_str, doc])?;
        Ok(())
      })
      .await
      .map_err(classify::<E>)?;

    debug!(kind = %E::KIND, id = %record.id(), "created record");
    Ok(record)
  }

  async fn update<E: Record>(&self, id: Uuid, patch: E::Patch) -> Result<E> {
    let id_str = encode_uuid(id);
    let table  = E::KIND.collection();

    let merge: Merge<E> = self
      .conn
      .call(move |conn| {
        let tx = conn.transaction()?;

        let doc: Option<String> = tx
          .query_row(
            &format!("SELECT doc FROM {table} WHERE id = ?1"),
            rusqlite::params![id_str],
            |r| r.get(0),
          )
          .optional()?;

        let Some(doc) = doc else {
          return Ok(Merge::Missing);
        };

        let mut record: E = match decode_doc(&doc) {
          Ok(r) => r,
          Err(e) => return Ok(Merge::Rejected(e)),
        };
        if let Err(e) = record.apply(patch) {
          return Ok(Merge::Rejected(e.into()));
        }
        let merged = match encode_doc(&record) {
          Ok(d) => d,
          Err(e) => return Ok(Merge::Rejected(e)),
        };

        tx.execute(
          &format!("UPDATE {table} SET doc = ?2 WHERE id = ?1"),
          rusqlite::params![id_str, merged],
        )?;
        tx.commit()?;
        Ok(Merge::Merged(record))
      })
      .await
      .map_err(classify::<E>)?;

    match merge {
      Merge::Missing => Err(not_found::<E>(id)),
      Merge::Rejected(e) => Err(e),
      Merge::Merged(record) => {
        debug!(kind = %E::KIND, %id, "updated record");
        Ok(record)
      }
    }
  }

  async fn delete<E: Record>(&self, id: Uuid) -> Result<()> {
    let id_str = encode_uuid(id);
    let sql    = format!("DELETE FROM {} WHERE id = ?1", E::KIND.collection());

    let removed = self
      .conn
      .call(move |conn| Ok(conn.execute(&sql, rusqlite::params![id_str])?))
      .await?;

    if removed == 0 {
      return Err(not_found::<E>(id));
    }
    debug!(kind = %E::KIND, %id, "deleted record");
    Ok(())
  }

  async fn find_tenant_by_username<'a>(
    &'a self,
    username: &'a str,
  ) -> Result<Option<Tenant>> {
    let username = username.to_owned();

    let raw: Option<RawDocument> = self
      .conn
      .call(move |conn| {
        Ok(conn
          .query_row(
            "SELECT id, doc FROM tenants WHERE json_extract(doc, '$.username') = ?1",
            rusqlite::params![username],
            |row| Ok(RawDocument { id: row.get(0)?, doc: row.get(1)? }),
          )
          .optional()?)
      })
      .await?;

    raw.map(RawDocument::into_record).transpose()
  }
}
