//! Encoding and decoding helpers between domain records and the plain-text
//! representations stored in SQLite columns.
//!
//! UUIDs are stored as hyphenated lowercase strings. Records are stored as
//! compact JSON documents.

use uuid::Uuid;
use zoom_core::Record;

use crate::{Error, Result};

// ─── Uuid ─────────────────────────────────────────────────────────────────────

pub fn encode_uuid(id: Uuid) -> String { id.hyphenated().to_string() }

pub fn decode_uuid(s: &str) -> Result<Uuid> { Ok(Uuid::parse_str(s)?) }

// ─── Documents ───────────────────────────────────────────────────────────────

pub fn encode_doc<E: Record>(record: &E) -> Result<String> {
  Ok(serde_json::to_string(record)?)
}

pub fn decode_doc<E: Record>(doc: &str) -> Result<E> {
  Ok(serde_json::from_str(doc)?)
}

// ─── Row types ───────────────────────────────────────────────────────────────

/// Raw strings read directly from a collection row.
pub struct RawDocument {
  pub id:  String,
  pub doc: String,
}

impl RawDocument {
  pub fn into_record<E: Record>(self) -> Result<E> {
    let id = decode_uuid(&self.id)?;
    let record: E = decode_doc(&self.doc)?;
    if record.id() != id {
      return Err(Error::Corrupt {
        table:  E::KIND.collection(),
        detail: format!("row {id} holds document {}", record.id()),
      });
    }
    Ok(record)
  }
}
