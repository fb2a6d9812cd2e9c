//! SQL schema for the Zoom SQLite store.
//!
//! Executed once at connection startup. Future migrations will be gated on
//! `PRAGMA user_version`.

/// Full schema DDL; idempotent thanks to `IF NOT EXISTS`.
///
/// `seq` is the internal key and fixes insertion order; it never leaves the
/// store. `id` is the external identifier every caller sees.
pub const SCHEMA: &str = "
PRAGMA journal_mode = WAL;

CREATE TABLE IF NOT EXISTS tenants (
    seq  INTEGER PRIMARY KEY AUTOINCREMENT,
    id   TEXT NOT NULL UNIQUE,
    doc  TEXT NOT NULL          -- JSON-encoded Tenant
);

CREATE TABLE IF NOT EXISTS staff (
    seq  INTEGER PRIMARY KEY AUTOINCREMENT,
    id   TEXT NOT NULL UNIQUE,
    doc  TEXT NOT NULL          -- JSON-encoded Staff
);

-- No foreign key to tenants: complaints outlive the tenant that filed them.
CREATE TABLE IF NOT EXISTS complaints (
    seq  INTEGER PRIMARY KEY AUTOINCREMENT,
    id   TEXT NOT NULL UNIQUE,
    doc  TEXT NOT NULL          -- JSON-encoded Complaint
);

CREATE UNIQUE INDEX IF NOT EXISTS tenants_username_idx
    ON tenants (json_extract(doc, '$.username'));

PRAGMA user_version = 1;
";
