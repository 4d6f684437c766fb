//! SQL schema for the contact record store.
//!
//! Executed once at connection startup. Future migrations will be gated on
//! `PRAGMA user_version`.

/// Full schema DDL; idempotent thanks to `CREATE TABLE IF NOT EXISTS`.
pub const SCHEMA: &str = "
PRAGMA journal_mode = WAL;

-- One document per canonical phone number.
-- created_at is written on insert only; upserts never touch it.
CREATE TABLE IF NOT EXISTS contacts (
    id          TEXT PRIMARY KEY,   -- canonical phone number, never 'N/A'
    document    TEXT NOT NULL,      -- full ContactRecord as JSON
    created_at  TEXT NOT NULL,
    updated_at  TEXT NOT NULL,
    CHECK (id != '' AND id != 'N/A')
);

CREATE INDEX IF NOT EXISTS contacts_updated_idx ON contacts(updated_at);

PRAGMA user_version = 1;
";
