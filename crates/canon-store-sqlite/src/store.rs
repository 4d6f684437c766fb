//! [`SqliteStore`] — the SQLite implementation of [`RecordStore`].

use std::path::Path;

use canon_core::{
  record::{ContactRecord, StoredRecord},
  store::{RecordStore, UpsertOutcome},
};
use rusqlite::OptionalExtension as _;

use crate::{
  Error, Result,
  encode::{RawRecord, decode_document},
  schema::SCHEMA,
};

// ─── Store ───────────────────────────────────────────────────────────────────

/// A contact record store backed by a single SQLite file.
///
/// Cloning is cheap — the inner connection is reference-counted.
#[derive(Clone)]
pub struct SqliteStore {
  conn: tokio_rusqlite::Connection,
}

impl SqliteStore {
  /// Open (or create) a store at `path` and run schema initialisation.
  pub async fn open(path: impl AsRef<Path>) -> Result<Self> {
    let conn = tokio_rusqlite::Connection::open(path).await?;
    let store = Self { conn };
    store.init_schema().await?;
    Ok(store)
  }

  /// Open an in-memory store — useful for testing.
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
    tracing::debug!("contact store schema ready");
    Ok(())
  }

  /// Number of stored records.
  pub async fn count(&self) -> Result<usize> {
    let n: i64 = self
      .conn
      .call(|conn| Ok(conn.query_row("SELECT COUNT(*) FROM contacts", [], |r| r.get(0))?))
      .await?;
    Ok(usize::try_from(n).unwrap_or_default())
  }
}

// ─── RecordStore impl ────────────────────────────────────────────────────────

impl RecordStore for SqliteStore {
  type Error = Error;

  async fn fetch_by_identity(&self, id: &str) -> Result<Option<StoredRecord>> {
    let id_str = id.to_owned();

    let row: Option<(String, String)> = self
      .conn
      .call(move |conn| {
        Ok(conn
          .query_row(
            "SELECT document, created_at FROM contacts WHERE id = ?1",
            rusqlite::params![id_str],
            |row| Ok((row.get(0)?, row.get(1)?)),
          )
          .optional()?)
      })
      .await?;

    row
      .map(|(document, created_at)| decode_document(id, &document, &created_at))
      .transpose()
  }

  async fn upsert_by_identity(&self, record: &ContactRecord) -> Result<UpsertOutcome> {
    if !record.has_identity() {
      return Err(Error::MissingIdentity(record.id.clone()));
    }

    let raw = RawRecord::encode(record)?;

    let matched: bool = self
      .conn
      .call(move |conn| {
        let tx = conn.transaction()?;

        let matched = tx
          .query_row(
            "SELECT 1 FROM contacts WHERE id = ?1",
            rusqlite::params![raw.id],
            |_| Ok(true),
          )
          .optional()?
          .unwrap_or(false);

        tx.execute(
          "INSERT INTO contacts (id, document, created_at, updated_at)
           VALUES (?1, ?2, ?3, ?4)
           ON CONFLICT(id) DO UPDATE SET
             document   = excluded.document,
             updated_at = excluded.updated_at",
          rusqlite::params![raw.id, raw.document, raw.created_at, raw.updated_at],
        )?;

        tx.commit()?;
        Ok(matched)
      })
      .await?;

    Ok(if matched { UpsertOutcome::UPDATED } else { UpsertOutcome::INSERTED })
  }
}

// ─── Test helpers ────────────────────────────────────────────────────────────

#[cfg(test)]
impl SqliteStore {
  /// Write a row directly, bypassing encoding.
  pub(crate) async fn insert_raw(&self, id: &str, document: &str, created_at: &str) -> Result<()> {
    let (id, document, created_at) = (id.to_owned(), document.to_owned(), created_at.to_owned());
    self
      .conn
      .call(move |conn| {
        conn.execute(
          "INSERT INTO contacts (id, document, created_at, updated_at) VALUES (?1, ?2, ?3, ?3)",
          rusqlite::params![id, document, created_at],
        )?;
        Ok(())
      })
      .await?;
    Ok(())
  }

  /// The `created_at` column of the row stored under `id`.
  pub(crate) async fn created_at_column(&self, id: &str) -> Result<String> {
    let id = id.to_owned();
    let created_at: String = self
      .conn
      .call(move |conn| {
        Ok(conn.query_row(
          "SELECT created_at FROM contacts WHERE id = ?1",
          rusqlite::params![id],
          |row| row.get(0),
        )?)
      })
      .await?;
    Ok(created_at)
  }
}
