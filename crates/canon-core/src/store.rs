//! The `RecordStore` trait: the persistence contract the merge engine needs.
//!
//! Implemented by storage backends (e.g. `canon-store-sqlite`). Connection
//! management, timeouts and retries belong to the implementation.

use std::future::Future;

use crate::record::{ContactRecord, StoredRecord};

/// What an upsert did to the store.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct UpsertOutcome {
  /// A document with the same identity already existed and was replaced.
  pub matched:      bool,
  /// No document existed; a new one was inserted.
  pub inserted_new: bool,
}

impl UpsertOutcome {
  pub const INSERTED: Self = Self { matched: false, inserted_new: true };
  pub const UPDATED: Self = Self { matched: true, inserted_new: false };
}

/// Abstraction over a contact document store keyed by canonical phone number.
///
/// A transport failure must surface as `Err`, never as `Ok(None)`: "could not
/// ask" and "not found" are different answers.
///
/// All methods return `Send` futures so the trait can be used in multi-threaded
/// async runtimes (e.g. tokio with `axum`).
pub trait RecordStore: Send + Sync {
  type Error: std::error::Error + Send + Sync + 'static;

  /// Fetch the record whose `id` equals `id`. Returns `None` if not found.
  ///
  /// A document missing some fields is still returned; only a document that
  /// cannot be read at all is an error.
  fn fetch_by_identity<'a>(
    &'a self,
    id: &'a str,
  ) -> impl Future<Output = Result<Option<StoredRecord>, Self::Error>> + Send + 'a;

  /// Insert `record`, or replace the stored record with the same `id`.
  ///
  /// Implementations must refuse records without a persistable identity
  /// (see [`ContactRecord::has_identity`]).
  fn upsert_by_identity<'a>(
    &'a self,
    record: &'a ContactRecord,
  ) -> impl Future<Output = Result<UpsertOutcome, Self::Error>> + Send + 'a;
}
