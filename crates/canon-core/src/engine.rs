//! [`MergeEngine`] — identity selection, fetch, merge and upsert for one
//! webhook fragment.

use std::sync::Arc;

use chrono::{DateTime, Utc};

use crate::{
  Error, Result,
  fragment::IncomingFragment,
  lock::IdentityLocks,
  merge::prepare,
  record::ContactRecord,
  store::RecordStore,
};

/// Drives a fragment through the whole merge pipeline against a store.
///
/// The engine itself holds no record state. Concurrent calls for the same
/// identity are serialized; calls for different identities run freely.
pub struct MergeEngine<S> {
  store: Arc<S>,
  locks: IdentityLocks,
}

impl<S: RecordStore> MergeEngine<S> {
  pub fn new(store: Arc<S>) -> Self {
    Self { store, locks: IdentityLocks::new() }
  }

  pub fn store(&self) -> &Arc<S> { &self.store }

  /// Merge `fragment` into the stored record for its identity and persist
  /// the result, returning it.
  ///
  /// Nothing is written, and the store is not consulted, when the fragment
  /// has no valid identity. Store failures on either call reject the
  /// fragment; no retry happens here.
  pub async fn ingest(
    &self,
    fragment: &IncomingFragment,
    now: DateTime<Utc>,
  ) -> Result<ContactRecord> {
    let draft = prepare(fragment).inspect_err(|_| {
      tracing::warn!("no valid phone number in fragment; not persisting");
    })?;

    let _guard = self.locks.acquire(draft.identity()).await;

    let existing = self
      .store
      .fetch_by_identity(draft.identity())
      .await
      .map_err(|e| {
        tracing::error!(id = draft.identity(), error = %e, "failed to fetch stored record");
        Error::store(e)
      })?;

    let record = draft.reconcile(existing, now);

    let outcome = self
      .store
      .upsert_by_identity(&record)
      .await
      .map_err(|e| {
        tracing::error!(id = %record.id, error = %e, "failed to save record");
        Error::store(e)
      })?;

    if outcome.inserted_new {
      tracing::info!(id = %record.id, "inserted new contact record");
    } else if outcome.matched {
      tracing::info!(id = %record.id, "updated contact record");
    } else {
      tracing::warn!(id = %record.id, "upsert reported no change");
    }

    Ok(record)
  }
}
