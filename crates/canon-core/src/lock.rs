//! Per-identity mutual exclusion for the fetch → merge → upsert sequence.
//!
//! Two events for the same phone number must not both read the same stored
//! snapshot, or the later upsert silently drops the earlier one's additions.
//! Events for different numbers never contend.

use std::{
  collections::HashMap,
  sync::{Arc, Mutex, PoisonError, Weak},
};

use tokio::sync::{Mutex as AsyncMutex, OwnedMutexGuard};

/// A table of async locks keyed by identity.
///
/// Entries are held weakly and pruned once no task holds or awaits them, so
/// the table only tracks identities with work in flight.
#[derive(Debug, Default)]
pub struct IdentityLocks {
  table: Mutex<HashMap<String, Weak<AsyncMutex<()>>>>,
}

impl IdentityLocks {
  pub fn new() -> Self { Self::default() }

  /// Wait for exclusive access to `id`. Access lasts until the guard drops.
  pub async fn acquire(&self, id: &str) -> OwnedMutexGuard<()> {
    let lock = {
      let mut table = self.table.lock().unwrap_or_else(PoisonError::into_inner);
      table.retain(|_, entry| entry.strong_count() > 0);
      match table.get(id).and_then(Weak::upgrade) {
        Some(lock) => lock,
        None => {
          let lock = Arc::new(AsyncMutex::new(()));
          table.insert(id.to_owned(), Arc::downgrade(&lock));
          lock
        }
      }
    };
    lock.lock_owned().await
  }

  #[cfg(test)]
  fn tracked(&self) -> usize {
    let table = self.table.lock().unwrap_or_else(PoisonError::into_inner);
    table.values().filter(|entry| entry.strong_count() > 0).count()
  }
}
