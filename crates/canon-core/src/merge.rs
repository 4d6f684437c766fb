//! Reconciling an incoming fragment with the stored record for its identity.
//!
//! Identity-descriptive fields (names, phone number) stick to whatever was
//! stored first. `id_in_platforms` and `conversation_history` only ever grow
//! and stay unique by their keys; `tags` only ever grow.

use std::collections::HashSet;

use chrono::{DateTime, SubsecRound as _, Utc};

use crate::{
  Error, Result,
  fragment::{IncomingFragment, PlatformFragment, TagFragment},
  identity::select_identity,
  phone::PhoneCandidate,
  record::{ContactRecord, Conversation, PlatformId, StoredRecord, Tag},
};

/// A customer name split on whitespace.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PersonName {
  pub full:  String,
  pub first: String,
  pub last:  String,
}

impl PersonName {
  pub fn parse(raw: &str) -> Self {
    let full = raw.trim().to_owned();
    let mut parts = full.split_whitespace();
    let first = parts.next().unwrap_or_default().to_owned();
    let last = parts.collect::<Vec<_>>().join(" ");
    Self { full, first, last }
  }
}

/// A fragment whose identity has been resolved, waiting for the stored
/// record (if any) to be merged into.
#[derive(Debug)]
pub struct Draft<'a> {
  fragment: &'a IncomingFragment,
  name:     PersonName,
  identity: PhoneCandidate,
}

/// Parse the name and select the identity. Fails with
/// [`Error::NoValidIdentity`] when no phone field yields a candidate.
pub fn prepare(fragment: &IncomingFragment) -> Result<Draft<'_>> {
  let name = PersonName::parse(&fragment.primary_data.customer_name);
  let identity = select_identity(fragment.primary_data.phone_fields())
    .ok_or(Error::NoValidIdentity)?;
  Ok(Draft { fragment, name, identity })
}

/// Merge `fragment` into `existing` in one step.
///
/// `existing` must be the record stored under the fragment's identity.
pub fn merge(
  fragment: &IncomingFragment,
  existing: Option<StoredRecord>,
  now: DateTime<Utc>,
) -> Result<ContactRecord> {
  Ok(prepare(fragment)?.reconcile(existing, now))
}

impl Draft<'_> {
  /// The canonical phone number the record will be keyed by.
  pub fn identity(&self) -> &str { &self.identity.normalized }

  /// Produce the record to persist. Timestamps are truncated to whole
  /// seconds, the precision they are stored with.
  ///
  /// Any field the stored document lacks is taken from the fragment, as if
  /// no record existed.
  pub fn reconcile(self, existing: Option<StoredRecord>, now: DateTime<Utc>) -> ContactRecord {
    let now = now.trunc_subsecs(0);
    let id = self.identity.normalized;
    let stored = existing.unwrap_or_default();
    let created_at = stored.created_at.unwrap_or(now);

    ContactRecord {
      full_name: stored.full_name.unwrap_or(self.name.full),
      first_name: stored.first_name.unwrap_or(self.name.first),
      last_name: stored.last_name.unwrap_or(self.name.last),
      phone_number: stored.phone_number.unwrap_or_else(|| id.clone()),
      number_invalid: stored.number_invalid,
      id_in_platforms: merge_platforms(stored.id_in_platforms, &self.fragment.platforms_to_add),
      tags: append_tags(stored.tags, &self.fragment.tags_to_add),
      conversation_history: merge_conversations(
        stored.conversation_history,
        &self.fragment.conversations_to_add,
      ),
      id,
      created_at,
      updated_at: now.max(created_at),
    }
  }
}

// ─── Collections ─────────────────────────────────────────────────────────────

/// Append platform ids whose `(platform, id_in_platform)` pair is new,
/// collapsing duplicates inside `incoming` as well.
fn merge_platforms(mut merged: Vec<PlatformId>, incoming: &[PlatformFragment]) -> Vec<PlatformId> {
  let mut seen: HashSet<(String, String)> = merged
    .iter()
    .map(|p| (p.platform.clone(), p.id_in_platform.clone()))
    .collect();

  for fragment in incoming {
    let entry = PlatformId::from(fragment);
    if seen.insert((entry.platform.clone(), entry.id_in_platform.clone())) {
      merged.push(entry);
    }
  }
  merged
}

fn append_tags(mut tags: Vec<Tag>, incoming: &[TagFragment]) -> Vec<Tag> {
  tags.extend(incoming.iter().map(Tag::from));
  tags
}

/// Append conversations with a non-empty, unseen `message_id`, in arrival
/// order after the stored ones. Stored entries are kept untouched.
fn merge_conversations(
  mut history: Vec<Conversation>,
  incoming: &[Conversation],
) -> Vec<Conversation> {
  let mut known: HashSet<String> = history.iter().map(|c| c.message_id.clone()).collect();

  for conversation in incoming {
    if conversation.message_id.is_empty() {
      continue;
    }
    if known.insert(conversation.message_id.clone()) {
      history.push(conversation.clone());
    }
  }
  history
}
