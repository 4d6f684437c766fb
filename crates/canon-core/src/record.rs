//! The persisted contact document and its append-only collections.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::fragment::lenient_string;

/// Identity placeholder used when no phone number survives selection. A
/// record carrying it must never reach a store.
pub const NO_IDENTITY: &str = "N/A";

// ─── Collections ─────────────────────────────────────────────────────────────

/// An account of the contact on some messaging platform. Unique per record
/// by the `(platform, id_in_platform)` pair.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PlatformId {
  #[serde(default, deserialize_with = "lenient_string")]
  pub platform:       String,
  #[serde(default, deserialize_with = "lenient_string")]
  pub id_in_platform: String,
}

/// A label applied to the contact. Duplicates are allowed.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Tag {
  #[serde(default, deserialize_with = "lenient_string")]
  pub tag_name:   String,
  #[serde(default, deserialize_with = "lenient_string")]
  pub tag_add_at: String,
}

/// One message exchanged with the contact, unique per record by
/// `message_id`. Every field is read permissively and defaults to `""`.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Conversation {
  #[serde(default, deserialize_with = "lenient_string")]
  pub message_id:      String,
  #[serde(default, deserialize_with = "lenient_string")]
  pub phone_sender:    String,
  #[serde(default, deserialize_with = "lenient_string")]
  pub phone_receiver:  String,
  #[serde(default, deserialize_with = "lenient_string")]
  pub message_user:    String,
  #[serde(default, deserialize_with = "lenient_string")]
  pub message_date:    String,
  #[serde(default, deserialize_with = "lenient_string")]
  pub message_content: String,
}

// ─── Record ──────────────────────────────────────────────────────────────────

/// The authoritative, deduplicated document for one phone identity.
///
/// Field declaration order is the serialized key order consumers rely on.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ContactRecord {
  pub full_name:            String,
  pub first_name:           String,
  pub last_name:            String,
  pub phone_number:         String,
  pub number_invalid:       bool,
  pub id_in_platforms:      Vec<PlatformId>,
  pub tags:                 Vec<Tag>,
  pub conversation_history: Vec<Conversation>,
  /// The canonical phone number; the store's unique key.
  pub id:                   String,
  /// Set on first persistence, never changed afterwards.
  #[serde(with = "timestamp")]
  pub created_at:           DateTime<Utc>,
  #[serde(with = "timestamp")]
  pub updated_at:           DateTime<Utc>,
}

impl ContactRecord {
  /// Whether this record may be handed to a store.
  pub fn has_identity(&self) -> bool {
    !self.id.is_empty() && self.id != NO_IDENTITY
  }
}

/// A record as read back from a store.
///
/// Documents may predate a field or have been written by other tools, so
/// every field is optional. Collections default to empty; identity fields
/// stay `None` and the merge falls back to the values it computed.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct StoredRecord {
  #[serde(default, skip_serializing_if = "Option::is_none")]
  pub full_name:            Option<String>,
  #[serde(default, skip_serializing_if = "Option::is_none")]
  pub first_name:           Option<String>,
  #[serde(default, skip_serializing_if = "Option::is_none")]
  pub last_name:            Option<String>,
  #[serde(default, skip_serializing_if = "Option::is_none")]
  pub phone_number:         Option<String>,
  #[serde(default)]
  pub number_invalid:       bool,
  #[serde(default)]
  pub id_in_platforms:      Vec<PlatformId>,
  #[serde(default)]
  pub tags:                 Vec<Tag>,
  #[serde(default)]
  pub conversation_history: Vec<Conversation>,
  #[serde(default, skip_serializing_if = "Option::is_none")]
  pub id:                   Option<String>,
  #[serde(default, skip_serializing_if = "Option::is_none", with = "timestamp::option")]
  pub created_at:           Option<DateTime<Utc>>,
  #[serde(default, skip_serializing_if = "Option::is_none", with = "timestamp::option")]
  pub updated_at:           Option<DateTime<Utc>>,
}

impl From<ContactRecord> for StoredRecord {
  fn from(record: ContactRecord) -> Self {
    Self {
      full_name:            Some(record.full_name),
      first_name:           Some(record.first_name),
      last_name:            Some(record.last_name),
      phone_number:         Some(record.phone_number),
      number_invalid:       record.number_invalid,
      id_in_platforms:      record.id_in_platforms,
      tags:                 record.tags,
      conversation_history: record.conversation_history,
      id:                   Some(record.id),
      created_at:           Some(record.created_at),
      updated_at:           Some(record.updated_at),
    }
  }
}

/// `YYYY-MM-DDTHH:MM:SSZ` on the way out; any RFC 3339 string on the way in.
pub mod timestamp {
  use chrono::{DateTime, ParseError, Utc};
  use serde::{Deserialize, Deserializer, Serializer, de::Error as _};

  const FORMAT: &str = "%Y-%m-%dT%H:%M:%SZ";

  pub fn format(dt: &DateTime<Utc>) -> String { dt.format(FORMAT).to_string() }

  pub fn parse(s: &str) -> Result<DateTime<Utc>, ParseError> {
    DateTime::parse_from_rfc3339(s).map(|dt| dt.with_timezone(&Utc))
  }

  pub fn serialize<S: Serializer>(
    dt: &DateTime<Utc>,
    serializer: S,
  ) -> Result<S::Ok, S::Error> {
    serializer.collect_str(&dt.format(FORMAT))
  }

  pub fn deserialize<'de, D: Deserializer<'de>>(
    deserializer: D,
  ) -> Result<DateTime<Utc>, D::Error> {
    let s = String::deserialize(deserializer)?;
    parse(&s).map_err(D::Error::custom)
  }

  /// The same format for optional timestamps; `null` reads as `None`.
  pub mod option {
    use chrono::{DateTime, Utc};
    use serde::{Deserialize, Deserializer, Serializer, de::Error as _};

    pub fn serialize<S: Serializer>(
      dt: &Option<DateTime<Utc>>,
      serializer: S,
    ) -> Result<S::Ok, S::Error> {
      match dt {
        Some(dt) => super::serialize(dt, serializer),
        None => serializer.serialize_none(),
      }
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(
      deserializer: D,
    ) -> Result<Option<DateTime<Utc>>, D::Error> {
      Option::<String>::deserialize(deserializer)?
        .map(|s| super::parse(&s).map_err(D::Error::custom))
        .transpose()
    }
  }
}
