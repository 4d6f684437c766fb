//! The partial update carried by one webhook event.
//!
//! Parsing is permissive: absent or `null` members default to empty values,
//! and scalar sub-fields accept numbers and booleans as text.

use serde::{Deserialize, Deserializer, de::Error as _};
use serde_json::Value;

use crate::record::{Conversation, PlatformId, Tag};

/// Names of the raw phone fields, in selection priority order.
pub const PHONE_FIELDS: [&str; 4] = ["mobile_1", "mobile_2", "mobile_3", "mobile_4"];

#[derive(Debug, Clone, Default, Deserialize)]
pub struct IncomingFragment {
  #[serde(default, deserialize_with = "or_default")]
  pub primary_data:         PrimaryData,
  #[serde(default, deserialize_with = "or_default")]
  pub platforms_to_add:     Vec<PlatformFragment>,
  #[serde(default, deserialize_with = "or_default")]
  pub tags_to_add:          Vec<TagFragment>,
  #[serde(default, deserialize_with = "or_default")]
  pub conversations_to_add: Vec<Conversation>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct PrimaryData {
  #[serde(default, deserialize_with = "lenient_string")]
  pub customer_name: String,
  /// Phone fields stay raw JSON; their interpretation belongs to the
  /// identity selector.
  #[serde(default)]
  pub mobile_1:      Option<Value>,
  #[serde(default)]
  pub mobile_2:      Option<Value>,
  #[serde(default)]
  pub mobile_3:      Option<Value>,
  #[serde(default)]
  pub mobile_4:      Option<Value>,
}

impl PrimaryData {
  /// The four phone fields paired with their names, in input order.
  pub fn phone_fields(&self) -> [(&'static str, Option<&Value>); 4] {
    [
      (PHONE_FIELDS[0], self.mobile_1.as_ref()),
      (PHONE_FIELDS[1], self.mobile_2.as_ref()),
      (PHONE_FIELDS[2], self.mobile_3.as_ref()),
      (PHONE_FIELDS[3], self.mobile_4.as_ref()),
    ]
  }
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct PlatformFragment {
  #[serde(default, deserialize_with = "lenient_string")]
  pub platform:    String,
  #[serde(default, deserialize_with = "lenient_string")]
  pub platform_id: String,
}

impl From<&PlatformFragment> for PlatformId {
  fn from(f: &PlatformFragment) -> Self {
    PlatformId {
      platform:       f.platform.clone(),
      id_in_platform: f.platform_id.clone(),
    }
  }
}

/// A tag as senders actually deliver it: the timestamp arrives under either
/// `tag_add_at` or `tag_added_at`.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct TagFragment {
  #[serde(default, deserialize_with = "lenient_string")]
  pub tag_name:     String,
  #[serde(default, deserialize_with = "lenient_opt_string")]
  pub tag_add_at:   Option<String>,
  #[serde(default, deserialize_with = "lenient_opt_string")]
  pub tag_added_at: Option<String>,
}

impl TagFragment {
  /// `tag_added_at` takes precedence when both spellings are present.
  pub fn added_at(&self) -> &str {
    self
      .tag_added_at
      .as_deref()
      .or(self.tag_add_at.as_deref())
      .unwrap_or_default()
  }
}

impl From<&TagFragment> for Tag {
  fn from(f: &TagFragment) -> Self {
    Tag {
      tag_name:   f.tag_name.clone(),
      tag_add_at: f.added_at().to_owned(),
    }
  }
}

// ─── Permissive deserializers ────────────────────────────────────────────────

fn or_default<'de, D, T>(deserializer: D) -> Result<T, D::Error>
where
  D: Deserializer<'de>,
  T: Deserialize<'de> + Default,
{
  Ok(Option::<T>::deserialize(deserializer)?.unwrap_or_default())
}

/// Render a JSON scalar as text; `null` becomes the empty string.
pub(crate) fn lenient_string<'de, D>(deserializer: D) -> Result<String, D::Error>
where
  D: Deserializer<'de>,
{
  Ok(lenient_opt_string(deserializer)?.unwrap_or_default())
}

fn lenient_opt_string<'de, D>(deserializer: D) -> Result<Option<String>, D::Error>
where
  D: Deserializer<'de>,
{
  match Value::deserialize(deserializer)? {
    Value::Null => Ok(None),
    other => scalar_text(&other)
      .map(Some)
      .ok_or_else(|| D::Error::custom(format!("expected a scalar, found {}", kind_of(&other)))),
  }
}

/// Text form of a string, number or boolean. `None` for anything else.
fn scalar_text(value: &Value) -> Option<String> {
  match value {
    Value::String(s) => Some(s.clone()),
    Value::Number(n) => Some(n.to_string()),
    Value::Bool(b) => Some(b.to_string()),
    _ => None,
  }
}

pub(crate) fn kind_of(value: &Value) -> &'static str {
  match value {
    Value::Null => "null",
    Value::Bool(_) => "a boolean",
    Value::Number(_) => "a number",
    Value::String(_) => "a string",
    Value::Array(_) => "an array",
    Value::Object(_) => "an object",
  }
}
