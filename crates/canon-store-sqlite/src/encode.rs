//! Conversion between [`ContactRecord`] and the columns of a `contacts` row.
//!
//! The whole record is kept as a JSON document; `id` and the timestamps are
//! duplicated into their own columns for lookups and ordering.

use canon_core::record::{ContactRecord, StoredRecord, timestamp};

use crate::{Error, Result};

/// Column values for one `contacts` row.
pub struct RawRecord {
  pub id:         String,
  pub document:   String,
  pub created_at: String,
  pub updated_at: String,
}

impl RawRecord {
  pub fn encode(record: &ContactRecord) -> Result<Self> {
    Ok(Self {
      id:         record.id.clone(),
      document:   serde_json::to_string(record)?,
      created_at: timestamp::format(&record.created_at),
      updated_at: timestamp::format(&record.updated_at),
    })
  }
}

/// Decode the document stored under `row_id`. A document without its own
/// `created_at` takes the row's.
pub fn decode_document(row_id: &str, document: &str, created_at: &str) -> Result<StoredRecord> {
  let mut record: StoredRecord = serde_json::from_str(document)?;
  if let Some(id) = record.id.as_deref()
    && id != row_id
  {
    return Err(Error::IdentityMismatch {
      row:      row_id.to_owned(),
      document: id.to_owned(),
    });
  }
  if record.created_at.is_none() {
    record.created_at = Some(timestamp::parse(created_at)?);
  }
  Ok(record)
}

#[cfg(test)]
mod tests {
  use super::*;

  #[test]
  fn missing_created_at_comes_from_the_row() {
    let record = decode_document(
      "5511987654321",
      r#"{"id":"5511987654321","tags":[]}"#,
      "2024-03-01T10:00:00Z",
    )
    .unwrap();
    assert_eq!(
      record.created_at.map(|dt| timestamp::format(&dt)).as_deref(),
      Some("2024-03-01T10:00:00Z")
    );
    assert_eq!(record.full_name, None);
  }

  #[test]
  fn document_id_must_match_the_row() {
    let err = decode_document("5511987654321", r#"{"id":"5521912345678"}"#, "2024-03-01T10:00:00Z")
      .unwrap_err();
    assert!(matches!(err, Error::IdentityMismatch { .. }), "{err}");
  }
}
