//! Error type for `canon-store-sqlite`.

use thiserror::Error;

#[derive(Debug, Error)]
pub enum Error {
  #[error("database error: {0}")]
  Database(#[from] tokio_rusqlite::Error),

  #[error("json error: {0}")]
  Json(#[from] serde_json::Error),

  #[error("invalid stored timestamp: {0}")]
  Timestamp(#[from] chrono::ParseError),

  /// The stored row and the document inside it disagree about the identity.
  #[error("document stored under {row} carries id {document}")]
  IdentityMismatch { row: String, document: String },

  /// Attempted to persist a record with no usable identity.
  #[error("refusing to persist record with id {0:?}")]
  MissingIdentity(String),
}

pub type Result<T, E = Error> = std::result::Result<T, E>;
