//! Error types for `canon-core`.

use thiserror::Error;

#[derive(Debug, Error)]
pub enum Error {
  /// A single phone field could not be read as a number. Never fatal to the
  /// fragment on its own; the selector logs it and moves on.
  #[error("cannot normalize phone field {field}: {reason}")]
  PhoneNormalization {
    field:  &'static str,
    reason: String,
  },

  #[error("no valid phone number among the candidate fields")]
  NoValidIdentity,

  #[error("store error: {0}")]
  Store(#[source] Box<dyn std::error::Error + Send + Sync>),
}

impl Error {
  pub(crate) fn store<E>(e: E) -> Self
  where
    E: std::error::Error + Send + Sync + 'static,
  {
    Self::Store(Box::new(e))
  }
}

pub type Result<T, E = Error> = std::result::Result<T, E>;
