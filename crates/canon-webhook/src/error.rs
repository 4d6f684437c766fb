//! Error types and axum `IntoResponse` implementation.

use axum::{
  Json,
  http::StatusCode,
  response::{IntoResponse, Response},
};
use serde_json::json;
use thiserror::Error;

/// An error returned by a handler. Rendered as `{"error": "<message>"}`.
#[derive(Debug, Error)]
pub enum Error {
  /// The merge pipeline refused the fragment; nothing was persisted.
  #[error(transparent)]
  Rejected(#[from] canon_core::Error),

  #[error("not found: {0}")]
  NotFound(String),

  /// The body could not be read as a fragment. Carries the status axum
  /// chose (400, 413, 415, ...).
  #[error("invalid request body: {message}")]
  InvalidBody {
    status:  StatusCode,
    message: String,
  },

  #[error("store error: {0}")]
  Store(#[source] Box<dyn std::error::Error + Send + Sync>),
}

impl Error {
  fn status(&self) -> StatusCode {
    match self {
      Error::Rejected(canon_core::Error::NoValidIdentity) => StatusCode::UNPROCESSABLE_ENTITY,
      Error::Rejected(canon_core::Error::PhoneNormalization { .. }) => StatusCode::BAD_REQUEST,
      Error::Rejected(canon_core::Error::Store(_)) | Error::Store(_) => {
        StatusCode::INTERNAL_SERVER_ERROR
      }
      Error::NotFound(_) => StatusCode::NOT_FOUND,
      Error::InvalidBody { status, .. } => *status,
    }
  }
}

impl IntoResponse for Error {
  fn into_response(self) -> Response {
    let status = self.status();
    if status.is_server_error() {
      tracing::error!(error = %self, "request failed");
    }
    (status, Json(json!({ "error": self.to_string() }))).into_response()
  }
}
