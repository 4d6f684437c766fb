//! `POST /webhook` — merge one contact fragment into its stored record.

use axum::{
  Json,
  extract::{State, rejection::JsonRejection},
  http::StatusCode,
};
use canon_core::{fragment::IncomingFragment, record::ContactRecord, store::RecordStore};
use chrono::Utc;

use crate::{AppState, error::Error};

/// Returns the merged record on success. A fragment without a usable phone
/// number is answered with 422 and never persisted.
pub async fn receive<S>(
  State(state): State<AppState<S>>,
  payload: Result<Json<IncomingFragment>, JsonRejection>,
) -> Result<Json<ContactRecord>, Error>
where
  S: RecordStore + 'static,
{
  let Json(fragment) = payload.map_err(|e| {
    let status = match &e {
      // 422 is reserved for fragments without a usable phone number.
      JsonRejection::JsonDataError(_) => StatusCode::BAD_REQUEST,
      _ => e.status(),
    };
    Error::InvalidBody { status, message: e.body_text() }
  })?;
  let record = state.engine.ingest(&fragment, Utc::now()).await?;
  Ok(Json(record))
}
