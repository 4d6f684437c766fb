//! `GET /contacts/{phone}` — read a merged record.
//!
//! The path segment is normalized the same way webhook phone fields are, so
//! `11987654321`, `+55 (11) 98765-4321` and `5511987654321` all resolve to
//! the same record.

use axum::{
  Json,
  extract::{Path, State},
};
use canon_core::{phone, record::StoredRecord, store::RecordStore};

use crate::{AppState, error::Error};

pub async fn get_one<S>(
  State(state): State<AppState<S>>,
  Path(raw): Path<String>,
) -> Result<Json<StoredRecord>, Error>
where
  S: RecordStore + 'static,
{
  let id = phone::normalize(&raw).normalized;
  let record = state
    .engine
    .store()
    .fetch_by_identity(&id)
    .await
    .map_err(|e| Error::Store(Box::new(e)))?
    .ok_or_else(|| Error::NotFound(format!("contact {id} not found")))?;
  Ok(Json(record))
}
