//! Handlers for frame tagging and lookup.

use std::{collections::BTreeSet, sync::Arc};

use axum::{
  Json,
  extract::{Path, State},
  http::StatusCode,
};
use semkb_core::{frame::Frame, sentence::SentenceId, store::KnowledgeStore};
use serde::Deserialize;

use crate::error::ApiError;

#[derive(Debug, Deserialize)]
pub struct TagBody {
  pub frames: BTreeSet<String>,
}

/// `POST /sentences/{id}/frames`, body: `{"frames":["Being_born"]}`
pub async fn tag<S>(
  State(store): State<Arc<S>>,
  Path(id): Path<SentenceId>,
  Json(body): Json<TagBody>,
) -> Result<StatusCode, ApiError>
where
  S: KnowledgeStore,
{
  store
    .tag_sentence(id, body.frames)
    .await
    .map_err(ApiError::from_store)?;
  Ok(StatusCode::NO_CONTENT)
}

/// `GET /frames/{label}`
pub async fn get_one<S>(
  State(store): State<Arc<S>>,
  Path(label): Path<String>,
) -> Result<Json<Frame>, ApiError>
where
  S: KnowledgeStore,
{
  let frame = store
    .frame(&label)
    .await
    .map_err(ApiError::from_store)?
    .ok_or_else(|| ApiError::NotFound(format!("frame {label:?} not found")))?;
  Ok(Json(frame))
}
