//! Handlers for `/headings` endpoints.
//!
//! | Method | Path | Notes |
//! |--------|------|-------|
//! | `POST` | `/headings` | Body: `{"text":"Intro","parent_id":1}`; parent optional |
//! | `POST` | `/headings/chain` | Body: `{"texts":["Intro","Background"]}` |
//! | `POST` | `/headings/{id}/move` | Body: `{"parent_id":3}` |
//! | `GET`  | `/headings/{id}/hierarchy` | Ancestors and descendants |
//! | `GET`  | `/headings/{id}/content` | 404 if nothing is filed there |

use std::sync::Arc;

use axum::{
  Json,
  extract::{Path, State},
  http::StatusCode,
  response::IntoResponse,
};
use semkb_core::{
  heading::{HeadingId, PathEntry},
  sentence::HeadingContent,
  store::KnowledgeStore,
};
use serde::{Deserialize, Serialize};

use crate::error::ApiError;

#[derive(Debug, Serialize, Deserialize)]
pub struct HeadingCreated {
  pub heading_id: HeadingId,
}

// ─── Create ───────────────────────────────────────────────────────────────────

#[derive(Debug, Deserialize)]
pub struct CreateBody {
  pub text:      String,
  pub parent_id: Option<HeadingId>,
}

/// `POST /headings`
pub async fn create<S>(
  State(store): State<Arc<S>>,
  Json(body): Json<CreateBody>,
) -> Result<impl IntoResponse, ApiError>
where
  S: KnowledgeStore,
{
  if body.text.trim().is_empty() {
    return Err(ApiError::BadRequest("heading text must not be empty".into()));
  }
  let heading_id = store
    .insert_heading(body.text, body.parent_id)
    .await
    .map_err(ApiError::from_store)?;
  Ok((StatusCode::CREATED, Json(HeadingCreated { heading_id })))
}

#[derive(Debug, Deserialize)]
pub struct ChainBody {
  pub texts: Vec<String>,
}

/// `POST /headings/chain`
pub async fn create_chain<S>(
  State(store): State<Arc<S>>,
  Json(body): Json<ChainBody>,
) -> Result<impl IntoResponse, ApiError>
where
  S: KnowledgeStore,
{
  if body.texts.iter().any(|t| t.trim().is_empty()) {
    return Err(ApiError::BadRequest("heading text must not be empty".into()));
  }
  let heading_id = store
    .insert_heading_chain(body.texts)
    .await
    .map_err(ApiError::from_store)?;
  Ok((StatusCode::CREATED, Json(HeadingCreated { heading_id })))
}

// ─── Move ─────────────────────────────────────────────────────────────────────

#[derive(Debug, Deserialize)]
pub struct MoveBody {
  pub parent_id: HeadingId,
}

/// `POST /headings/{id}/move`
pub async fn move_one<S>(
  State(store): State<Arc<S>>,
  Path(id): Path<HeadingId>,
  Json(body): Json<MoveBody>,
) -> Result<StatusCode, ApiError>
where
  S: KnowledgeStore,
{
  store
    .move_heading(id, body.parent_id)
    .await
    .map_err(ApiError::from_store)?;
  Ok(StatusCode::NO_CONTENT)
}

// ─── Reads ────────────────────────────────────────────────────────────────────

/// `GET /headings/{id}/hierarchy`
pub async fn hierarchy<S>(
  State(store): State<Arc<S>>,
  Path(id): Path<HeadingId>,
) -> Result<Json<Vec<PathEntry>>, ApiError>
where
  S: KnowledgeStore,
{
  let path = store
    .heading_hierarchy(id)
    .await
    .map_err(ApiError::from_store)?;
  Ok(Json(path))
}

/// `GET /headings/{id}/content`
pub async fn content<S>(
  State(store): State<Arc<S>>,
  Path(id): Path<HeadingId>,
) -> Result<Json<HeadingContent>, ApiError>
where
  S: KnowledgeStore,
{
  let content = store
    .heading_content(id)
    .await
    .map_err(ApiError::from_store)?
    .ok_or_else(|| ApiError::NotFound(format!("no content under heading {id}")))?;
  Ok(Json(content))
}
