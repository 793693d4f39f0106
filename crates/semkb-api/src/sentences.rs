//! Handlers for `/sentences` endpoints.
//!
//! `ids` is accepted as a comma-separated string; without it every sentence
//! is returned.

use std::sync::Arc;

use axum::{
  Json,
  extract::{Query, State},
  http::StatusCode,
  response::IntoResponse,
};
use semkb_core::{
  sentence::{NewSentence, SentenceId, TaggedSentence},
  store::KnowledgeStore,
};
use serde::{Deserialize, Serialize};

use crate::error::ApiError;

// ─── Create ───────────────────────────────────────────────────────────────────

#[derive(Debug, Serialize, Deserialize)]
pub struct SentenceCreated {
  pub sentence_id: SentenceId,
}

/// `POST /sentences`, body: [`NewSentence`]
pub async fn create<S>(
  State(store): State<Arc<S>>,
  Json(body): Json<NewSentence>,
) -> Result<impl IntoResponse, ApiError>
where
  S: KnowledgeStore,
{
  if body.tagged_text.trim().is_empty() {
    return Err(ApiError::BadRequest("tagged_text must not be empty".into()));
  }
  let sentence_id = store
    .insert_sentence(body)
    .await
    .map_err(ApiError::from_store)?;
  Ok((StatusCode::CREATED, Json(SentenceCreated { sentence_id })))
}

// ─── List ─────────────────────────────────────────────────────────────────────

#[derive(Debug, Deserialize, Default)]
pub struct ListParams {
  /// Comma-separated sentence ids, e.g. `3,1,7`. Order is preserved.
  pub ids: Option<String>,
}

fn parse_ids(raw: &str) -> Result<Vec<SentenceId>, ApiError> {
  raw
    .split(',')
    .map(str::trim)
    .filter(|s| !s.is_empty())
    .map(|s| {
      s.parse()
        .map_err(|_| ApiError::BadRequest(format!("invalid sentence id: {s:?}")))
    })
    .collect()
}

/// `GET /sentences[?ids=1,2,3]`
pub async fn list<S>(
  State(store): State<Arc<S>>,
  Query(params): Query<ListParams>,
) -> Result<Json<Vec<TaggedSentence>>, ApiError>
where
  S: KnowledgeStore,
{
  let sentences = match params.ids.as_deref() {
    Some(raw) => store.sentences_by_ids(parse_ids(raw)?).await,
    None => store.all_sentences().await,
  }
  .map_err(ApiError::from_store)?;
  Ok(Json(sentences))
}

// ─── Count ────────────────────────────────────────────────────────────────────

#[derive(Debug, Serialize, Deserialize)]
pub struct SentenceCount {
  pub count: u64,
}

/// `GET /sentences/count`
pub async fn count<S>(State(store): State<Arc<S>>) -> Result<Json<SentenceCount>, ApiError>
where
  S: KnowledgeStore,
{
  let count = store.sentence_count().await.map_err(ApiError::from_store)?;
  Ok(Json(SentenceCount { count }))
}
