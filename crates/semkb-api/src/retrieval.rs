//! Handlers for `POST /query` and `POST /groups`.
//!
//! A client typically posts a query, then posts the returned ids to
//! `/groups` to render them under their headings.

use std::{collections::BTreeSet, sync::Arc};

use axum::{Json, extract::State};
use semkb_core::{
  aggregate::HeadingGroup,
  query::RetrievalQuery,
  sentence::SentenceId,
  store::KnowledgeStore,
};
use serde::{Deserialize, Serialize};

use crate::error::ApiError;

#[derive(Debug, Serialize, Deserialize)]
pub struct QueryResponse {
  pub sentence_ids: BTreeSet<SentenceId>,
}

/// `POST /query`, body: `{"entities":["Barak"],"frames":["Being_born"]}`
pub async fn query<S>(
  State(store): State<Arc<S>>,
  Json(query): Json<RetrievalQuery>,
) -> Result<Json<QueryResponse>, ApiError>
where
  S: KnowledgeStore,
{
  let sentence_ids = store.query(&query).await.map_err(ApiError::from_store)?;
  Ok(Json(QueryResponse { sentence_ids }))
}

#[derive(Debug, Deserialize)]
pub struct GroupBody {
  pub sentence_ids: BTreeSet<SentenceId>,
}

/// `POST /groups`, body: `{"sentence_ids":[1,2]}`
pub async fn groups<S>(
  State(store): State<Arc<S>>,
  Json(body): Json<GroupBody>,
) -> Result<Json<Vec<HeadingGroup>>, ApiError>
where
  S: KnowledgeStore,
{
  let groups = store
    .group_by_heading(&body.sentence_ids)
    .await
    .map_err(ApiError::from_store)?;
  Ok(Json(groups))
}
