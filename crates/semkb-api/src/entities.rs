//! Handlers for `/entities` endpoints.

use std::sync::Arc;

use axum::{
  Json,
  extract::{Query, State},
};
use semkb_core::{
  entity::{Entity, EntityId},
  store::KnowledgeStore,
};
use serde::Deserialize;

use crate::error::ApiError;

/// `GET /entities`, sorted by text.
pub async fn list<S>(State(store): State<Arc<S>>) -> Result<Json<Vec<Entity>>, ApiError>
where
  S: KnowledgeStore,
{
  let entities = store.all_entities().await.map_err(ApiError::from_store)?;
  Ok(Json(entities))
}

#[derive(Debug, Deserialize)]
pub struct MatchParams {
  pub text: String,
}

/// `GET /entities/match?text=Barak`
pub async fn fuzzy_match<S>(
  State(store): State<Arc<S>>,
  Query(params): Query<MatchParams>,
) -> Result<Json<Vec<EntityId>>, ApiError>
where
  S: KnowledgeStore,
{
  let ids = store
    .fuzzy_match_entity(&params.text)
    .await
    .map_err(ApiError::from_store)?;
  Ok(Json(ids))
}
