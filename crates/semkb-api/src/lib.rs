//! JSON REST API for semkb.
//!
//! Exposes an axum [`Router`] backed by any [`semkb_core::store::KnowledgeStore`].
//! Auth, TLS, and transport concerns are the caller's responsibility.
//!
//! # Mounting
//!
//! ```rust,ignore
//! .nest("/api", semkb_api::api_router(store.clone()))
//! ```

pub mod entities;
pub mod error;
pub mod frames;
pub mod headings;
pub mod retrieval;
pub mod sentences;

use std::sync::Arc;

use axum::{
  Router,
  routing::{get, post},
};
use semkb_core::store::KnowledgeStore;

pub use error::ApiError;

/// Build a fully-materialised API router for `store`.
///
/// The returned `Router<()>` can be nested into any parent router regardless
/// of its own state type.
pub fn api_router<S>(store: Arc<S>) -> Router<()>
where
  S: KnowledgeStore + 'static,
{
  Router::new()
    // Headings
    .route("/headings", post(headings::create::<S>))
    .route("/headings/chain", post(headings::create_chain::<S>))
    .route("/headings/{id}/move", post(headings::move_one::<S>))
    .route("/headings/{id}/hierarchy", get(headings::hierarchy::<S>))
    .route("/headings/{id}/content", get(headings::content::<S>))
    // Sentences
    .route("/sentences", get(sentences::list::<S>).post(sentences::create::<S>))
    .route("/sentences/count", get(sentences::count::<S>))
    .route("/sentences/{id}/frames", post(frames::tag::<S>))
    // Entities and frames
    .route("/entities", get(entities::list::<S>))
    .route("/entities/match", get(entities::fuzzy_match::<S>))
    .route("/frames/{label}", get(frames::get_one::<S>))
    // Retrieval
    .route("/query", post(retrieval::query::<S>))
    .route("/groups", post(retrieval::groups::<S>))
    .with_state(store)
}
