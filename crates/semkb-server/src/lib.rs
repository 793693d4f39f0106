//! Process-level wiring for the `semkb` binary: configuration, the HTTP
//! application, bulk ingestion and terminal rendering.

pub mod ingest;
pub mod render;
pub mod settings;

pub use settings::ServerConfig;

use std::sync::Arc;

use axum::Router;
use semkb_core::store::KnowledgeStore;
use tower_http::trace::TraceLayer;

/// The full HTTP application: the JSON API under `/api`, with request
/// tracing.
pub fn app<S>(store: Arc<S>) -> Router
where
  S: KnowledgeStore + 'static,
{
  Router::new()
    .nest("/api", semkb_api::api_router(store))
    .layer(TraceLayer::new_for_http())
}
