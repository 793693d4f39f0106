//! The `KnowledgeStore` trait: the ingestion and query surfaces.
//!
//! Implemented by storage backends (e.g. `semkb-store-sqlite`). Higher layers
//! (`semkb-api`, the `semkb` binary) depend on this abstraction, not on any
//! concrete backend.

use std::{collections::BTreeSet, future::Future};

use crate::{
  aggregate::HeadingGroup,
  entity::{Entity, EntityId},
  frame::Frame,
  heading::{HeadingId, PathEntry},
  query::RetrievalQuery,
  sentence::{HeadingContent, NewSentence, SentenceId, TaggedSentence},
};

/// Abstraction over a knowledge base backend.
///
/// Ingestion is get-or-create: re-inserting an existing heading, sentence or
/// entity returns the existing id. Each method is applied atomically.
///
/// All methods return `Send` futures so the trait can be used in
/// multi-threaded async runtimes (e.g. tokio with `axum`).
pub trait KnowledgeStore: Send + Sync {
  type Error: std::error::Error + Send + Sync + 'static;

  // ── Ingestion ─────────────────────────────────────────────────────────

  /// Get or create the heading `text` under `parent_id` (the root when
  /// `None`). Errors if the parent does not exist.
  fn insert_heading(
    &self,
    text: String,
    parent_id: Option<HeadingId>,
  ) -> impl Future<Output = Result<HeadingId, Self::Error>> + Send + '_;

  /// Insert a chain of nested headings below the root, each the parent of
  /// the next. Returns the deepest id, or the root id for an empty chain.
  fn insert_heading_chain(
    &self,
    texts: Vec<String>,
  ) -> impl Future<Output = Result<HeadingId, Self::Error>> + Send + '_;

  /// Re-file a heading (and its subtree) under a different parent.
  fn move_heading(
    &self,
    heading_id: HeadingId,
    new_parent_id: HeadingId,
  ) -> impl Future<Output = Result<(), Self::Error>> + Send + '_;

  /// Get or create a sentence, then get or create each of its entities and
  /// link them. Links are appended even when the sentence already existed.
  fn insert_sentence(
    &self,
    input: NewSentence,
  ) -> impl Future<Output = Result<SentenceId, Self::Error>> + Send + '_;

  /// Append `sentence_id` to each frame in `frames`, creating frames as
  /// needed. Duplicates are kept.
  fn tag_sentence(
    &self,
    sentence_id: SentenceId,
    frames: BTreeSet<String>,
  ) -> impl Future<Output = Result<(), Self::Error>> + Send + '_;

  // ── Retrieval ─────────────────────────────────────────────────────────

  /// Fuzzy-match entities, expand to sentences, narrow by frame with
  /// fallback. See [`QueryEngine`](crate::query::QueryEngine).
  fn query<'a>(
    &'a self,
    query: &'a RetrievalQuery,
  ) -> impl Future<Output = Result<BTreeSet<SentenceId>, Self::Error>> + Send + 'a;

  /// The best fuzzy matches for a single entity string.
  fn fuzzy_match_entity<'a>(
    &'a self,
    text: &'a str,
  ) -> impl Future<Output = Result<Vec<EntityId>, Self::Error>> + Send + 'a;

  /// Group sentences by heading for presentation.
  fn group_by_heading<'a>(
    &'a self,
    sentence_ids: &'a BTreeSet<SentenceId>,
  ) -> impl Future<Output = Result<Vec<HeadingGroup>, Self::Error>> + Send + 'a;

  // ── Reads ─────────────────────────────────────────────────────────────

  /// Sentences in the order requested; unknown ids are skipped.
  fn sentences_by_ids(
    &self,
    ids: Vec<SentenceId>,
  ) -> impl Future<Output = Result<Vec<TaggedSentence>, Self::Error>> + Send + '_;

  /// Every sentence, in id order.
  fn all_sentences(
    &self,
  ) -> impl Future<Output = Result<Vec<TaggedSentence>, Self::Error>> + Send + '_;

  fn sentence_count(&self) -> impl Future<Output = Result<u64, Self::Error>> + Send + '_;

  /// Every entity, sorted by text.
  fn all_entities(&self) -> impl Future<Output = Result<Vec<Entity>, Self::Error>> + Send + '_;

  /// The heading's ancestors and descendants with relative indices.
  fn heading_hierarchy(
    &self,
    heading_id: HeadingId,
  ) -> impl Future<Output = Result<Vec<PathEntry>, Self::Error>> + Send + '_;

  /// Sentences filed directly under a heading. `None` when it has none.
  fn heading_content(
    &self,
    heading_id: HeadingId,
  ) -> impl Future<Output = Result<Option<HeadingContent>, Self::Error>> + Send + '_;

  fn frame<'a>(
    &'a self,
    label: &'a str,
  ) -> impl Future<Output = Result<Option<Frame>, Self::Error>> + Send + 'a;

  // ── Maintenance ───────────────────────────────────────────────────────

  /// Delete everything and restart id counters. Only the root heading
  /// survives.
  fn truncate(&self) -> impl Future<Output = Result<(), Self::Error>> + Send + '_;
}
