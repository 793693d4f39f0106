//! Retrieval queries: fuzzy entity lookup, entity → sentence expansion and
//! frame filtering with fallback.
//!
//! [`QueryEngine`] holds the algorithm; the lookups it needs are behind
//! [`RetrievalIndex`] so a backend can answer them from one consistent
//! snapshot (the SQLite store runs a whole query inside a single transaction).

use std::collections::BTreeSet;

use serde::{Deserialize, Serialize};

use crate::{
  config::RetrievalConfig,
  entity::{Entity, EntityId, fuzzy_match},
  frame::{Frame, sentences_in_frames},
  sentence::SentenceId,
};

// ─── Index trait ─────────────────────────────────────────────────────────────

/// Read-only lookups a backend provides to [`QueryEngine`].
pub trait RetrievalIndex {
  type Error;

  /// Entities whose text length, in characters, lies in `[min, max)`.
  fn entities_with_length(&self, min: usize, max: usize) -> Result<Vec<Entity>, Self::Error>;

  /// Every sentence linked to any of `entity_ids`. Never called with an
  /// empty set.
  fn sentences_for_entities(
    &self,
    entity_ids: &BTreeSet<EntityId>,
  ) -> Result<BTreeSet<SentenceId>, Self::Error>;

  /// The frames whose label is in `labels`. Unknown labels are skipped. Never
  /// called with an empty set.
  fn frames(&self, labels: &BTreeSet<String>) -> Result<Vec<Frame>, Self::Error>;
}

// ─── Query types ─────────────────────────────────────────────────────────────

/// Entity strings (possibly misspelled) plus frame labels to narrow by.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct RetrievalQuery {
  #[serde(default)]
  pub entities: BTreeSet<String>,
  #[serde(default)]
  pub frames:   BTreeSet<String>,
}

impl RetrievalQuery {
  pub fn new<E, F>(entities: E, frames: F) -> Self
  where
    E: IntoIterator,
    E::Item: Into<String>,
    F: IntoIterator,
    F::Item: Into<String>,
  {
    Self {
      entities: entities.into_iter().map(Into::into).collect(),
      frames:   frames.into_iter().map(Into::into).collect(),
    }
  }
}

/// Every intermediate set of a query run.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct QueryOutcome {
  pub matched_entities: BTreeSet<EntityId>,
  pub entity_matched:   BTreeSet<SentenceId>,
  pub frame_filtered:   BTreeSet<SentenceId>,
}

impl QueryOutcome {
  /// The frame-filtered sentences if any survived, otherwise every
  /// entity-matched sentence. A frame filter that matches nothing never hides
  /// otherwise relevant results.
  pub fn sentence_ids(&self) -> &BTreeSet<SentenceId> {
    if self.frame_filtered.is_empty() {
      &self.entity_matched
    } else {
      &self.frame_filtered
    }
  }

  pub fn into_sentence_ids(self) -> BTreeSet<SentenceId> {
    if self.frame_filtered.is_empty() {
      self.entity_matched
    } else {
      self.frame_filtered
    }
  }
}

// ─── Engine ──────────────────────────────────────────────────────────────────

pub struct QueryEngine<'a, I> {
  index:  &'a I,
  config: &'a RetrievalConfig,
}

impl<'a, I: RetrievalIndex> QueryEngine<'a, I> {
  pub fn new(index: &'a I, config: &'a RetrievalConfig) -> Self { Self { index, config } }

  /// Ids of the best fuzzy matches for a single query string.
  pub fn fuzzy_match(&self, text: &str) -> Result<Vec<EntityId>, I::Error> {
    let candidates = self
      .index
      .entities_with_length(text.chars().count(), self.config.max_entity_length)?;
    Ok(
      fuzzy_match(text, &candidates, self.config)
        .into_iter()
        .map(|m| m.entity_id)
        .collect(),
    )
  }

  /// Union of [`Self::fuzzy_match`] over every query string.
  pub fn matching_entities<'t>(
    &self,
    texts: impl IntoIterator<Item = &'t String>,
  ) -> Result<BTreeSet<EntityId>, I::Error> {
    let mut ids = BTreeSet::new();
    for text in texts {
      ids.extend(self.fuzzy_match(text)?);
    }
    Ok(ids)
  }

  pub fn sentences_for_entities(
    &self,
    entity_ids: &BTreeSet<EntityId>,
  ) -> Result<BTreeSet<SentenceId>, I::Error> {
    if entity_ids.is_empty() {
      return Ok(BTreeSet::new());
    }
    self.index.sentences_for_entities(entity_ids)
  }

  pub fn sentences_matching_frames(
    &self,
    candidates: &BTreeSet<SentenceId>,
    labels: &BTreeSet<String>,
  ) -> Result<BTreeSet<SentenceId>, I::Error> {
    if candidates.is_empty() || labels.is_empty() {
      return Ok(BTreeSet::new());
    }
    let frames = self.index.frames(labels)?;
    Ok(sentences_in_frames(candidates, frames.iter().filter(|f| labels.contains(&f.label))))
  }

  pub fn run(&self, query: &RetrievalQuery) -> Result<QueryOutcome, I::Error> {
    let matched_entities = self.matching_entities(&query.entities)?;
    let entity_matched = self.sentences_for_entities(&matched_entities)?;
    let frame_filtered = self.sentences_matching_frames(&entity_matched, &query.frames)?;
    Ok(QueryOutcome { matched_entities, entity_matched, frame_filtered })
  }
}
