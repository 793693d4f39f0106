//! Semantic frames and frame-based sentence filtering.

use std::collections::BTreeSet;

use serde::{Deserialize, Serialize};

use crate::sentence::SentenceId;

/// A frame label with every sentence ever tagged with it.
///
/// `sentence_ids` is append-only and keeps duplicates: tagging the same
/// sentence twice records it twice.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Frame {
  pub label:        String,
  pub sentence_ids: Vec<SentenceId>,
}

impl Frame {
  /// How many times `sentence_id` has been tagged with this frame.
  pub fn occurrences(&self, sentence_id: SentenceId) -> usize {
    self.sentence_ids.iter().filter(|id| **id == sentence_id).count()
  }
}

/// The subset of `candidates` present in at least one of `frames`.
///
/// Callers pass only the frames whose label was requested.
pub fn sentences_in_frames<'a>(
  candidates: &BTreeSet<SentenceId>,
  frames: impl IntoIterator<Item = &'a Frame>,
) -> BTreeSet<SentenceId> {
  frames
    .into_iter()
    .flat_map(|f| f.sentence_ids.iter().copied())
    .filter(|id| candidates.contains(id))
    .collect()
}
