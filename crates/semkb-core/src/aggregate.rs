//! Grouping of result sentences by the heading they are filed under.

use std::collections::{BTreeMap, BTreeSet};

use serde::{Deserialize, Serialize};

use crate::{
  heading::{HeadingId, HeadingTree},
  sentence::SentenceId,
};

/// Result sentences sharing a heading, with enough context to render them in
/// document order.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct HeadingGroup {
  pub heading_id:        HeadingId,
  /// Root-first path of the heading, e.g. `ROOT > Intro > Background`.
  pub display_path:      String,
  /// Result sentences under this heading, ascending and deduplicated.
  pub sentence_ids:      Vec<SentenceId>,
  /// Lowest id of any sentence filed under the heading, result or not.
  pub first_sentence_id: SentenceId,
  /// Highest id of any sentence filed under the heading, result or not.
  pub last_sentence_id:  SentenceId,
}

/// The id range of every sentence filed directly under a heading.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct HeadingSpan {
  pub first: SentenceId,
  pub last:  SentenceId,
}

/// Group `placements` (`(sentence_id, heading_id)` pairs) by heading, in
/// heading id order.
///
/// `spans` supplies each heading's full sentence range; a heading missing
/// from it falls back to the range of its members.
pub fn group_by_heading(
  placements: impl IntoIterator<Item = (SentenceId, HeadingId)>,
  spans: &BTreeMap<HeadingId, HeadingSpan>,
  tree: &HeadingTree,
  separator: &str,
) -> Vec<HeadingGroup> {
  let mut members: BTreeMap<HeadingId, BTreeSet<SentenceId>> = BTreeMap::new();
  for (sentence_id, heading_id) in placements {
    members.entry(heading_id).or_default().insert(sentence_id);
  }

  members
    .into_iter()
    .filter_map(|(heading_id, ids)| {
      let first = *ids.first()?;
      let last = *ids.last()?;
      let span = spans.get(&heading_id).copied().unwrap_or(HeadingSpan { first, last });
      Some(HeadingGroup {
        heading_id,
        display_path: tree.display_path(heading_id, separator).unwrap_or_default(),
        sentence_ids: ids.into_iter().collect(),
        first_sentence_id: span.first,
        last_sentence_id: span.last,
      })
    })
    .collect()
}
