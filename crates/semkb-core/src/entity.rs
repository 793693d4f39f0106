//! Entities and fuzzy entity lookup.
//!
//! Query strings arrive from a front end that may truncate or misspell
//! names. Candidates are kept when they are at least as long as the query and
//! either extend it (prefix/suffix) or sit within a small weighted edit
//! distance of it. Edits are costed from the entity towards the query, with
//! deletions cheaper than insertions, so entities that contain the query are
//! preferred over entities that are missing parts of it.

use serde::{Deserialize, Serialize};

use crate::config::RetrievalConfig;

pub type EntityId = i64;

/// A named entity mentioned by one or more sentences. `text` is unique.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Entity {
  pub entity_id: EntityId,
  pub text:      String,
}

// ─── Edit distance ───────────────────────────────────────────────────────────

/// Per-operation costs for [`edit_distance`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct EditCosts {
  pub insertion:    u32,
  pub deletion:     u32,
  pub substitution: u32,
}

impl EditCosts {
  /// Insert 2, delete 1, substitute 2.
  pub const ENTITY_MATCH: Self = Self { insertion: 2, deletion: 1, substitution: 2 };
}

impl Default for EditCosts {
  fn default() -> Self { Self::ENTITY_MATCH }
}

/// Weighted Levenshtein distance for turning `source` into `target`.
///
/// Operates on `char`s, not bytes. Uses two rolling rows.
pub fn edit_distance(source: &str, target: &str, costs: EditCosts) -> u32 {
  let target: Vec<char> = target.chars().collect();

  let mut prev: Vec<u32> = (0..=target.len() as u32).map(|j| j * costs.insertion).collect();
  let mut curr: Vec<u32> = vec![0; target.len() + 1];

  for (i, s) in source.chars().enumerate() {
    curr[0] = (i as u32 + 1) * costs.deletion;
    for (j, t) in target.iter().enumerate() {
      let replace = if s == *t { 0 } else { costs.substitution };
      curr[j + 1] = (prev[j + 1] + costs.deletion)
        .min(curr[j] + costs.insertion)
        .min(prev[j] + replace);
    }
    std::mem::swap(&mut prev, &mut curr);
  }

  prev[target.len()]
}

// ─── Fuzzy matching ──────────────────────────────────────────────────────────

/// A candidate that survived [`fuzzy_match`], with the keys it was ranked by.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct EntityMatch {
  pub entity_id: EntityId,
  pub length:    usize,
  pub distance:  u32,
}

/// Rank `candidates` against `query` and keep the best
/// [`RetrievalConfig::max_matches`].
///
/// A candidate qualifies when its length lies in
/// `[len(query), max_entity_length)` and it starts with the query, ends with
/// it, or is within `error_tolerance` (exclusive) weighted edits of it.
/// Survivors are ordered by length, then distance, then id.
///
/// Every text starts with the empty string, so an empty query returns the
/// shortest entities.
pub fn fuzzy_match<'a>(
  query: &str,
  candidates: impl IntoIterator<Item = &'a Entity>,
  config: &RetrievalConfig,
) -> Vec<EntityMatch> {
  let query_len = query.chars().count();

  let mut matches: Vec<EntityMatch> = candidates
    .into_iter()
    .filter_map(|entity| {
      let length = entity.text.chars().count();
      if length < query_len || length >= config.max_entity_length {
        return None;
      }

      let distance = edit_distance(&entity.text, query, EditCosts::ENTITY_MATCH);
      let extends = entity.text.starts_with(query) || entity.text.ends_with(query);
      (extends || distance < config.error_tolerance).then_some(EntityMatch {
        entity_id: entity.entity_id,
        length,
        distance,
      })
    })
    .collect();

  matches.sort_by_key(|m| (m.length, m.distance, m.entity_id));
  matches.truncate(config.max_matches);
  matches
}
