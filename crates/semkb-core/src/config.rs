//! Tunable constants for retrieval and presentation.

use serde::{Deserialize, Serialize};

/// Knobs for fuzzy entity matching and heading presentation.
///
/// Every field has a default, so a partial `[retrieval]` table in a config
/// file (or none at all) is valid.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct RetrievalConfig {
  /// Weighted edit distance must be strictly below this for a fuzzy hit.
  pub error_tolerance:   u32,
  /// Exclusive upper bound on candidate entity length, in characters.
  pub max_entity_length: usize,
  /// Number of entities kept per query string.
  pub max_matches:       usize,
  /// Text of the sentinel root heading.
  pub root_heading:      String,
  /// Separator used when joining a heading's display path.
  pub path_separator:    String,
}

impl Default for RetrievalConfig {
  fn default() -> Self {
    Self {
      error_tolerance:   5,
      max_entity_length: 50,
      max_matches:       3,
      root_heading:      "ROOT".to_owned(),
      path_separator:    " > ".to_owned(),
    }
  }
}
