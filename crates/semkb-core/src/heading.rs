//! The document heading tree.
//!
//! Headings form a single-rooted tree under a sentinel root with the fixed id
//! [`ROOT_HEADING_ID`]. Storage backends persist the flat `(id, text,
//! parent_id)` relation; [`HeadingTree`] is the in-memory arena built from it
//! for path resolution.

use std::collections::{BTreeMap, HashSet, VecDeque};

use serde::{Deserialize, Serialize};

pub type HeadingId = i64;

/// Id of the sentinel root heading. Every heading chain terminates here.
pub const ROOT_HEADING_ID: HeadingId = 1;

/// A row of the heading relation. Only the root has no parent.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Heading {
  pub heading_id: HeadingId,
  pub text:       String,
  pub parent_id:  Option<HeadingId>,
}

/// One step of a resolved heading path.
///
/// `index` is relative to the heading the path was resolved for: `0` for the
/// heading itself, negative for ancestors (the root is the most negative) and
/// positive for descendants, growing with depth.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PathEntry {
  pub heading_id: HeadingId,
  pub text:       String,
  pub index:      i32,
}

// ─── Tree ────────────────────────────────────────────────────────────────────

/// Arena of headings indexed by id, with child lists for downward walks.
#[derive(Debug, Clone, Default)]
pub struct HeadingTree {
  nodes:    BTreeMap<HeadingId, Heading>,
  children: BTreeMap<HeadingId, Vec<HeadingId>>,
}

impl HeadingTree {
  pub fn new() -> Self { Self::default() }

  pub fn from_headings(headings: impl IntoIterator<Item = Heading>) -> Self {
    let mut tree = Self::new();
    for heading in headings {
      tree.insert(heading);
    }
    tree
  }

  /// Add or replace a node. Replacing a node re-links it under its new parent.
  pub fn insert(&mut self, heading: Heading) {
    if let Some(old) = self.nodes.get(&heading.heading_id)
      && let Some(old_parent) = old.parent_id
      && let Some(siblings) = self.children.get_mut(&old_parent)
    {
      siblings.retain(|id| *id != heading.heading_id);
    }

    if let Some(parent) = heading.parent_id {
      let siblings = self.children.entry(parent).or_default();
      if let Err(pos) = siblings.binary_search(&heading.heading_id) {
        siblings.insert(pos, heading.heading_id);
      }
    }
    self.nodes.insert(heading.heading_id, heading);
  }

  pub fn get(&self, id: HeadingId) -> Option<&Heading> { self.nodes.get(&id) }

  pub fn contains(&self, id: HeadingId) -> bool { self.nodes.contains_key(&id) }

  pub fn len(&self) -> usize { self.nodes.len() }

  pub fn is_empty(&self) -> bool { self.nodes.is_empty() }

  /// Whether `ancestor` lies on the parent chain of `id`, or is `id` itself.
  pub fn is_ancestor_or_self(&self, ancestor: HeadingId, id: HeadingId) -> bool {
    self.ancestors(id).any(|h| h.heading_id == ancestor)
  }

  /// Walk from `id` up to the root, starting with `id` itself.
  ///
  /// Stops early on a dangling parent reference or a revisited node.
  pub fn ancestors(&self, id: HeadingId) -> impl Iterator<Item = &Heading> + '_ {
    let mut seen = HashSet::new();
    let mut next = self.nodes.get(&id);
    std::iter::from_fn(move || {
      let current = next.take()?;
      if !seen.insert(current.heading_id) {
        return None;
      }
      next = current.parent_id.and_then(|p| self.nodes.get(&p));
      Some(current)
    })
  }

  /// Resolve the path around `id`.
  ///
  /// Walks breadth-first down from `id` (when `include_descendants`),
  /// assigning non-negative depths, then up the parent chain assigning
  /// negative ones. Entries are deduplicated by id, keeping the first index
  /// seen, and sorted by `(index, heading_id)`. An unknown id yields an empty
  /// path.
  pub fn resolve_path(&self, id: HeadingId, include_descendants: bool) -> Vec<PathEntry> {
    let Some(start) = self.nodes.get(&id) else {
      return Vec::new();
    };

    let mut indexed: BTreeMap<HeadingId, (i32, &str)> = BTreeMap::new();
    indexed.insert(start.heading_id, (0, &start.text));

    if include_descendants {
      let mut queue = VecDeque::from([(id, 0_i32)]);
      while let Some((current, depth)) = queue.pop_front() {
        for child in self.children.get(&current).into_iter().flatten() {
          if indexed.contains_key(child) {
            continue;
          }
          if let Some(node) = self.nodes.get(child) {
            indexed.insert(*child, (depth + 1, &node.text));
            queue.push_back((*child, depth + 1));
          }
        }
      }
    }

    for (level, ancestor) in self.ancestors(id).enumerate().skip(1) {
      indexed
        .entry(ancestor.heading_id)
        .or_insert((-(level as i32), &ancestor.text));
    }

    let mut path: Vec<PathEntry> = indexed
      .into_iter()
      .map(|(heading_id, (index, text))| PathEntry { heading_id, text: text.to_owned(), index })
      .collect();
    path.sort_by_key(|e| (e.index, e.heading_id));
    path
  }

  /// The heading and its ancestors, root first, joined by `separator`.
  pub fn display_path(&self, id: HeadingId, separator: &str) -> Option<String> {
    if !self.contains(id) {
      return None;
    }
    let path = self.resolve_path(id, false);
    Some(
      path
        .iter()
        .filter(|e| e.index <= 0)
        .map(|e| e.text.as_str())
        .collect::<Vec<_>>()
        .join(separator),
    )
  }
}
