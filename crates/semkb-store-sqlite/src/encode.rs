//! Encoding and decoding helpers between domain types and the plain-text
//! representations stored in SQLite columns.
//!
//! Sets of ids and labels are stored, and bound as query parameters, as
//! compact JSON arrays; SQL expands them with `json_each`.

use std::collections::BTreeSet;

use semkb_core::{
  frame::Frame,
  heading::HeadingId,
  sentence::{HeadingContent, SentenceId, parse_tagged_text},
};
use serde::Serialize;

use crate::Result;

// ─── JSON arrays ─────────────────────────────────────────────────────────────

pub fn encode_json_array<T: Serialize>(items: &BTreeSet<T>) -> Result<String> {
  Ok(serde_json::to_string(items)?)
}

/// Variant of [`encode_json_array`] for use inside a connection closure,
/// where errors must be `rusqlite` errors.
pub fn bind_json_array<T: Serialize>(items: &BTreeSet<T>) -> rusqlite::Result<String> {
  serde_json::to_string(items).map_err(|e| rusqlite::Error::ToSqlConversionFailure(Box::new(e)))
}

pub fn decode_sentence_ids(s: &str) -> Result<Vec<SentenceId>> { Ok(serde_json::from_str(s)?) }

// ─── Row types ───────────────────────────────────────────────────────────────

/// Raw columns of a `frames` row.
pub struct RawFrame {
  pub label:        String,
  pub sentence_ids: String,
}

impl RawFrame {
  pub fn into_frame(self) -> Result<Frame> {
    Ok(Frame {
      sentence_ids: decode_sentence_ids(&self.sentence_ids)?,
      label:        self.label,
    })
  }
}

/// Raw columns of a `heading_content` view row.
pub struct RawHeadingContent {
  pub heading_id: HeadingId,
  pub heading:    String,
  pub content:    String,
}

impl RawHeadingContent {
  pub fn into_content(self) -> Result<HeadingContent> {
    let texts: Vec<String> = serde_json::from_str(&self.content)?;
    Ok(HeadingContent {
      heading_id: self.heading_id,
      heading:    self.heading,
      content:    texts.iter().map(|t| parse_tagged_text(t)).collect(),
    })
  }
}
