//! Synchronous helpers that run on the connection thread.
//!
//! Everything here takes a plain `&rusqlite::Connection` (a transaction
//! derefs to one) and returns `rusqlite` errors, so it composes inside a
//! single `tokio_rusqlite::Connection::call` closure.

use std::collections::BTreeSet;

use rusqlite::{Connection, OptionalExtension as _, params};
use semkb_core::{
  entity::{Entity, EntityId},
  frame::Frame,
  heading::{Heading, HeadingId, HeadingTree},
  query::RetrievalIndex,
  sentence::SentenceId,
};

use crate::encode::bind_json_array;

// ─── Headings ────────────────────────────────────────────────────────────────

pub fn heading_exists(conn: &Connection, heading_id: HeadingId) -> rusqlite::Result<bool> {
  Ok(
    conn
      .query_row("SELECT 1 FROM headings WHERE heading_id = ?1", params![heading_id], |_| Ok(()))
      .optional()?
      .is_some(),
  )
}

pub fn find_heading(
  conn: &Connection,
  text: &str,
  parent_id: HeadingId,
) -> rusqlite::Result<Option<HeadingId>> {
  conn
    .query_row(
      "SELECT heading_id FROM headings WHERE text = ?1 AND parent_id = ?2",
      params![text, parent_id],
      |row| row.get(0),
    )
    .optional()
}

/// Insert `(text, parent_id)` unless present; return its id either way.
/// The parent must exist.
pub fn get_or_create_heading(
  conn: &Connection,
  text: &str,
  parent_id: HeadingId,
) -> rusqlite::Result<HeadingId> {
  conn.execute(
    "INSERT INTO headings (text, parent_id) VALUES (?1, ?2)
     ON CONFLICT (text, parent_id) DO NOTHING",
    params![text, parent_id],
  )?;
  conn.query_row(
    "SELECT heading_id FROM headings WHERE text = ?1 AND parent_id = ?2",
    params![text, parent_id],
    |row| row.get(0),
  )
}

pub fn load_tree(conn: &Connection) -> rusqlite::Result<HeadingTree> {
  let mut stmt = conn.prepare_cached("SELECT heading_id, text, parent_id FROM headings")?;
  let headings = stmt
    .query_map([], |row| {
      Ok(Heading {
        heading_id: row.get(0)?,
        text:       row.get(1)?,
        parent_id:  row.get(2)?,
      })
    })?
    .collect::<rusqlite::Result<Vec<_>>>()?;
  Ok(HeadingTree::from_headings(headings))
}

// ─── Sentences and entities ──────────────────────────────────────────────────

pub fn sentence_exists(conn: &Connection, sentence_id: SentenceId) -> rusqlite::Result<bool> {
  Ok(
    conn
      .query_row("SELECT 1 FROM sentences WHERE sentence_id = ?1", params![sentence_id], |_| Ok(()))
      .optional()?
      .is_some(),
  )
}

pub fn get_or_create_entity(conn: &Connection, text: &str) -> rusqlite::Result<EntityId> {
  conn.execute(
    "INSERT INTO entities (text) VALUES (?1) ON CONFLICT (text) DO NOTHING",
    params![text],
  )?;
  conn.query_row("SELECT entity_id FROM entities WHERE text = ?1", params![text], |row| row.get(0))
}

// ─── Retrieval lookups ───────────────────────────────────────────────────────

/// [`RetrievalIndex`] over one connection.
pub struct SqlIndex<'c> {
  pub conn: &'c Connection,
}

impl RetrievalIndex for SqlIndex<'_> {
  type Error = rusqlite::Error;

  fn entities_with_length(&self, min: usize, max: usize) -> rusqlite::Result<Vec<Entity>> {
    let mut stmt = self.conn.prepare_cached(
      "SELECT entity_id, text FROM entities
       WHERE length(text) >= ?1 AND length(text) < ?2",
    )?;
    let rows = stmt
      .query_map(params![min as i64, max as i64], |row| {
        Ok(Entity { entity_id: row.get(0)?, text: row.get(1)? })
      })?
      .collect::<rusqlite::Result<Vec<_>>>()?;
    Ok(rows)
  }

  fn sentences_for_entities(
    &self,
    entity_ids: &BTreeSet<EntityId>,
  ) -> rusqlite::Result<BTreeSet<SentenceId>> {
    let ids = bind_json_array(entity_ids)?;
    let mut stmt = self.conn.prepare_cached(
      "SELECT DISTINCT sentence_id FROM normalizations
       WHERE entity_id IN (SELECT value FROM json_each(?1))",
    )?;
    let rows = stmt
      .query_map(params![ids], |row| row.get(0))?
      .collect::<rusqlite::Result<BTreeSet<_>>>()?;
    Ok(rows)
  }

  fn frames(&self, labels: &BTreeSet<String>) -> rusqlite::Result<Vec<Frame>> {
    let labels = bind_json_array(labels)?;
    let mut stmt = self.conn.prepare_cached(
      "SELECT f.label, j.value
       FROM frames f, json_each(f.sentence_ids) j
       WHERE f.label IN (SELECT value FROM json_each(?1))
       ORDER BY f.label, j.key",
    )?;
    let rows = stmt
      .query_map(params![labels], |row| Ok((row.get::<_, String>(0)?, row.get::<_, SentenceId>(1)?)))?
      .collect::<rusqlite::Result<Vec<_>>>()?;

    let mut frames: Vec<Frame> = Vec::new();
    for (label, sentence_id) in rows {
      match frames.last_mut() {
        Some(frame) if frame.label == label => frame.sentence_ids.push(sentence_id),
        _ => frames.push(Frame { label, sentence_ids: vec![sentence_id] }),
      }
    }
    Ok(frames)
  }
}
