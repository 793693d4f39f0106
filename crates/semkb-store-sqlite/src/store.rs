//! [`SqliteStore`]: the SQLite implementation of [`KnowledgeStore`].

use std::{
  collections::{BTreeMap, BTreeSet},
  path::Path,
  sync::Arc,
};

use rusqlite::{OptionalExtension as _, params};
use semkb_core::{
  Error as CoreError,
  aggregate::{HeadingGroup, HeadingSpan, group_by_heading},
  config::RetrievalConfig,
  entity::{Entity, EntityId},
  frame::Frame,
  heading::{HeadingId, PathEntry, ROOT_HEADING_ID},
  query::{QueryEngine, RetrievalQuery},
  sentence::{HeadingContent, NewSentence, SentenceId, TaggedSentence},
  store::KnowledgeStore,
};
use tracing::debug;

use crate::{
  Result,
  encode::{RawFrame, RawHeadingContent, encode_json_array},
  index::{
    SqlIndex, find_heading, get_or_create_entity, get_or_create_heading, heading_exists,
    load_tree, sentence_exists,
  },
  schema::{SCHEMA, SEED_ROOT, TRUNCATE},
};

/// What a connection closure hands back when the operation can be refused
/// for integrity reasons. The outer `Result` carries database failures.
type Checked<T> = std::result::Result<T, CoreError>;

// ─── Store ───────────────────────────────────────────────────────────────────

/// A knowledge base backed by a single SQLite file.
///
/// Cloning is cheap; the inner connection is reference-counted.
#[derive(Clone)]
pub struct SqliteStore {
  conn:   tokio_rusqlite::Connection,
  config: Arc<RetrievalConfig>,
}

impl SqliteStore {
  /// Open (or create) a store at `path` with default retrieval settings.
  pub async fn open(path: impl AsRef<Path>) -> Result<Self> {
    Self::open_with_config(path, RetrievalConfig::default()).await
  }

  pub async fn open_with_config(path: impl AsRef<Path>, config: RetrievalConfig) -> Result<Self> {
    let conn = tokio_rusqlite::Connection::open(path).await?;
    Self::init(conn, config).await
  }

  /// Open an in-memory store, for tests.
  pub async fn open_in_memory() -> Result<Self> {
    Self::open_in_memory_with_config(RetrievalConfig::default()).await
  }

  pub async fn open_in_memory_with_config(config: RetrievalConfig) -> Result<Self> {
    let conn = tokio_rusqlite::Connection::open_in_memory().await?;
    Self::init(conn, config).await
  }

  pub fn config(&self) -> &RetrievalConfig { &self.config }

  async fn init(conn: tokio_rusqlite::Connection, config: RetrievalConfig) -> Result<Self> {
    let root = config.root_heading.clone();
    conn
      .call(move |conn| {
        conn.execute_batch(SCHEMA)?;
        conn.execute(SEED_ROOT, params![root])?;
        Ok(())
      })
      .await?;
    Ok(Self { conn, config: Arc::new(config) })
  }
}

// ─── KnowledgeStore impl ─────────────────────────────────────────────────────

impl KnowledgeStore for SqliteStore {
  type Error = crate::Error;

  // ── Ingestion ─────────────────────────────────────────────────────────────

  async fn insert_heading(&self, text: String, parent_id: Option<HeadingId>) -> Result<HeadingId> {
    let parent_id = parent_id.unwrap_or(ROOT_HEADING_ID);

    let heading_id = self
      .conn
      .call(move |conn| {
        let tx = conn.transaction()?;
        if !heading_exists(&tx, parent_id)? {
          return Ok(Checked::Err(CoreError::HeadingNotFound(parent_id)));
        }
        let id = get_or_create_heading(&tx, &text, parent_id)?;
        tx.commit()?;
        Ok(Ok(id))
      })
      .await??;

    debug!(heading_id, parent_id, "heading stored");
    Ok(heading_id)
  }

  async fn insert_heading_chain(&self, texts: Vec<String>) -> Result<HeadingId> {
    let heading_id = self
      .conn
      .call(move |conn| {
        let tx = conn.transaction()?;
        let mut parent_id = ROOT_HEADING_ID;
        for text in &texts {
          parent_id = get_or_create_heading(&tx, text, parent_id)?;
        }
        tx.commit()?;
        Ok(parent_id)
      })
      .await?;

    debug!(heading_id, "heading chain stored");
    Ok(heading_id)
  }

  async fn move_heading(&self, heading_id: HeadingId, new_parent_id: HeadingId) -> Result<()> {
    if heading_id == ROOT_HEADING_ID {
      return Err(CoreError::RootImmovable.into());
    }

    self
      .conn
      .call(move |conn| {
        let tx = conn.transaction()?;
        let tree = load_tree(&tx)?;

        let Some(heading) = tree.get(heading_id) else {
          return Ok(Checked::Err(CoreError::HeadingNotFound(heading_id)));
        };
        if !tree.contains(new_parent_id) {
          return Ok(Err(CoreError::HeadingNotFound(new_parent_id)));
        }
        if tree.is_ancestor_or_self(heading_id, new_parent_id) {
          return Ok(Err(CoreError::HeadingCycle { heading: heading_id, parent: new_parent_id }));
        }
        if heading.parent_id == Some(new_parent_id) {
          return Ok(Ok(()));
        }
        if find_heading(&tx, &heading.text, new_parent_id)?.is_some() {
          return Ok(Err(CoreError::HeadingExists {
            text:   heading.text.clone(),
            parent: new_parent_id,
          }));
        }

        tx.execute(
          "UPDATE headings SET parent_id = ?1 WHERE heading_id = ?2",
          params![new_parent_id, heading_id],
        )?;
        tx.commit()?;
        Ok(Ok(()))
      })
      .await??;

    debug!(heading_id, new_parent_id, "heading moved");
    Ok(())
  }

  async fn insert_sentence(&self, input: NewSentence) -> Result<SentenceId> {
    let heading_id = input.heading_id.unwrap_or(ROOT_HEADING_ID);
    let dependencies = encode_json_array(&input.dependencies)?;
    let tagged_text = input.tagged_text;
    let entities = input.entities;

    let sentence_id = self
      .conn
      .call(move |conn| {
        let tx = conn.transaction()?;
        if !heading_exists(&tx, heading_id)? {
          return Ok(Checked::Err(CoreError::HeadingNotFound(heading_id)));
        }

        tx.execute(
          "INSERT INTO sentences (tagged_text, dependencies, heading_id) VALUES (?1, ?2, ?3)
           ON CONFLICT (tagged_text, heading_id) DO NOTHING",
          params![tagged_text, dependencies, heading_id],
        )?;
        let sentence_id: SentenceId = tx.query_row(
          "SELECT sentence_id FROM sentences WHERE tagged_text = ?1 AND heading_id = ?2",
          params![tagged_text, heading_id],
          |row| row.get(0),
        )?;

        for text in &entities {
          let entity_id = get_or_create_entity(&tx, text)?;
          tx.execute(
            "INSERT INTO normalizations (sentence_id, entity_id) VALUES (?1, ?2)",
            params![sentence_id, entity_id],
          )?;
        }

        tx.commit()?;
        Ok(Ok(sentence_id))
      })
      .await??;

    debug!(sentence_id, heading_id, "sentence stored");
    Ok(sentence_id)
  }

  async fn tag_sentence(&self, sentence_id: SentenceId, frames: BTreeSet<String>) -> Result<()> {
    if frames.is_empty() {
      return Ok(());
    }

    self
      .conn
      .call(move |conn| {
        let tx = conn.transaction()?;
        if !sentence_exists(&tx, sentence_id)? {
          return Ok(Checked::Err(CoreError::SentenceNotFound(sentence_id)));
        }
        for label in &frames {
          tx.execute(
            "INSERT INTO frames (label, sentence_ids) VALUES (?1, json_array(?2))
             ON CONFLICT (label) DO UPDATE
             SET sentence_ids = json_insert(frames.sentence_ids, '$[#]', ?2)",
            params![label, sentence_id],
          )?;
        }
        tx.commit()?;
        Ok(Ok(()))
      })
      .await??;

    debug!(sentence_id, "sentence tagged with frames");
    Ok(())
  }

  // ── Retrieval ─────────────────────────────────────────────────────────────

  async fn query(&self, query: &RetrievalQuery) -> Result<BTreeSet<SentenceId>> {
    if query.entities.is_empty() {
      return Ok(BTreeSet::new());
    }

    let query = query.clone();
    let config = Arc::clone(&self.config);

    let outcome = self
      .conn
      .call(move |conn| {
        let tx = conn.transaction()?;
        let outcome = QueryEngine::new(&SqlIndex { conn: &tx }, &config).run(&query)?;
        tx.commit()?;
        Ok(outcome)
      })
      .await?;

    debug!(
      matched_entities = outcome.matched_entities.len(),
      entity_matched = outcome.entity_matched.len(),
      frame_filtered = outcome.frame_filtered.len(),
      "query evaluated"
    );
    Ok(outcome.into_sentence_ids())
  }

  async fn fuzzy_match_entity(&self, text: &str) -> Result<Vec<EntityId>> {
    let text = text.to_owned();
    let config = Arc::clone(&self.config);

    let ids = self
      .conn
      .call(move |conn| {
        let tx = conn.transaction()?;
        let ids = QueryEngine::new(&SqlIndex { conn: &tx }, &config).fuzzy_match(&text)?;
        tx.commit()?;
        Ok(ids)
      })
      .await?;
    Ok(ids)
  }

  async fn group_by_heading(&self, sentence_ids: &BTreeSet<SentenceId>) -> Result<Vec<HeadingGroup>> {
    if sentence_ids.is_empty() {
      return Ok(Vec::new());
    }

    let ids = encode_json_array(sentence_ids)?;

    let (placements, spans, tree) = self
      .conn
      .call(move |conn| {
        let placements = conn
          .prepare(
            "SELECT sentence_id, heading_id FROM sentences
             WHERE sentence_id IN (SELECT value FROM json_each(?1))",
          )?
          .query_map(params![ids], |row| Ok((row.get(0)?, row.get(1)?)))?
          .collect::<rusqlite::Result<Vec<(SentenceId, HeadingId)>>>()?;

        let spans = conn
          .prepare(
            "SELECT heading_id, MIN(sentence_id), MAX(sentence_id) FROM sentences
             WHERE heading_id IN (
               SELECT heading_id FROM sentences
               WHERE sentence_id IN (SELECT value FROM json_each(?1))
             )
             GROUP BY heading_id",
          )?
          .query_map(params![ids], |row| {
            Ok((row.get(0)?, HeadingSpan { first: row.get(1)?, last: row.get(2)? }))
          })?
          .collect::<rusqlite::Result<BTreeMap<HeadingId, HeadingSpan>>>()?;

        Ok((placements, spans, load_tree(conn)?))
      })
      .await?;

    Ok(group_by_heading(placements, &spans, &tree, &self.config.path_separator))
  }

  // ── Reads ─────────────────────────────────────────────────────────────────

  async fn sentences_by_ids(&self, ids: Vec<SentenceId>) -> Result<Vec<TaggedSentence>> {
    if ids.is_empty() {
      return Ok(Vec::new());
    }

    let rows: Vec<(SentenceId, String)> = self
      .conn
      .call(move |conn| {
        let mut stmt =
          conn.prepare("SELECT sentence_id, tagged_text FROM sentences WHERE sentence_id = ?1")?;
        let mut rows = Vec::with_capacity(ids.len());
        for id in ids {
          if let Some(row) =
            stmt.query_row(params![id], |row| Ok((row.get(0)?, row.get(1)?))).optional()?
          {
            rows.push(row);
          }
        }
        Ok(rows)
      })
      .await?;

    Ok(rows.iter().map(|(id, text)| TaggedSentence::from_text(*id, text)).collect())
  }

  async fn all_sentences(&self) -> Result<Vec<TaggedSentence>> {
    let rows: Vec<(SentenceId, String)> = self
      .conn
      .call(|conn| {
        let mut stmt =
          conn.prepare("SELECT sentence_id, tagged_text FROM sentences ORDER BY sentence_id")?;
        let rows = stmt
          .query_map([], |row| Ok((row.get(0)?, row.get(1)?)))?
          .collect::<rusqlite::Result<Vec<_>>>()?;
        Ok(rows)
      })
      .await?;

    Ok(rows.iter().map(|(id, text)| TaggedSentence::from_text(*id, text)).collect())
  }

  async fn sentence_count(&self) -> Result<u64> {
    let count: i64 = self
      .conn
      .call(|conn| Ok(conn.query_row("SELECT count(*) FROM sentences", [], |row| row.get(0))?))
      .await?;
    Ok(count as u64)
  }

  async fn all_entities(&self) -> Result<Vec<Entity>> {
    let entities = self
      .conn
      .call(|conn| {
        let mut stmt =
          conn.prepare("SELECT entity_id, text FROM entities ORDER BY text, entity_id")?;
        let rows = stmt
          .query_map([], |row| Ok(Entity { entity_id: row.get(0)?, text: row.get(1)? }))?
          .collect::<rusqlite::Result<Vec<_>>>()?;
        Ok(rows)
      })
      .await?;
    Ok(entities)
  }

  async fn heading_hierarchy(&self, heading_id: HeadingId) -> Result<Vec<PathEntry>> {
    let tree = self.conn.call(|conn| Ok(load_tree(conn)?)).await?;
    Ok(tree.resolve_path(heading_id, true))
  }

  async fn heading_content(&self, heading_id: HeadingId) -> Result<Option<HeadingContent>> {
    let raw: Option<RawHeadingContent> = self
      .conn
      .call(move |conn| {
        Ok(
          conn
            .query_row(
              "SELECT heading_id, heading, content FROM heading_content WHERE heading_id = ?1",
              params![heading_id],
              |row| {
                Ok(RawHeadingContent {
                  heading_id: row.get(0)?,
                  heading:    row.get(1)?,
                  content:    row.get(2)?,
                })
              },
            )
            .optional()?,
        )
      })
      .await?;

    raw.map(RawHeadingContent::into_content).transpose()
  }

  async fn frame(&self, label: &str) -> Result<Option<Frame>> {
    let label = label.to_owned();

    let raw: Option<RawFrame> = self
      .conn
      .call(move |conn| {
        Ok(
          conn
            .query_row(
              "SELECT label, sentence_ids FROM frames WHERE label = ?1",
              params![label],
              |row| Ok(RawFrame { label: row.get(0)?, sentence_ids: row.get(1)? }),
            )
            .optional()?,
        )
      })
      .await?;

    raw.map(RawFrame::into_frame).transpose()
  }

  // ── Maintenance ───────────────────────────────────────────────────────────

  async fn truncate(&self) -> Result<()> {
    let root = self.config.root_heading.clone();

    self
      .conn
      .call(move |conn| {
        let tx = conn.transaction()?;
        tx.execute_batch(TRUNCATE)?;
        tx.execute(SEED_ROOT, params![root])?;
        tx.commit()?;
        Ok(())
      })
      .await?;

    debug!("store truncated");
    Ok(())
  }
}
