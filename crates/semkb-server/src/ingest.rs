//! Bulk ingestion of annotated sentences from JSON Lines.
//!
//! Each non-blank line is one record produced by the annotation pipeline:
//!
//! ```json
//! {"headings":["Intro","Background"],
//!  "tagged_text":"Barack_PERSON was_VBD born_VBN in_IN Hawaii_GPE",
//!  "entities":["Barack","Hawaii"],
//!  "dependencies":["nsubjpass","prep"],
//!  "frames":["Being_born"]}
//! ```

use std::collections::BTreeSet;

use anyhow::Context as _;
use semkb_core::{
  sentence::{NewSentence, SentenceId},
  store::KnowledgeStore,
};
use serde::Deserialize;
use tokio::io::{AsyncBufRead, AsyncBufReadExt as _};
use tracing::{debug, info};

#[derive(Debug, Clone, Deserialize, PartialEq, Eq)]
pub struct IngestRecord {
  /// Heading chain below the root; empty files the sentence under the root.
  #[serde(default)]
  pub headings:     Vec<String>,
  pub tagged_text:  String,
  #[serde(default)]
  pub entities:     BTreeSet<String>,
  #[serde(default)]
  pub dependencies: BTreeSet<String>,
  #[serde(default)]
  pub frames:       BTreeSet<String>,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct IngestSummary {
  pub records:   usize,
  /// Distinct sentence ids touched; re-ingested sentences count once.
  pub sentences: usize,
}

/// Store one record: heading chain, sentence with its entities, frames.
pub async fn ingest_record<S: KnowledgeStore>(
  store: &S,
  record: IngestRecord,
) -> anyhow::Result<SentenceId> {
  let heading_id = store.insert_heading_chain(record.headings).await?;
  let sentence = NewSentence {
    tagged_text:  record.tagged_text,
    entities:     record.entities,
    dependencies: record.dependencies,
    heading_id:   Some(heading_id),
  };
  let sentence_id = store.insert_sentence(sentence).await?;
  store.tag_sentence(sentence_id, record.frames).await?;
  Ok(sentence_id)
}

/// Ingest every record read from `reader`, stopping at the first bad line.
pub async fn ingest_lines<S, R>(store: &S, reader: R) -> anyhow::Result<IngestSummary>
where
  S: KnowledgeStore,
  R: AsyncBufRead + Unpin,
{
  let mut lines = reader.lines();
  let mut sentence_ids = BTreeSet::new();
  let mut summary = IngestSummary::default();
  let mut line_no = 0_usize;

  while let Some(line) = lines.next_line().await.context("failed to read input")? {
    line_no += 1;
    if line.trim().is_empty() {
      continue;
    }
    let record: IngestRecord = serde_json::from_str(&line)
      .with_context(|| format!("line {line_no}: invalid record"))?;
    let sentence_id = ingest_record(store, record)
      .await
      .with_context(|| format!("line {line_no}: failed to store record"))?;
    debug!(line_no, sentence_id, "record ingested");

    sentence_ids.insert(sentence_id);
    summary.records += 1;
  }

  summary.sentences = sentence_ids.len();
  info!(records = summary.records, sentences = summary.sentences, "ingestion finished");
  Ok(summary)
}
