//! Plain-text rendering of query results for the terminal.

use std::{collections::BTreeSet, fmt::Write as _};

use semkb_core::{sentence::SentenceId, store::KnowledgeStore};

/// Render `sentence_ids` grouped under their heading paths, in document
/// order. Each sentence is printed untagged and prefixed with its id.
pub async fn render_results<S: KnowledgeStore>(
  store: &S,
  sentence_ids: &BTreeSet<SentenceId>,
) -> anyhow::Result<String> {
  let mut out = String::new();
  if sentence_ids.is_empty() {
    out.push_str("no matching sentences\n");
    return Ok(out);
  }

  for group in store.group_by_heading(sentence_ids).await? {
    writeln!(out, "{}", group.display_path)?;
    for sentence in store.sentences_by_ids(group.sentence_ids).await? {
      writeln!(out, "  [{}] {}", sentence.sentence_id, sentence.plain_text())?;
    }
  }
  Ok(out)
}
