//! Sentences and their tagged-token text.

use std::collections::BTreeSet;

use serde::{Deserialize, Serialize};

use crate::heading::HeadingId;

pub type SentenceId = i64;

/// A `word_TAG` pair. Tags may contain underscores; the word never does
/// after the split, because the split happens at the last underscore.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TaggedToken {
  pub word: String,
  pub tag:  String,
}

impl TaggedToken {
  /// Split a single token at its last underscore. A token without one keeps
  /// the whole text as the word and gets an empty tag.
  pub fn parse(token: &str) -> Self {
    match token.rsplit_once('_') {
      Some((word, tag)) => Self { word: word.to_owned(), tag: tag.to_owned() },
      None => Self { word: token.to_owned(), tag: String::new() },
    }
  }
}

/// Split tagged text on whitespace into [`TaggedToken`]s.
pub fn parse_tagged_text(tagged_text: &str) -> Vec<TaggedToken> {
  tagged_text.split_whitespace().map(TaggedToken::parse).collect()
}

/// A stored sentence as returned by fetch operations.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TaggedSentence {
  pub sentence_id: SentenceId,
  pub tokens:      Vec<TaggedToken>,
}

impl TaggedSentence {
  pub fn from_text(sentence_id: SentenceId, tagged_text: &str) -> Self {
    Self { sentence_id, tokens: parse_tagged_text(tagged_text) }
  }

  /// The untagged words joined by single spaces.
  pub fn plain_text(&self) -> String {
    self.tokens.iter().map(|t| t.word.as_str()).collect::<Vec<_>>().join(" ")
  }
}

/// Input to [`KnowledgeStore::insert_sentence`](crate::store::KnowledgeStore::insert_sentence).
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct NewSentence {
  pub tagged_text:  String,
  /// Entity strings mentioned by the sentence; each is get-or-created and
  /// linked.
  #[serde(default)]
  pub entities:     BTreeSet<String>,
  #[serde(default)]
  pub dependencies: BTreeSet<String>,
  /// Defaults to the root heading.
  #[serde(default)]
  pub heading_id:   Option<HeadingId>,
}

impl NewSentence {
  pub fn new(tagged_text: impl Into<String>) -> Self {
    Self { tagged_text: tagged_text.into(), ..Default::default() }
  }

  pub fn with_entities<I, S>(mut self, entities: I) -> Self
  where
    I: IntoIterator<Item = S>,
    S: Into<String>,
  {
    self.entities.extend(entities.into_iter().map(Into::into));
    self
  }

  pub fn with_dependencies<I, S>(mut self, dependencies: I) -> Self
  where
    I: IntoIterator<Item = S>,
    S: Into<String>,
  {
    self.dependencies.extend(dependencies.into_iter().map(Into::into));
    self
  }

  pub fn under(mut self, heading_id: HeadingId) -> Self {
    self.heading_id = Some(heading_id);
    self
  }
}

/// The sentences filed directly under one heading, in id order.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct HeadingContent {
  pub heading_id: HeadingId,
  pub heading:    String,
  pub content:    Vec<Vec<TaggedToken>>,
}
