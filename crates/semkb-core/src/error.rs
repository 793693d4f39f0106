//! Error types for `semkb-core`.

use thiserror::Error;

use crate::{heading::HeadingId, sentence::SentenceId};

#[derive(Debug, Error)]
pub enum Error {
  #[error("heading not found: {0}")]
  HeadingNotFound(HeadingId),

  #[error("sentence not found: {0}")]
  SentenceNotFound(SentenceId),

  #[error("cannot move heading {heading} beneath {parent}: would create a cycle")]
  HeadingCycle { heading: HeadingId, parent: HeadingId },

  #[error("the root heading cannot be moved")]
  RootImmovable,

  #[error("heading {text:?} already exists under parent {parent}")]
  HeadingExists { text: String, parent: HeadingId },
}

pub type Result<T, E = Error> = std::result::Result<T, E>;
