//! SQL schema for the semkb SQLite store.
//!
//! Executed once at connection startup. The root heading is seeded separately
//! (see [`SEED_ROOT`]) because its text is configurable.

/// Full schema DDL; safe to run on every open (tables use `IF NOT EXISTS`,
/// the view is recreated).
pub const SCHEMA: &str = "
PRAGMA journal_mode = WAL;
PRAGMA foreign_keys = ON;

CREATE TABLE IF NOT EXISTS entities (
    entity_id  INTEGER PRIMARY KEY AUTOINCREMENT,
    text       TEXT NOT NULL UNIQUE
);

-- Only the root heading has a NULL parent.
CREATE TABLE IF NOT EXISTS headings (
    heading_id INTEGER PRIMARY KEY AUTOINCREMENT,
    text       TEXT NOT NULL,
    parent_id  INTEGER REFERENCES headings(heading_id),
    UNIQUE (text, parent_id)
);

CREATE TABLE IF NOT EXISTS sentences (
    sentence_id  INTEGER PRIMARY KEY AUTOINCREMENT,
    tagged_text  TEXT NOT NULL,               -- space-separated word_TAG tokens
    dependencies TEXT NOT NULL DEFAULT '[]',  -- JSON array of labels
    heading_id   INTEGER NOT NULL DEFAULT 1 REFERENCES headings(heading_id),
    UNIQUE (tagged_text, heading_id)
);

-- Not unique: re-ingesting a sentence appends its links again.
CREATE TABLE IF NOT EXISTS normalizations (
    sentence_id INTEGER NOT NULL REFERENCES sentences(sentence_id),
    entity_id   INTEGER NOT NULL REFERENCES entities(entity_id)
);

-- sentence_ids is a JSON array that is only ever appended to.
CREATE TABLE IF NOT EXISTS frames (
    label        TEXT PRIMARY KEY,
    sentence_ids TEXT NOT NULL DEFAULT '[]'
);

CREATE INDEX IF NOT EXISTS normalizations_entity_idx   ON normalizations(entity_id);
CREATE INDEX IF NOT EXISTS normalizations_sentence_idx ON normalizations(sentence_id);
CREATE INDEX IF NOT EXISTS sentences_heading_idx       ON sentences(heading_id);
CREATE INDEX IF NOT EXISTS headings_parent_idx         ON headings(parent_id);

-- Sentences filed directly under each heading, in sentence id order.
-- Recreated on every open.
DROP VIEW IF EXISTS heading_content;
CREATE VIEW heading_content AS
  SELECT h.heading_id,
         h.text AS heading,
         json_group_array(s.tagged_text ORDER BY s.sentence_id) AS content
  FROM headings h
  JOIN sentences s ON s.heading_id = h.heading_id
  GROUP BY h.heading_id;

PRAGMA user_version = 1;
";

/// Seeds the sentinel root heading with id 1. Parameter: root text.
pub const SEED_ROOT: &str =
  "INSERT OR IGNORE INTO headings (heading_id, text, parent_id) VALUES (1, ?1, NULL)";

/// Empties every relation and restarts the id sequences.
pub const TRUNCATE: &str = "
DELETE FROM normalizations;
DELETE FROM frames;
DELETE FROM sentences;
DELETE FROM entities;
DELETE FROM headings;
DELETE FROM sqlite_sequence;
";
