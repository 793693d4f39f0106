//! Integration tests for `SqliteStore` against an in-memory database.

use std::collections::BTreeSet;

use semkb_core::{
  Error as CoreError,
  config::RetrievalConfig,
  heading::{HeadingId, ROOT_HEADING_ID},
  query::RetrievalQuery,
  sentence::{NewSentence, SentenceId, TaggedToken},
  store::KnowledgeStore,
};

use tokio::task::JoinSet;

use crate::{Error, SqliteStore};

async fn store() -> SqliteStore {
  SqliteStore::open_in_memory()
    .await
    .expect("in-memory store")
}

const BARACK: &str = "Barack_PERSON was_VBD born_VBN in_IN Hawaii_GPE";

fn barack(heading_id: HeadingId) -> NewSentence {
  NewSentence::new(BARACK)
    .with_entities(["Barack", "Hawaii"])
    .with_dependencies(["nsubjpass", "prep"])
    .under(heading_id)
}

fn no_frames() -> Vec<String> { Vec::new() }

fn set(ids: &[SentenceId]) -> BTreeSet<SentenceId> { ids.iter().copied().collect() }

fn labels(labels: &[&str]) -> BTreeSet<String> {
  labels.iter().map(|l| (*l).to_owned()).collect()
}

// ─── Headings ────────────────────────────────────────────────────────────────

#[tokio::test]
async fn root_heading_is_seeded() {
  let s = store().await;
  let path = s.heading_hierarchy(ROOT_HEADING_ID).await.unwrap();
  assert_eq!(path.len(), 1);
  assert_eq!(path[0].text, "ROOT");
  assert_eq!(path[0].index, 0);
}

#[tokio::test]
async fn root_text_is_configurable() {
  let config = RetrievalConfig { root_heading: "Document".into(), ..Default::default() };
  let s = SqliteStore::open_in_memory_with_config(config).await.unwrap();
  let path = s.heading_hierarchy(ROOT_HEADING_ID).await.unwrap();
  assert_eq!(path[0].text, "Document");
}

#[tokio::test]
async fn heading_insert_is_idempotent() {
  let s = store().await;
  let a = s.insert_heading("Intro".into(), None).await.unwrap();
  let b = s.insert_heading("Intro".into(), Some(ROOT_HEADING_ID)).await.unwrap();
  assert_eq!(a, b);
  assert_ne!(a, ROOT_HEADING_ID);
}

#[tokio::test]
async fn same_text_under_other_parent_is_a_new_heading() {
  let s = store().await;
  let intro = s.insert_heading("Intro".into(), None).await.unwrap();
  let nested = s.insert_heading("Intro".into(), Some(intro)).await.unwrap();
  assert_ne!(intro, nested);
}

#[tokio::test]
async fn heading_with_missing_parent_is_rejected() {
  let s = store().await;
  let err = s.insert_heading("Orphan".into(), Some(42)).await.unwrap_err();
  assert!(matches!(err, Error::Core(CoreError::HeadingNotFound(42))));
}

#[tokio::test]
async fn heading_chain_returns_deepest_and_is_idempotent() {
  let s = store().await;
  let bg = s
    .insert_heading_chain(vec!["Intro".into(), "Background".into()])
    .await
    .unwrap();
  let again = s
    .insert_heading_chain(vec!["Intro".into(), "Background".into()])
    .await
    .unwrap();
  assert_eq!(bg, again);

  let texts: Vec<_> = s
    .heading_hierarchy(bg)
    .await
    .unwrap()
    .into_iter()
    .map(|e| (e.text, e.index))
    .collect();
  assert_eq!(
    texts,
    vec![("ROOT".into(), -2), ("Intro".into(), -1), ("Background".into(), 0)]
  );
}

#[tokio::test]
async fn empty_chain_is_root() {
  let s = store().await;
  assert_eq!(s.insert_heading_chain(vec![]).await.unwrap(), ROOT_HEADING_ID);
}

#[tokio::test]
async fn hierarchy_includes_descendants() {
  let s = store().await;
  let c = s
    .insert_heading_chain(vec!["A".into(), "B".into(), "C".into()])
    .await
    .unwrap();
  let a = s.insert_heading("A".into(), None).await.unwrap();

  let path = s.heading_hierarchy(a).await.unwrap();
  let indices: Vec<_> = path.iter().map(|e| e.index).collect();
  assert_eq!(indices, vec![-1, 0, 1, 2]);
  assert_eq!(path.last().unwrap().heading_id, c);
}

#[tokio::test]
async fn unknown_heading_hierarchy_is_empty() {
  let s = store().await;
  assert!(s.heading_hierarchy(99).await.unwrap().is_empty());
}

// ─── Moving headings ─────────────────────────────────────────────────────────

#[tokio::test]
async fn move_heading_refiles_subtree() {
  let s = store().await;
  let b = s.insert_heading_chain(vec!["A".into(), "B".into()]).await.unwrap();
  let other = s.insert_heading("Other".into(), None).await.unwrap();
  let sid = s.insert_sentence(barack(b)).await.unwrap();

  s.move_heading(b, other).await.unwrap();

  let groups = s.group_by_heading(&set(&[sid])).await.unwrap();
  assert_eq!(groups[0].display_path, "ROOT > Other > B");
}

#[tokio::test]
async fn move_heading_rejects_cycles_and_root() {
  let s = store().await;
  let a = s.insert_heading("A".into(), None).await.unwrap();
  let b = s.insert_heading("B".into(), Some(a)).await.unwrap();

  let err = s.move_heading(a, b).await.unwrap_err();
  assert!(matches!(err, Error::Core(CoreError::HeadingCycle { .. })));

  let err = s.move_heading(a, a).await.unwrap_err();
  assert!(matches!(err, Error::Core(CoreError::HeadingCycle { .. })));

  let err = s.move_heading(ROOT_HEADING_ID, a).await.unwrap_err();
  assert!(matches!(err, Error::Core(CoreError::RootImmovable)));

  let err = s.move_heading(b, 99).await.unwrap_err();
  assert!(matches!(err, Error::Core(CoreError::HeadingNotFound(99))));
}

#[tokio::test]
async fn move_heading_rejects_duplicate_pair() {
  let s = store().await;
  let a = s.insert_heading("A".into(), None).await.unwrap();
  s.insert_heading("B".into(), Some(a)).await.unwrap();
  let loose_b = s.insert_heading("B".into(), None).await.unwrap();

  let err = s.move_heading(loose_b, a).await.unwrap_err();
  assert!(matches!(err, Error::Core(CoreError::HeadingExists { .. })));
}

// ─── Sentences ───────────────────────────────────────────────────────────────

#[tokio::test]
async fn sentence_insert_is_idempotent() {
  let s = store().await;
  let first = s.insert_sentence(barack(ROOT_HEADING_ID)).await.unwrap();
  let second = s.insert_sentence(barack(ROOT_HEADING_ID)).await.unwrap();
  assert_eq!(first, second);
  assert_eq!(s.sentence_count().await.unwrap(), 1);
}

#[tokio::test]
async fn same_text_under_other_heading_is_a_new_sentence() {
  let s = store().await;
  let intro = s.insert_heading("Intro".into(), None).await.unwrap();
  let a = s.insert_sentence(barack(ROOT_HEADING_ID)).await.unwrap();
  let b = s.insert_sentence(barack(intro)).await.unwrap();
  assert_ne!(a, b);
  assert_eq!(s.sentence_count().await.unwrap(), 2);
}

#[tokio::test]
async fn sentence_defaults_to_root() {
  let s = store().await;
  let sid = s
    .insert_sentence(NewSentence::new("It_PRP rained_VBD").with_entities(["rain"]))
    .await
    .unwrap();
  let groups = s.group_by_heading(&set(&[sid])).await.unwrap();
  assert_eq!(groups[0].heading_id, ROOT_HEADING_ID);
  assert_eq!(groups[0].display_path, "ROOT");
}

#[tokio::test]
async fn sentence_with_missing_heading_is_rejected() {
  let s = store().await;
  let err = s.insert_sentence(barack(77)).await.unwrap_err();
  assert!(matches!(err, Error::Core(CoreError::HeadingNotFound(77))));
  assert_eq!(s.sentence_count().await.unwrap(), 0);
  assert!(s.all_entities().await.unwrap().is_empty());
}

#[tokio::test]
async fn fetch_by_ids_keeps_order_and_skips_missing() {
  let s = store().await;
  let a = s.insert_sentence(NewSentence::new("a_DT")).await.unwrap();
  let b = s.insert_sentence(NewSentence::new("New_York_NNP b_NN")).await.unwrap();

  let fetched = s.sentences_by_ids(vec![b, 999, a]).await.unwrap();
  let ids: Vec<_> = fetched.iter().map(|t| t.sentence_id).collect();
  assert_eq!(ids, vec![b, a]);
  assert_eq!(
    fetched[0].tokens[0],
    TaggedToken { word: "New_York".into(), tag: "NNP".into() }
  );
}

#[tokio::test]
async fn fetch_all_is_restartable() {
  let s = store().await;
  s.insert_sentence(NewSentence::new("a_DT")).await.unwrap();
  s.insert_sentence(NewSentence::new("b_DT")).await.unwrap();

  let first = s.all_sentences().await.unwrap();
  let second = s.all_sentences().await.unwrap();
  assert_eq!(first.len(), 2);
  assert_eq!(first, second);
  assert!(first[0].sentence_id < first[1].sentence_id);
}

// ─── Entities ────────────────────────────────────────────────────────────────

#[tokio::test]
async fn entities_are_shared_and_sorted_by_text() {
  let s = store().await;
  s.insert_sentence(barack(ROOT_HEADING_ID)).await.unwrap();
  s.insert_sentence(
    NewSentence::new("Barack_PERSON visited_VBD Chicago_GPE").with_entities(["Chicago", "Barack"]),
  )
  .await
  .unwrap();

  let texts: Vec<_> = s.all_entities().await.unwrap().into_iter().map(|e| e.text).collect();
  assert_eq!(texts, vec!["Barack", "Chicago", "Hawaii"]);
}

#[tokio::test]
async fn fuzzy_match_entity_returns_at_most_three() {
  let s = store().await;
  s.insert_sentence(
    NewSentence::new("x_X").with_entities(["Bab", "Bac", "Bad", "Bae", "Barcelona"]),
  )
  .await
  .unwrap();

  let ids = s.fuzzy_match_entity("Ba").await.unwrap();
  assert_eq!(ids.len(), 3);

  let entities = s.all_entities().await.unwrap();
  let texts: Vec<_> = ids
    .iter()
    .map(|id| entities.iter().find(|e| e.entity_id == *id).unwrap().text.as_str())
    .collect();
  assert_eq!(texts, vec!["Bab", "Bac", "Bad"]);
}

#[tokio::test]
async fn empty_entity_string_is_a_prefix_of_everything() {
  let s = store().await;
  let sid = s
    .insert_sentence(NewSentence::new("x_X").with_entities(["Barack", "Bab", "Bac"]))
    .await
    .unwrap();

  // Entities are created in text order: Bab, Bac, Barack.
  assert_eq!(s.fuzzy_match_entity("").await.unwrap(), vec![1, 2, 3]);
  let found = s.query(&RetrievalQuery::new([""], no_frames())).await.unwrap();
  assert_eq!(found, set(&[sid]));

  // "Bab" is 1 deletion + 2 substitutions (5) from "  ": not within tolerance.
  assert!(s.fuzzy_match_entity("  ").await.unwrap().is_empty());
  s.insert_sentence(NewSentence::new("y_Y").with_entities(["ab"])).await.unwrap();
  assert_eq!(s.fuzzy_match_entity("  ").await.unwrap(), vec![4]);
}

// ─── Querying ────────────────────────────────────────────────────────────────

#[tokio::test]
async fn misspelled_entity_retrieves_sentence_end_to_end() {
  let s = store().await;
  let bg = s
    .insert_heading_chain(vec!["Intro".into(), "Background".into()])
    .await
    .unwrap();
  let sid = s.insert_sentence(barack(bg)).await.unwrap();

  let found = s.query(&RetrievalQuery::new(["Barak"], no_frames())).await.unwrap();
  assert_eq!(found, set(&[sid]));

  let groups = s.group_by_heading(&found).await.unwrap();
  assert_eq!(groups.len(), 1);
  assert_eq!(groups[0].heading_id, bg);
  assert_eq!(groups[0].display_path, "ROOT > Intro > Background");
  assert_eq!(groups[0].sentence_ids, vec![sid]);
  assert_eq!(groups[0].first_sentence_id, sid);
  assert_eq!(groups[0].last_sentence_id, sid);
}

#[tokio::test]
async fn empty_query_returns_nothing() {
  let s = store().await;
  s.insert_sentence(barack(ROOT_HEADING_ID)).await.unwrap();
  let found = s.query(&RetrievalQuery::default()).await.unwrap();
  assert!(found.is_empty());
}

#[tokio::test]
async fn frames_narrow_and_fall_back() {
  let s = store().await;
  let born = s.insert_sentence(barack(ROOT_HEADING_ID)).await.unwrap();
  let lives = s
    .insert_sentence(
      NewSentence::new("Barack_PERSON lives_VBZ in_IN Chicago_GPE").with_entities(["Barack", "Chicago"]),
    )
    .await
    .unwrap();
  s.tag_sentence(born, labels(&["Being_born"])).await.unwrap();
  s.tag_sentence(lives, labels(&["Residence"])).await.unwrap();

  let narrowed = s
    .query(&RetrievalQuery::new(["Barack"], ["Being_born"]))
    .await
    .unwrap();
  assert_eq!(narrowed, set(&[born]));

  let either = s
    .query(&RetrievalQuery::new(["Barack"], ["Being_born", "Residence"]))
    .await
    .unwrap();
  assert_eq!(either, set(&[born, lives]));

  // Residence exists but not for Hawaii's sentence: fall back to entity hits.
  let fallback = s
    .query(&RetrievalQuery::new(["Hawaii"], ["Residence"]))
    .await
    .unwrap();
  assert_eq!(fallback, set(&[born]));

  let unknown = s
    .query(&RetrievalQuery::new(["Barack"], ["Nonexistent"]))
    .await
    .unwrap();
  assert_eq!(unknown, set(&[born, lives]));
}

#[tokio::test]
async fn frame_tagging_appends_duplicates() {
  let s = store().await;
  let sid = s.insert_sentence(barack(ROOT_HEADING_ID)).await.unwrap();
  s.tag_sentence(sid, labels(&["Being_born"])).await.unwrap();
  s.tag_sentence(sid, labels(&["Being_born"])).await.unwrap();

  // Append semantics: the same sentence is recorded once per tagging.
  let frame = s.frame("Being_born").await.unwrap().unwrap();
  assert_eq!(frame.sentence_ids, vec![sid, sid]);
  assert_eq!(frame.occurrences(sid), 2);

  // Duplicates do not leak into query results.
  let found = s.query(&RetrievalQuery::new(["Barack"], ["Being_born"])).await.unwrap();
  assert_eq!(found, set(&[sid]));
}

#[tokio::test]
async fn tagging_unknown_sentence_is_rejected() {
  let s = store().await;
  let err = s.tag_sentence(5, labels(&["Being_born"])).await.unwrap_err();
  assert!(matches!(err, Error::Core(CoreError::SentenceNotFound(5))));
  assert!(s.frame("Being_born").await.unwrap().is_none());
}

// ─── Aggregation ─────────────────────────────────────────────────────────────

#[tokio::test]
async fn group_by_heading_reports_full_heading_span() {
  let s = store().await;
  let bio = s.insert_heading("Biography".into(), None).await.unwrap();
  let first = s.insert_sentence(NewSentence::new("a_DT").under(bio)).await.unwrap();
  let middle = s.insert_sentence(barack(bio)).await.unwrap();
  let last = s.insert_sentence(NewSentence::new("c_DT").under(bio)).await.unwrap();
  let root_sid = s.insert_sentence(NewSentence::new("r_DT")).await.unwrap();

  let groups = s.group_by_heading(&set(&[middle, root_sid])).await.unwrap();
  assert_eq!(groups.len(), 2);
  assert_eq!(groups[0].heading_id, ROOT_HEADING_ID);
  assert_eq!(groups[1].heading_id, bio);
  assert_eq!(groups[1].display_path, "ROOT > Biography");
  assert_eq!(groups[1].sentence_ids, vec![middle]);
  assert_eq!((groups[1].first_sentence_id, groups[1].last_sentence_id), (first, last));
}

#[tokio::test]
async fn group_by_heading_of_nothing_is_empty() {
  let s = store().await;
  assert!(s.group_by_heading(&BTreeSet::new()).await.unwrap().is_empty());
  assert!(s.group_by_heading(&set(&[404])).await.unwrap().is_empty());
}

#[tokio::test]
async fn heading_content_in_sentence_order() {
  let s = store().await;
  let bio = s.insert_heading("Biography".into(), None).await.unwrap();
  s.insert_sentence(barack(bio)).await.unwrap();
  s.insert_sentence(NewSentence::new("He_PRP ran_VBD").under(bio)).await.unwrap();

  let content = s.heading_content(bio).await.unwrap().unwrap();
  assert_eq!(content.heading, "Biography");
  assert_eq!(content.content.len(), 2);
  assert_eq!(content.content[0][0].word, "Barack");
  assert_eq!(content.content[1][1], TaggedToken { word: "ran".into(), tag: "VBD".into() });

  let empty = s.insert_heading("Empty".into(), None).await.unwrap();
  assert!(s.heading_content(empty).await.unwrap().is_none());
}

#[tokio::test]
async fn heading_content_is_ordered_across_interleaved_headings() {
  let s = store().await;
  let left = s.insert_heading("Left".into(), None).await.unwrap();
  let right = s.insert_heading("Right".into(), None).await.unwrap();

  let mut expected = Vec::new();
  for i in 0..50 {
    s.insert_sentence(NewSentence::new(format!("r{i}_NN")).under(right)).await.unwrap();
    s.insert_sentence(NewSentence::new(format!("l{i}_NN")).under(left)).await.unwrap();
    expected.push(format!("l{i}"));
  }

  let content = s.heading_content(left).await.unwrap().unwrap();
  let words: Vec<_> = content.content.iter().map(|tokens| tokens[0].word.clone()).collect();
  assert_eq!(words, expected);
}

// ─── Concurrency ─────────────────────────────────────────────────────────────

#[tokio::test]
async fn concurrent_get_or_create_yields_one_id() {
  let s = store().await;

  let mut headings = JoinSet::new();
  for _ in 0..20 {
    let s = s.clone();
    headings.spawn(async move { s.insert_heading("X".into(), None).await.unwrap() });
  }
  let heading_ids: BTreeSet<HeadingId> = headings.join_all().await.into_iter().collect();
  assert_eq!(heading_ids.len(), 1);

  let mut sentences = JoinSet::new();
  for _ in 0..20 {
    let s = s.clone();
    sentences.spawn(async move { s.insert_sentence(barack(ROOT_HEADING_ID)).await.unwrap() });
  }
  let sentence_ids: BTreeSet<SentenceId> = sentences.join_all().await.into_iter().collect();
  assert_eq!(sentence_ids.len(), 1);
  assert_eq!(s.sentence_count().await.unwrap(), 1);

  let texts: Vec<_> = s.all_entities().await.unwrap().into_iter().map(|e| e.text).collect();
  assert_eq!(texts, vec!["Barack", "Hawaii"]);
}

// ─── Maintenance ─────────────────────────────────────────────────────────────

#[tokio::test]
async fn truncate_resets_everything_but_root() {
  let s = store().await;
  let bg = s.insert_heading_chain(vec!["Intro".into()]).await.unwrap();
  let sid = s.insert_sentence(barack(bg)).await.unwrap();
  s.tag_sentence(sid, labels(&["Being_born"])).await.unwrap();

  s.truncate().await.unwrap();

  assert_eq!(s.sentence_count().await.unwrap(), 0);
  assert!(s.all_entities().await.unwrap().is_empty());
  assert!(s.frame("Being_born").await.unwrap().is_none());
  assert_eq!(s.heading_hierarchy(ROOT_HEADING_ID).await.unwrap().len(), 1);

  // Identity counters restart.
  let again = s.insert_heading("Intro".into(), None).await.unwrap();
  assert_eq!(again, bg);
}
