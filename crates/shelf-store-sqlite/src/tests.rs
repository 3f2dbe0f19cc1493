//! Integration tests for `SqliteRelay` against an in-memory database.

use chrono::{Duration, Utc};
use shelf_core::{
  event::{NewEvent, latest},
  filter::Filter,
  kind::{BOOK_REVIEW, BOOK_TBR, REACTION, TEXT_NOTE, TOPIC},
  transport::Transport,
};

use crate::SqliteRelay;

async fn relay() -> SqliteRelay {
  SqliteRelay::open_in_memory("alice")
    .await
    .expect("in-memory relay")
}

fn tags(raw: &[&[&str]]) -> Vec<Vec<String>> {
  raw
    .iter()
    .map(|t| t.iter().map(|s| s.to_string()).collect())
    .collect()
}

// ─── Publishing ──────────────────────────────────────────────────────────────

#[tokio::test]
async fn publish_assigns_identity() {
  let r = relay().await;
  let draft = NewEvent::new(TEXT_NOTE, tags(&[&["t", TOPIC]]), "hello");

  let event = r.publish(&[], draft).await.unwrap();
  assert_eq!(event.pubkey, "alice");
  assert_eq!(event.kind, TEXT_NOTE);
  assert_eq!(event.content, "hello");
  assert_eq!(event.id.len(), 64);
  assert!(event.created_at <= Utc::now());
}

#[tokio::test]
async fn replaceable_republish_supersedes_within_one_second() {
  let r = relay().await;

  let first = r
    .publish(&[], NewEvent::new(BOOK_TBR, tags(&[&["i", "isbn:1"]]), ""))
    .await
    .unwrap();
  let second = r
    .publish(&[], NewEvent::new(BOOK_TBR, tags(&[&["i", "isbn:2"]]), ""))
    .await
    .unwrap();

  assert!(second.created_at > first.created_at);
  assert!(second.supersedes(&first));

  let found = r
    .query(&[], &Filter::new().kind(BOOK_TBR).author("alice"))
    .await
    .unwrap();
  assert_eq!(found.len(), 2);
  assert_eq!(latest(&found).map(|e| e.id.as_str()), Some(second.id.as_str()));
}

#[tokio::test]
async fn timestamps_are_per_kind() {
  let r = relay().await;
  let a = r
    .publish(&[], NewEvent::new(BOOK_TBR, vec![], ""))
    .await
    .unwrap();
  let b = r
    .publish(&[], NewEvent::new(TEXT_NOTE, vec![], "x"))
    .await
    .unwrap();
  // No bump needed across kinds.
  assert!(b.created_at - a.created_at <= Duration::seconds(1));
}

// ─── Querying ────────────────────────────────────────────────────────────────

#[tokio::test]
async fn query_round_trips_tags_and_content() {
  let r = relay().await;
  let raw = tags(&[&["i", "isbn:1"], &["k", "isbn"], &["x", "a", "b", "c"]]);
  let published = r
    .publish(&[], NewEvent::new(BOOK_REVIEW, raw.clone(), "great"))
    .await
    .unwrap();

  let found = r.query(&[], &Filter::new().kind(BOOK_REVIEW)).await.unwrap();
  assert_eq!(found, vec![published]);
  assert_eq!(found[0].tags, raw);
}

#[tokio::test]
async fn query_filters_by_author() {
  let r = relay().await;
  let bob = r.as_author("bob");
  r.publish(&[], NewEvent::new(TEXT_NOTE, vec![], "a")).await.unwrap();
  bob.publish(&[], NewEvent::new(TEXT_NOTE, vec![], "b")).await.unwrap();

  let alice_only = r
    .query(&[], &Filter::new().kind(TEXT_NOTE).author("alice"))
    .await
    .unwrap();
  assert_eq!(alice_only.len(), 1);
  assert_eq!(alice_only[0].content, "a");

  let everyone = r.query(&[], &Filter::new().kind(TEXT_NOTE)).await.unwrap();
  assert_eq!(everyone.len(), 2);
}

#[tokio::test]
async fn query_filters_by_tag_first_value() {
  let r = relay().await;
  r.publish(&[], NewEvent::new(TEXT_NOTE, tags(&[&["t", TOPIC]]), "on topic"))
    .await
    .unwrap();
  r.publish(&[], NewEvent::new(TEXT_NOTE, tags(&[&["t", "other"]]), "off topic"))
    .await
    .unwrap();
  r.publish(&[], NewEvent::new(TEXT_NOTE, vec![], "untagged"))
    .await
    .unwrap();

  let found = r
    .query(&[], &Filter::new().kind(TEXT_NOTE).tag('t', TOPIC))
    .await
    .unwrap();
  assert_eq!(found.len(), 1);
  assert_eq!(found[0].content, "on topic");
}

#[tokio::test]
async fn query_matches_reaction_targets() {
  let r = relay().await;
  r.publish(&[], NewEvent::new(REACTION, tags(&[&["e", "target"]]), "+"))
    .await
    .unwrap();
  r.publish(&[], NewEvent::new(REACTION, tags(&[&["e", "elsewhere"]]), "+"))
    .await
    .unwrap();

  let found = r
    .query(&[], &Filter::new().kind(REACTION).tag('e', "target").tag('e', "missing"))
    .await
    .unwrap();
  assert_eq!(found.len(), 1);
}

#[tokio::test]
async fn query_orders_newest_first_and_limits() {
  let r = relay().await;
  for i in 0..5 {
    r.publish(&[], NewEvent::new(BOOK_TBR, vec![], i.to_string()))
      .await
      .unwrap();
  }

  let found = r
    .query(&[], &Filter::new().kind(BOOK_TBR).limit(2))
    .await
    .unwrap();
  assert_eq!(found.len(), 2);
  assert_eq!(found[0].content, "4");
  assert_eq!(found[1].content, "3");
}

#[tokio::test]
async fn query_until_pages_backwards() {
  let r = relay().await;
  let mut published = vec![];
  for i in 0..3 {
    published.push(
      r.publish(&[], NewEvent::new(BOOK_TBR, vec![], i.to_string()))
        .await
        .unwrap(),
    );
  }

  let until = published[1].created_at;
  let found = r
    .query(&[], &Filter::new().kind(BOOK_TBR).until(Some(until)))
    .await
    .unwrap();
  let contents: Vec<_> = found.iter().map(|e| e.content.as_str()).collect();
  assert_eq!(contents, vec!["1", "0"]);
}

#[tokio::test]
async fn relays_argument_is_ignored() {
  let r = relay().await;
  let relays = vec!["wss://relay.example".to_string()];
  r.publish(&relays, NewEvent::new(TEXT_NOTE, vec![], "x"))
    .await
    .unwrap();
  assert_eq!(r.query(&[], &Filter::new()).await.unwrap().len(), 1);
}

// ─── Persistence ─────────────────────────────────────────────────────────────

#[tokio::test]
async fn reopening_a_file_keeps_events() {
  let dir = std::env::temp_dir().join(format!(
    "shelf-relay-{}-{}",
    std::process::id(),
    Utc::now().timestamp_nanos_opt().unwrap_or_default()
  ));
  std::fs::create_dir_all(&dir).unwrap();
  let path = dir.join("relay.db");

  {
    let r = SqliteRelay::open(&path, "alice").await.unwrap();
    r.publish(&[], NewEvent::new(TEXT_NOTE, vec![], "kept"))
      .await
      .unwrap();
  }

  let r = SqliteRelay::open(&path, "alice").await.unwrap();
  let found = r.query(&[], &Filter::new()).await.unwrap();
  assert_eq!(found.len(), 1);
  assert_eq!(found[0].content, "kept");

  let _ = std::fs::remove_dir_all(&dir);
}
