//! [`SqliteRelay`]: the SQLite implementation of [`Transport`].

use std::path::Path;

use chrono::Utc;
use rusqlite::types::Value;
use shelf_core::{
  event::{Event, NewEvent},
  filter::Filter,
  transport::Transport,
};

use crate::{
  Result,
  encode::{RawEvent, decode_ts, encode_tags, encode_ts, event_id, indexable_tags},
  schema::SCHEMA,
};

// ─── Relay ───────────────────────────────────────────────────────────────────

/// A single-node relay backed by one SQLite file, publishing as `pubkey`.
///
/// Timestamps are second-resolution and strictly increase per
/// `(pubkey, kind)`, so a republished replaceable event always supersedes
/// the one it replaces even when both land in the same second.
///
/// Cloning is cheap; the inner connection is reference-counted.
#[derive(Clone)]
pub struct SqliteRelay {
  conn:   tokio_rusqlite::Connection,
  pubkey: String,
}

impl SqliteRelay {
  /// Open (or create) a relay at `path` and run schema initialisation.
  pub async fn open(path: impl AsRef<Path>, pubkey: impl Into<String>) -> Result<Self> {
    let conn = tokio_rusqlite::Connection::open(path).await?;
    let relay = Self {
      conn,
      pubkey: pubkey.into(),
    };
    relay.init_schema().await?;
    Ok(relay)
  }

  /// Open an in-memory relay.
  pub async fn open_in_memory(pubkey: impl Into<String>) -> Result<Self> {
    let conn = tokio_rusqlite::Connection::open_in_memory().await?;
    let relay = Self {
      conn,
      pubkey: pubkey.into(),
    };
    relay.init_schema().await?;
    Ok(relay)
  }

  async fn init_schema(&self) -> Result<()> {
    self
      .conn
      .call(|conn| {
        conn.execute_batch(SCHEMA)?;
        Ok(())
      })
      .await?;
    Ok(())
  }

  /// The key this relay signs published events with.
  pub fn pubkey(&self) -> &str { &self.pubkey }

  /// A handle on the same database that publishes as a different author.
  pub fn as_author(&self, pubkey: impl Into<String>) -> Self {
    Self {
      conn:   self.conn.clone(),
      pubkey: pubkey.into(),
    }
  }
}

// ─── Query building ──────────────────────────────────────────────────────────

fn placeholders(n: usize) -> String { vec!["?"; n].join(", ") }

/// Translate `filter` into SQL with positional parameters. Results are
/// newest first, ties broken by lowest id.
fn build_query(filter: &Filter) -> (String, Vec<Value>) {
  let mut conds: Vec<String> = vec![];
  let mut params: Vec<Value> = vec![];

  if !filter.kinds.is_empty() {
    conds.push(format!("kind IN ({})", placeholders(filter.kinds.len())));
    params.extend(filter.kinds.iter().map(|k| Value::Integer(i64::from(*k))));
  }
  if !filter.authors.is_empty() {
    conds.push(format!("pubkey IN ({})", placeholders(filter.authors.len())));
    params.extend(filter.authors.iter().cloned().map(Value::Text));
  }
  for (name, values) in &filter.tags {
    if values.is_empty() {
      continue;
    }
    conds.push(format!(
      "id IN (SELECT event_id FROM event_tags WHERE name = ? AND value IN ({}))",
      placeholders(values.len())
    ));
    params.push(Value::Text(name.to_string()));
    params.extend(values.iter().cloned().map(Value::Text));
  }
  if let Some(until) = filter.until {
    conds.push("created_at <= ?".to_string());
    params.push(Value::Integer(encode_ts(until)));
  }

  let where_clause = if conds.is_empty() {
    String::new()
  } else {
    format!("WHERE {}", conds.join(" AND "))
  };
  let limit_clause = match filter.limit {
    Some(limit) => {
      params.push(Value::Integer(i64::try_from(limit).unwrap_or(i64::MAX)));
      "LIMIT ?"
    }
    None => "",
  };

  let sql = format!(
    "SELECT id, pubkey, kind, created_at, content, tags
     FROM events
     {where_clause}
     ORDER BY created_at DESC, id ASC
     {limit_clause}"
  );
  (sql, params)
}

// ─── Transport impl ──────────────────────────────────────────────────────────

impl Transport for SqliteRelay {
  type Error = crate::Error;

  async fn query(&self, _relays: &[String], filter: &Filter) -> Result<Vec<Event>> {
    let (sql, params) = build_query(filter);

    let raws: Vec<RawEvent> = self
      .conn
      .call(move |conn| {
        let mut stmt = conn.prepare(&sql)?;
        let rows = stmt
          .query_map(rusqlite::params_from_iter(params.iter()), |row| {
            Ok(RawEvent {
              id:         row.get(0)?,
              pubkey:     row.get(1)?,
              kind:       row.get(2)?,
              created_at: row.get(3)?,
              content:    row.get(4)?,
              tags:       row.get(5)?,
            })
          })?
          .collect::<rusqlite::Result<Vec<_>>>()?;
        Ok(rows)
      })
      .await?;

    raws.into_iter().map(RawEvent::into_event).collect()
  }

  async fn publish(&self, _relays: &[String], event: NewEvent) -> Result<Event> {
    let NewEvent {
      kind,
      tags,
      content,
    } = event;
    let pubkey    = self.pubkey.clone();
    let now       = encode_ts(Utc::now());
    let tags_json = encode_tags(&tags)?;
    let index     = indexable_tags(&tags);

    // Assign the timestamp and id inside the write transaction so
    // concurrent publishes of one kind still get strictly increasing times.
    let row_tags = tags.clone();
    let row_content = content.clone();
    let row_pubkey = pubkey.clone();
    let (id, created_at) = self
      .conn
      .call(move |conn| {
        let tx = conn.transaction()?;

        let last: Option<i64> = tx.query_row(
          "SELECT MAX(created_at) FROM events WHERE pubkey = ?1 AND kind = ?2",
          rusqlite::params![row_pubkey, kind],
          |r| r.get(0),
        )?;
        let created_at = last.map_or(now, |last| now.max(last + 1));
        let id = event_id(&row_pubkey, created_at, kind, &row_tags, &row_content)
          .map_err(|e| tokio_rusqlite::Error::Other(Box::new(e)))?;

        tx.execute(
          "INSERT INTO events (id, pubkey, kind, created_at, content, tags)
           VALUES (?1, ?2, ?3, ?4, ?5, ?6)",
          rusqlite::params![id, row_pubkey, kind, created_at, row_content, tags_json],
        )?;
        for (name, value) in &index {
          tx.execute(
            "INSERT INTO event_tags (event_id, name, value) VALUES (?1, ?2, ?3)",
            rusqlite::params![id, name, value],
          )?;
        }
        tx.commit()?;
        Ok((id, created_at))
      })
      .await?;

    tracing::debug!(%id, kind, "stored event");

    Ok(Event {
      id,
      pubkey,
      kind,
      tags,
      content,
      created_at: decode_ts(created_at)?,
    })
  }
}
