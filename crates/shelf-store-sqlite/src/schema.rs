//! SQL schema for the Shelf SQLite relay.

/// Full schema DDL; idempotent thanks to `CREATE TABLE IF NOT EXISTS`.
pub const SCHEMA: &str = "
PRAGMA journal_mode = WAL;
PRAGMA foreign_keys = ON;

-- Events are strictly append-only. A replaceable event is superseded by a
-- newer row of the same (pubkey, kind); older rows are never deleted.
CREATE TABLE IF NOT EXISTS events (
    id          TEXT PRIMARY KEY,   -- sha256 hex of the canonical form
    pubkey      TEXT NOT NULL,
    kind        INTEGER NOT NULL,
    created_at  INTEGER NOT NULL,   -- unix seconds
    content     TEXT NOT NULL,
    tags        TEXT NOT NULL       -- JSON array of string arrays
);

-- Index of single-letter tags for `#x` filters: one row per tag, first
-- value only.
CREATE TABLE IF NOT EXISTS event_tags (
    event_id    TEXT NOT NULL REFERENCES events(id),
    name        TEXT NOT NULL,
    value       TEXT NOT NULL
);

CREATE INDEX IF NOT EXISTS events_author_kind_idx ON events(pubkey, kind, created_at);
CREATE INDEX IF NOT EXISTS events_created_idx     ON events(created_at);
CREATE INDEX IF NOT EXISTS event_tags_lookup_idx  ON event_tags(name, value);

PRAGMA user_version = 1;
";
