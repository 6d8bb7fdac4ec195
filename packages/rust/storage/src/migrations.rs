//! SQL migration definitions for the Freshwire content database.
//!
//! Migrations are applied in order on database open. Each migration has a
//! version number and a set of SQL statements executed within a transaction.

/// A database migration with a version and SQL statements.
pub(crate) struct Migration {
    pub version: u32,
    pub description: &'static str,
    pub sql: &'static str,
}

/// All migrations, in ascending version order.
pub(crate) fn all_migrations() -> Vec<Migration> {
    vec![Migration {
        version: 1,
        description: "Initial schema: sources, content_records",
        sql: r#"
-- Schema version tracking
CREATE TABLE IF NOT EXISTS schema_migrations (
    version    INTEGER PRIMARY KEY,
    applied_at TEXT NOT NULL DEFAULT (datetime('now'))
);

-- Monitored source URLs
CREATE TABLE IF NOT EXISTS sources (
    url        TEXT PRIMARY KEY,
    added_by   TEXT,
    added_at   TEXT NOT NULL,
    is_active  INTEGER NOT NULL DEFAULT 1,
    tags       TEXT
);

-- One row per retrieval of new content; history is append-only so the
-- latest row per URL is the dedup baseline.
CREATE TABLE IF NOT EXISTS content_records (
    id           TEXT PRIMARY KEY,
    url          TEXT NOT NULL,
    title        TEXT,
    content_hash TEXT NOT NULL,
    content      TEXT,
    retrieved_at TEXT NOT NULL
);

CREATE INDEX IF NOT EXISTS idx_content_records_url_time
    ON content_records(url, retrieved_at DESC);

INSERT INTO schema_migrations (version) VALUES (1);
"#,
    }]
}
