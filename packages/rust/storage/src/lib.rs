//! libSQL persistence for monitored sources and retrieved content.
//!
//! [`ContentStore`] is the dedup seam the pipeline talks to: "have we seen
//! this (url, hash) pair?" and "record what we just extracted". [`Storage`]
//! implements it over a local libSQL database; [`MemoryStore`] is an
//! in-process implementation for tests.
//!
//! Dedup compares only the *most recently stored* hash per URL. Content
//! that reverts to an older version is therefore reported new again; full
//! history is kept but never consulted for the decision.

mod migrations;

use std::collections::HashMap;
use std::path::Path;
use std::sync::Mutex;
use std::sync::atomic::{AtomicBool, Ordering};

use async_trait::async_trait;
use chrono::Utc;
use libsql::{Connection, Database, params};
use uuid::Uuid;

use freshwire_shared::{FreshwireError, Result};

// ---------------------------------------------------------------------------
// ContentStore trait
// ---------------------------------------------------------------------------

/// Dedup persistence consumed by the retrieval pipeline.
#[async_trait]
pub trait ContentStore: Send + Sync {
    /// True if no record exists for `url`, or if the most recently stored
    /// hash for `url` differs from `content_hash`.
    async fn is_content_new(&self, url: &str, content_hash: &str) -> Result<bool>;

    /// Append a content record. Called after successful extraction and
    /// before the item is reported as new.
    async fn record_content(
        &self,
        url: &str,
        content_hash: &str,
        title: &str,
        content: &str,
    ) -> Result<()>;
}

// ---------------------------------------------------------------------------
// Storage (libSQL)
// ---------------------------------------------------------------------------

/// Primary storage handle wrapping a libSQL database.
pub struct Storage {
    #[allow(dead_code)]
    db: Database,
    conn: Connection,
}

impl Storage {
    /// Open or create a database at `path`.
    pub async fn open(path: &Path) -> Result<Self> {
        // Ensure parent directory exists
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent).map_err(|e| FreshwireError::io(parent, e))?;
        }

        let db = libsql::Builder::new_local(path)
            .build()
            .await
            .map_err(|e| FreshwireError::Storage(e.to_string()))?;

        let conn = db
            .connect()
            .map_err(|e| FreshwireError::Storage(e.to_string()))?;

        let storage = Self { db, conn };
        storage.run_migrations().await?;
        Ok(storage)
    }

    /// Run pending schema migrations.
    async fn run_migrations(&self) -> Result<()> {
        let current_version = self.get_schema_version().await;

        for migration in migrations::all_migrations() {
            if migration.version > current_version {
                tracing::info!(
                    version = migration.version,
                    description = migration.description,
                    "applying migration"
                );
                self.conn.execute_batch(migration.sql).await.map_err(|e| {
                    FreshwireError::Storage(format!(
                        "migration v{} failed: {e}",
                        migration.version
                    ))
                })?;
            }
        }
        Ok(())
    }

    /// Get the current schema version, or 0 if no migrations have been applied.
    async fn get_schema_version(&self) -> u32 {
        let result = self
            .conn
            .query("SELECT MAX(version) FROM schema_migrations", params![])
            .await;

        match result {
            Ok(mut rows) => {
                if let Ok(Some(row)) = rows.next().await {
                    row.get::<u32>(0).unwrap_or(0)
                } else {
                    0
                }
            }
            Err(_) => 0, // Table doesn't exist yet
        }
    }

    // -----------------------------------------------------------------------
    // Source registry
    // -----------------------------------------------------------------------

    /// Register a URL to monitor, reactivating it if it already exists.
    pub async fn add_source(&self, url: &str, added_by: &str, tags: &[String]) -> Result<()> {
        let now = Utc::now().to_rfc3339();
        let tags_json = serde_json::to_string(tags)
            .map_err(|e| FreshwireError::Storage(e.to_string()))?;
        self.conn
            .execute(
                "INSERT INTO sources (url, added_by, added_at, is_active, tags)
                 VALUES (?1, ?2, ?3, 1, ?4)
                 ON CONFLICT (url) DO UPDATE SET is_active = 1, tags = excluded.tags",
                params![url, added_by, now.as_str(), tags_json.as_str()],
            )
            .await
            .map_err(|e| FreshwireError::Storage(e.to_string()))?;
        Ok(())
    }

    /// All active source URLs, in registration order.
    pub async fn list_active_sources(&self) -> Result<Vec<String>> {
        let mut rows = self
            .conn
            .query(
                "SELECT url FROM sources WHERE is_active = 1 ORDER BY added_at",
                params![],
            )
            .await
            .map_err(|e| FreshwireError::Storage(e.to_string()))?;

        let mut urls = Vec::new();
        while let Ok(Some(row)) = rows.next().await {
            urls.push(
                row.get::<String>(0)
                    .map_err(|e| FreshwireError::Storage(e.to_string()))?,
            );
        }
        Ok(urls)
    }

    /// Deactivate a source without deleting its content history.
    pub async fn deactivate_source(&self, url: &str) -> Result<()> {
        self.conn
            .execute(
                "UPDATE sources SET is_active = 0 WHERE url = ?1",
                params![url],
            )
            .await
            .map_err(|e| FreshwireError::Storage(e.to_string()))?;
        Ok(())
    }

    /// The most recently stored hash for a URL, if any.
    async fn latest_hash(&self, url: &str) -> Result<Option<String>> {
        let mut rows = self
            .conn
            .query(
                "SELECT content_hash FROM content_records
                 WHERE url = ?1
                 ORDER BY retrieved_at DESC, id DESC
                 LIMIT 1",
                params![url],
            )
            .await
            .map_err(|e| FreshwireError::Storage(e.to_string()))?;

        match rows.next().await {
            Ok(Some(row)) => Ok(Some(
                row.get::<String>(0)
                    .map_err(|e| FreshwireError::Storage(e.to_string()))?,
            )),
            Ok(None) => Ok(None),
            Err(e) => Err(FreshwireError::Storage(e.to_string())),
        }
    }
}

#[async_trait]
impl ContentStore for Storage {
    async fn is_content_new(&self, url: &str, content_hash: &str) -> Result<bool> {
        Ok(match self.latest_hash(url).await? {
            Some(latest) => latest != content_hash,
            None => true,
        })
    }

    async fn record_content(
        &self,
        url: &str,
        content_hash: &str,
        title: &str,
        content: &str,
    ) -> Result<()> {
        let id = Uuid::now_v7().to_string();
        let now = Utc::now().to_rfc3339();
        self.conn
            .execute(
                "INSERT INTO content_records (id, url, title, content_hash, content, retrieved_at)
                 VALUES (?1, ?2, ?3, ?4, ?5, ?6)",
                params![
                    id.as_str(),
                    url,
                    title,
                    content_hash,
                    content,
                    now.as_str()
                ],
            )
            .await
            .map_err(|e| FreshwireError::Storage(e.to_string()))?;
        Ok(())
    }
}

// ---------------------------------------------------------------------------
// MemoryStore (tests and dry runs)
// ---------------------------------------------------------------------------

/// In-process [`ContentStore`] keeping only the latest hash per URL.
#[derive(Default)]
pub struct MemoryStore {
    latest: Mutex<HashMap<String, String>>,
    unavailable: AtomicBool,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Make every subsequent call fail, simulating store downtime.
    pub fn set_unavailable(&self, unavailable: bool) {
        self.unavailable.store(unavailable, Ordering::SeqCst);
    }

    fn check_available(&self) -> Result<()> {
        if self.unavailable.load(Ordering::SeqCst) {
            return Err(FreshwireError::Storage("store offline".into()));
        }
        Ok(())
    }
}

#[async_trait]
impl ContentStore for MemoryStore {
    async fn is_content_new(&self, url: &str, content_hash: &str) -> Result<bool> {
        self.check_available()?;
        let latest = self.latest.lock().expect("lock poisoned");
        Ok(latest.get(url).is_none_or(|h| h != content_hash))
    }

    async fn record_content(
        &self,
        url: &str,
        content_hash: &str,
        _title: &str,
        _content: &str,
    ) -> Result<()> {
        self.check_available()?;
        let mut latest = self.latest.lock().expect("lock poisoned");
        latest.insert(url.to_string(), content_hash.to_string());
        Ok(())
    }
}
