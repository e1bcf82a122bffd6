// SPDX-FileCopyrightText: 2026 BrowserOS Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! SQLite implementation of the StorageAdapter trait.

use std::path::PathBuf;

use async_trait::async_trait;
use tokio::sync::OnceCell;
use tracing::{debug, error, warn};

use browseros_core::types::StoredMessageRow;
use browseros_core::{HealthStatus, MemoryError, PluginAdapter, StorageAdapter};

use crate::database::Database;
use crate::models::ConversationRecord;
use crate::queries;

/// SQLite-backed durable storage.
///
/// The database is opened lazily by [`StorageAdapter::initialize`]. When the
/// open fails the adapter stays unavailable and every operation degrades to
/// a logged no-op or an empty read.
pub struct SqliteStorage {
    path: PathBuf,
    db: OnceCell<Database>,
}

impl SqliteStorage {
    /// Create a new adapter for the database file at `path`.
    ///
    /// Nothing touches the filesystem until [`initialize`] is called.
    ///
    /// [`initialize`]: StorageAdapter::initialize
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self {
            path: path.into(),
            db: OnceCell::new(),
        }
    }

    /// Returns the underlying Database, or an error if not initialized.
    fn db(&self) -> Result<&Database, MemoryError> {
        self.db.get().ok_or_else(|| MemoryError::Unavailable {
            backend: self.name().to_string(),
        })
    }

    /// Lists stored conversations, most recently updated first.
    pub async fn list_conversations(&self) -> Result<Vec<ConversationRecord>, MemoryError> {
        queries::conversations::list_conversations(self.db()?).await
    }

    /// Registry entry for one conversation, if it has ever been written.
    pub async fn get_conversation(
        &self,
        conversation_id: &str,
    ) -> Result<Option<ConversationRecord>, MemoryError> {
        queries::conversations::get_conversation(self.db()?, conversation_id).await
    }
}

#[async_trait]
impl PluginAdapter for SqliteStorage {
    fn name(&self) -> &str {
        "sqlite"
    }

    fn version(&self) -> semver::Version {
        semver::Version::new(0, 1, 0)
    }

    async fn health_check(&self) -> Result<HealthStatus, MemoryError> {
        let db = match self.db() {
            Ok(db) => db,
            Err(e) => return Ok(HealthStatus::Unhealthy(e.to_string())),
        };
        db.connection()
            .call(|conn| -> Result<(), rusqlite::Error> {
                conn.query_row("SELECT 1", [], |_| Ok(()))
            })
            .await
            .map_err(crate::database::map_tr_err)?;
        Ok(HealthStatus::Healthy)
    }

    async fn shutdown(&self) -> Result<(), MemoryError> {
        if let Some(db) = self.db.get() {
            db.checkpoint().await?;
            debug!("shutdown: WAL checkpoint complete");
        }
        Ok(())
    }
}

#[async_trait]
impl StorageAdapter for SqliteStorage {
    async fn initialize(&self) {
        match self.db.get_or_try_init(|| Database::open(&self.path)).await {
            Ok(_) => debug!(path = %self.path.display(), "SQLite chat storage initialized"),
            Err(e) => warn!(
                path = %self.path.display(),
                error = %e,
                "SQLite chat storage unavailable"
            ),
        }
    }

    fn is_available(&self) -> bool {
        self.db.initialized()
    }

    async fn replace_conversation(&self, conversation_id: &str, rows: &[StoredMessageRow]) {
        let db = match self.db() {
            Ok(db) => db,
            Err(e) => {
                warn!(conversation_id, error = %e, "skipping conversation write");
                return;
            }
        };
        let now_ms = chrono::Utc::now().timestamp_millis();
        if let Err(e) =
            queries::messages::replace_conversation(db, conversation_id, rows, now_ms).await
        {
            error!(
                conversation_id,
                rows = rows.len(),
                error = %e,
                "failed to persist conversation"
            );
        }
    }

    async fn get_messages(&self, conversation_id: &str) -> Vec<StoredMessageRow> {
        let db = match self.db() {
            Ok(db) => db,
            Err(e) => {
                warn!(conversation_id, error = %e, "returning empty conversation");
                return Vec::new();
            }
        };
        match queries::messages::get_messages(db, conversation_id).await {
            Ok(rows) => rows,
            Err(e) => {
                warn!(conversation_id, error = %e, "failed to load conversation");
                Vec::new()
            }
        }
    }

    async fn clear_conversation(&self, conversation_id: &str) {
        let db = match self.db() {
            Ok(db) => db,
            Err(e) => {
                warn!(conversation_id, error = %e, "skipping conversation clear");
                return;
            }
        };
        if let Err(e) = queries::messages::clear_conversation(db, conversation_id).await {
            error!(conversation_id, error = %e, "failed to clear conversation");
        }
    }
}
