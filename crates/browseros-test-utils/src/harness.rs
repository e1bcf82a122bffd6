// SPDX-FileCopyrightText: 2026 BrowserOS Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Test harness for durable-storage integration tests.
//!
//! `TestHarness` owns a temp directory holding a SQLite database file, so
//! several storage instances (one per simulated process start) can be opened
//! against the same file and everything is removed on drop.

use std::path::{Path, PathBuf};
use std::sync::Arc;

use browseros_core::{MemoryError, PluginAdapter, StorageAdapter};
use browseros_storage::SqliteStorage;

/// Builder for creating test environments with configurable options.
pub struct TestHarnessBuilder {
    seed: Vec<(String, Vec<browseros_core::StoredMessageRow>)>,
}

impl TestHarnessBuilder {
    fn new() -> Self {
        Self { seed: Vec::new() }
    }

    /// Rows written to the database before the harness is handed out.
    pub fn with_conversation(
        mut self,
        conversation_id: impl Into<String>,
        rows: Vec<browseros_core::StoredMessageRow>,
    ) -> Self {
        self.seed.push((conversation_id.into(), rows));
        self
    }

    /// Create the temp directory and apply any seeded conversations.
    pub async fn build(self) -> Result<TestHarness, MemoryError> {
        let temp_dir = tempfile::TempDir::new().map_err(MemoryError::storage)?;
        let db_path = temp_dir.path().join("chat_memory.sqlite");
        let harness = TestHarness {
            db_path,
            _temp_dir: temp_dir,
        };

        if !self.seed.is_empty() {
            let storage = harness.open_storage().await?;
            for (conversation_id, rows) in &self.seed {
                storage.replace_conversation(conversation_id, rows).await;
            }
            storage.shutdown().await?;
        }
        Ok(harness)
    }
}

/// A temp directory with a database path inside it.
pub struct TestHarness {
    db_path: PathBuf,
    /// Temp directory kept alive for cleanup on drop.
    _temp_dir: tempfile::TempDir,
}

impl TestHarness {
    /// Create a new builder for configuring the test harness.
    pub fn builder() -> TestHarnessBuilder {
        TestHarnessBuilder::new()
    }

    pub fn db_path(&self) -> &Path {
        &self.db_path
    }

    /// A path under the temp directory that can never be opened as a
    /// database: its parent is a regular file.
    pub fn unopenable_path(&self) -> Result<PathBuf, MemoryError> {
        let blocker = self.db_path.with_extension("blocker");
        std::fs::write(&blocker, b"not a directory").map_err(MemoryError::storage)?;
        Ok(blocker.join("chat_memory.sqlite"))
    }

    /// Open and initialize a fresh SQLite adapter on the harness database.
    pub async fn open_storage(&self) -> Result<Arc<dyn StorageAdapter>, MemoryError> {
        let storage = SqliteStorage::new(&self.db_path);
        storage.initialize().await;
        if !storage.is_available() {
            return Err(MemoryError::Unavailable {
                backend: storage.name().to_string(),
            });
        }
        Ok(Arc::new(storage))
    }
}
