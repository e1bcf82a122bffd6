// SPDX-FileCopyrightText: 2026 BrowserOS Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Database connection management with PRAGMA setup, WAL mode, and lifecycle.
//!
//! All statements are serialized through tokio-rusqlite's single background
//! thread. The [`Database`] struct IS the single writer: query modules accept
//! `&Database` and go through [`Database::connection`]. Do NOT create
//! additional Connection instances for writes.

use std::path::Path;
use std::time::Duration;

use browseros_core::MemoryError;
use tokio_rusqlite::Connection;
use tracing::debug;

use crate::migrations;

/// An open, migrated SQLite database.
pub struct Database {
    conn: Connection,
}

impl Database {
    /// Opens (creating if needed) the database file at `path`.
    ///
    /// Missing parent directories are created. The connection is switched to
    /// WAL journaling with foreign keys enforced, then migrated. Any failure
    /// along the way (uncreatable directory, permission denied, a file that
    /// is not a SQLite database) is returned as an error.
    pub async fn open(path: &Path) -> Result<Self, MemoryError> {
        if let Some(parent) = path.parent()
            && !parent.as_os_str().is_empty()
        {
            tokio::fs::create_dir_all(parent)
                .await
                .map_err(MemoryError::storage)?;
        }

        let conn = Connection::open(path)
            .await
            .map_err(|e| MemoryError::Storage {
                source: Box::new(e),
            })?;
        let db = Self { conn };
        db.configure().await?;
        debug!(path = %path.display(), "chat memory database opened");
        Ok(db)
    }

    /// Opens a private in-memory database with the same schema.
    pub async fn open_in_memory() -> Result<Self, MemoryError> {
        let conn = Connection::open_in_memory()
            .await
            .map_err(|e| MemoryError::Storage {
                source: Box::new(e),
            })?;
        let db = Self { conn };
        db.configure().await?;
        Ok(db)
    }

    async fn configure(&self) -> Result<(), MemoryError> {
        let journal_mode = self
            .conn
            .call(|conn| -> Result<String, rusqlite::Error> {
                let mode = conn.pragma_update_and_check(None, "journal_mode", "WAL", |row| {
                    row.get::<_, String>(0)
                })?;
                conn.pragma_update(None, "foreign_keys", "ON")?;
                conn.busy_timeout(Duration::from_secs(5))?;
                Ok(mode)
            })
            .await
            .map_err(map_tr_err)?;
        debug!(journal_mode = %journal_mode, "database pragmas applied");

        self.conn
            .call(|conn| migrations::run_migrations(conn))
            .await
            .map_err(|e| match e {
                tokio_rusqlite::Error::Error(inner) => inner,
                other => MemoryError::Internal(other.to_string()),
            })
    }

    /// Returns the shared connection handle.
    pub fn connection(&self) -> &Connection {
        &self.conn
    }

    /// Checkpoints the WAL into the main database file.
    pub async fn checkpoint(&self) -> Result<(), MemoryError> {
        self.conn
            .call(|conn| -> Result<(), rusqlite::Error> {
                conn.query_row("PRAGMA wal_checkpoint(TRUNCATE)", [], |_| Ok(()))
            })
            .await
            .map_err(map_tr_err)
    }

    /// Checkpoints and closes the connection.
    pub async fn close(self) -> Result<(), MemoryError> {
        self.checkpoint().await?;
        self.conn.close().await.map_err(map_tr_err)
    }
}

/// Converts a tokio-rusqlite error into [`MemoryError::Storage`].
pub fn map_tr_err(e: tokio_rusqlite::Error<rusqlite::Error>) -> MemoryError {
    MemoryError::Storage {
        source: Box::new(e),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    async fn table_names(db: &Database) -> Vec<String> {
        db.connection()
            .call(|conn| -> Result<Vec<String>, rusqlite::Error> {
                let mut stmt = conn.prepare(
                    "SELECT name FROM sqlite_master WHERE type IN ('table', 'index') ORDER BY name",
                )?;
                let names = stmt
                    .query_map([], |row| row.get(0))?
                    .collect::<Result<Vec<String>, _>>()?;
                Ok(names)
            })
            .await
            .unwrap()
    }

    #[tokio::test]
    async fn open_creates_schema_and_parent_dirs() {
        let dir = tempdir().unwrap();
        let db_path = dir.path().join("nested").join("deeper").join("chat.sqlite");

        let db = Database::open(&db_path).await.unwrap();
        assert!(db_path.exists());

        let names = table_names(&db).await;
        assert!(names.contains(&"conversations".to_string()));
        assert!(names.contains(&"chat_messages".to_string()));
        assert!(names.contains(&"idx_chat_messages_conversation_sequence".to_string()));

        db.close().await.unwrap();
    }

    #[tokio::test]
    async fn open_enables_wal_and_foreign_keys() {
        let dir = tempdir().unwrap();
        let db = Database::open(&dir.path().join("pragmas.sqlite")).await.unwrap();

        let (mode, fk) = db
            .connection()
            .call(|conn| -> Result<(String, i64), rusqlite::Error> {
                let mode = conn.query_row("PRAGMA journal_mode", [], |row| row.get(0))?;
                let fk = conn.query_row("PRAGMA foreign_keys", [], |row| row.get(0))?;
                Ok((mode, fk))
            })
            .await
            .unwrap();
        assert_eq!(mode.to_lowercase(), "wal");
        assert_eq!(fk, 1);

        db.close().await.unwrap();
    }

    #[tokio::test]
    async fn reopening_existing_database_is_harmless() {
        let dir = tempdir().unwrap();
        let db_path = dir.path().join("reopen.sqlite");

        Database::open(&db_path).await.unwrap().close().await.unwrap();
        let db = Database::open(&db_path).await.unwrap();
        assert!(table_names(&db).await.contains(&"chat_messages".to_string()));
    }

    #[tokio::test]
    async fn open_fails_on_corrupt_file() {
        let dir = tempdir().unwrap();
        let db_path = dir.path().join("corrupt.sqlite");
        std::fs::write(&db_path, vec![b'x'; 4096]).unwrap();

        assert!(Database::open(&db_path).await.is_err());
    }

    #[tokio::test]
    async fn open_fails_when_parent_is_a_file() {
        let dir = tempdir().unwrap();
        let blocker = dir.path().join("blocker");
        std::fs::write(&blocker, b"x").unwrap();

        let result = Database::open(&blocker.join("chat.sqlite")).await;
        assert!(matches!(result, Err(MemoryError::Storage { .. })));
    }
}
