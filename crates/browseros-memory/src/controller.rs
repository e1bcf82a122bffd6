// SPDX-FileCopyrightText: 2026 BrowserOS Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Chat memory that mirrors its message pipeline into a storage backend.
//!
//! On construction the stored conversation is replayed through the pipeline.
//! After that every mutation rewrites the whole conversation, so the backend
//! always holds exactly the pipeline's current list.

use std::path::{Path, PathBuf};
use std::sync::Arc;

use browseros_config::ChatMemoryConfig;
use browseros_core::types::Message;
use browseros_core::{MemoryError, StorageAdapter};
use browseros_storage::{InMemoryStorage, SqliteStorage};
use tracing::{debug, info, warn};

use crate::codec;
use crate::history::{MessageHistory, MessagePipeline};

/// Opens the durable backend for a database path.
///
/// Returning `None` means no durable backend exists in this build or
/// environment; the controller then runs on transient storage.
pub type DurableFactory = fn(&Path) -> Option<Arc<dyn StorageAdapter>>;

/// The default [`DurableFactory`]: SQLite at `path`.
pub fn sqlite_factory(path: &Path) -> Option<Arc<dyn StorageAdapter>> {
    let storage: Arc<dyn StorageAdapter> = Arc::new(SqliteStorage::new(path));
    Some(storage)
}

/// Whether mutations are currently written through to storage.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Mode {
    /// Mutations are persisted.
    Live,
    /// Stored rows are being replayed; nothing is written back.
    Restoring,
}

/// Builder for [`ChatMemory`].
pub struct ChatMemoryBuilder {
    config: ChatMemoryConfig,
    conversation_id: Option<String>,
    database_path: Option<PathBuf>,
    storage: Option<Arc<dyn StorageAdapter>>,
    durable_factory: DurableFactory,
}

impl ChatMemoryBuilder {
    pub fn new(config: ChatMemoryConfig) -> Self {
        Self {
            config,
            conversation_id: None,
            database_path: None,
            storage: None,
            durable_factory: sqlite_factory,
        }
    }

    /// Builder seeded from the config files and `BROWSEROS_*` environment.
    ///
    /// Configuration that fails to load is logged and replaced by defaults.
    pub fn from_env() -> Self {
        let config = match browseros_config::load_config() {
            Ok(config) => config.chat_memory,
            Err(e) => {
                warn!(error = %e, "failed to load chat memory configuration, using defaults");
                ChatMemoryConfig::default()
            }
        };
        Self::new(config)
    }

    /// Overrides the configured conversation id.
    pub fn conversation_id(mut self, id: impl Into<String>) -> Self {
        self.conversation_id = Some(id.into());
        self
    }

    /// Overrides the configured database path.
    pub fn database_path(mut self, path: impl Into<PathBuf>) -> Self {
        self.database_path = Some(path.into());
        self
    }

    /// Use this adapter instead of opening the durable backend.
    pub fn storage(mut self, storage: Arc<dyn StorageAdapter>) -> Self {
        self.storage = Some(storage);
        self
    }

    pub fn durable_factory(mut self, factory: DurableFactory) -> Self {
        self.durable_factory = factory;
        self
    }

    /// Build with a [`MessageHistory`] sized from the configured token budget.
    pub async fn build(self) -> ChatMemory<MessageHistory> {
        let pipeline = MessageHistory::new(self.config.max_tokens);
        self.build_with(pipeline).await
    }

    /// Build around a caller-supplied pipeline.
    ///
    /// Never fails: an unusable backend is replaced by transient storage and
    /// a bad stored row ends the replay early.
    pub async fn build_with<P: MessagePipeline>(self, pipeline: P) -> ChatMemory<P> {
        let conversation_id = self
            .conversation_id
            .clone()
            .unwrap_or_else(|| self.config.conversation_id());
        let storage = self.resolve_storage().await;

        let mut memory = ChatMemory {
            pipeline,
            storage,
            conversation_id,
            mode: Mode::Live,
        };
        memory.restore().await;
        memory
    }

    async fn resolve_storage(self) -> Arc<dyn StorageAdapter> {
        let candidate = match self.storage {
            Some(storage) => Some(storage),
            None => {
                let path = self
                    .database_path
                    .unwrap_or_else(|| self.config.database_path());
                let opened = (self.durable_factory)(&path);
                if opened.is_none() {
                    warn!(
                        path = %path.display(),
                        "durable chat storage is not available in this build"
                    );
                }
                opened
            }
        };

        if let Some(storage) = candidate {
            storage.initialize().await;
            if storage.is_available() {
                debug!(backend = storage.name(), "chat storage ready");
                return storage;
            }
            warn!(
                backend = storage.name(),
                "chat storage unavailable, falling back to in-memory storage"
            );
        }
        Arc::new(InMemoryStorage::new())
    }
}

/// A message pipeline whose contents survive restarts.
///
/// Reads go straight to the pipeline. Each mutation first runs the pipeline
/// primitive, then rewrites the stored conversation from the resulting list.
pub struct ChatMemory<P: MessagePipeline = MessageHistory> {
    pipeline: P,
    storage: Arc<dyn StorageAdapter>,
    conversation_id: String,
    mode: Mode,
}

impl ChatMemory<MessageHistory> {
    pub fn builder(config: ChatMemoryConfig) -> ChatMemoryBuilder {
        ChatMemoryBuilder::new(config)
    }
}

impl<P: MessagePipeline> ChatMemory<P> {
    pub async fn add(&mut self, message: Message, position: Option<usize>) {
        self.pipeline.add(message, position);
        self.persist().await;
    }

    /// Removes the newest message. Returns false when there was none.
    pub async fn remove_last(&mut self) -> bool {
        let removed = self.pipeline.remove_last();
        self.persist().await;
        removed
    }

    pub async fn clear(&mut self) {
        self.pipeline.clear();
        if self.mode == Mode::Live {
            self.storage.clear_conversation(&self.conversation_id).await;
        }
    }

    pub async fn set_max_tokens(&mut self, max_tokens: usize) {
        self.pipeline.set_max_tokens(max_tokens);
        self.persist().await;
    }

    pub fn messages(&self) -> &[Message] {
        self.pipeline.messages()
    }

    pub fn conversation_id(&self) -> &str {
        &self.conversation_id
    }

    pub fn storage(&self) -> &Arc<dyn StorageAdapter> {
        &self.storage
    }

    pub fn mode(&self) -> Mode {
        self.mode
    }

    pub fn pipeline(&self) -> &P {
        &self.pipeline
    }

    /// Flushes and releases the storage backend.
    pub async fn shutdown(&self) -> Result<(), MemoryError> {
        self.storage.shutdown().await
    }

    async fn persist(&self) {
        if self.mode == Mode::Restoring {
            return;
        }
        let now_ms = chrono::Utc::now().timestamp_millis();
        let rows = codec::encode_all(self.pipeline.messages(), now_ms);
        self.storage
            .replace_conversation(&self.conversation_id, &rows)
            .await;
    }

    async fn restore(&mut self) {
        self.mode = Mode::Restoring;
        let rows = self.storage.get_messages(&self.conversation_id).await;
        let total = rows.len();
        let mut restored = 0usize;
        for row in &rows {
            match codec::decode_row(row) {
                Ok(message) => {
                    self.pipeline.add(message, None);
                    restored += 1;
                }
                Err(e) => {
                    warn!(
                        conversation_id = %self.conversation_id,
                        sequence = row.sequence,
                        error = %e,
                        "failed to restore message, stopping restore"
                    );
                    break;
                }
            }
        }
        self.mode = Mode::Live;
        if total > 0 {
            info!(
                conversation_id = %self.conversation_id,
                backend = self.storage.name(),
                restored,
                stored = total,
                "restored chat history"
            );
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn config() -> ChatMemoryConfig {
        ChatMemoryConfig::default()
    }

    #[tokio::test]
    async fn builder_option_overrides_configured_id() {
        let configured = ChatMemoryConfig {
            conversation_id: Some("from-config".into()),
            ..ChatMemoryConfig::default()
        };
        let memory = ChatMemory::builder(configured.clone())
            .storage(Arc::new(InMemoryStorage::new()))
            .build()
            .await;
        assert_eq!(memory.conversation_id(), "from-config");

        let memory = ChatMemory::builder(configured)
            .conversation_id("explicit")
            .storage(Arc::new(InMemoryStorage::new()))
            .build()
            .await;
        assert_eq!(memory.conversation_id(), "explicit");
    }

    #[tokio::test]
    async fn default_conversation_id() {
        let memory = ChatMemory::builder(config())
            .durable_factory(|_| None)
            .build()
            .await;
        assert_eq!(memory.conversation_id(), "default");
        assert_eq!(memory.storage().name(), "memory");
        assert_eq!(memory.mode(), Mode::Live);
    }

    #[tokio::test]
    async fn configured_budget_sizes_history() {
        let memory = ChatMemory::builder(ChatMemoryConfig {
            max_tokens: 64,
            ..ChatMemoryConfig::default()
        })
        .durable_factory(|_| None)
        .build()
        .await;
        assert_eq!(memory.pipeline().max_tokens(), 64);
    }

    #[tokio::test]
    async fn mutations_write_through() {
        let storage = Arc::new(InMemoryStorage::new());
        let mut memory = ChatMemory::builder(config())
            .conversation_id("c")
            .storage(storage.clone())
            .build()
            .await;

        memory.add(Message::human("b"), None).await;
        memory.add(Message::system("a"), Some(0)).await;
        let rows = storage.get_messages("c").await;
        assert_eq!(
            rows.iter().map(|r| r.role.as_str()).collect::<Vec<_>>(),
            ["system", "human"]
        );

        assert!(memory.remove_last().await);
        assert_eq!(storage.get_messages("c").await.len(), 1);

        memory.clear().await;
        assert!(storage.get_messages("c").await.is_empty());
        assert!(!memory.remove_last().await);
    }

    #[tokio::test]
    async fn shrinking_budget_rewrites_storage() {
        let storage = Arc::new(InMemoryStorage::new());
        let mut memory = ChatMemory::builder(config())
            .storage(storage.clone())
            .build()
            .await;
        for _ in 0..4 {
            memory.add(Message::human("x".repeat(40).as_str()), None).await;
        }
        memory.set_max_tokens(10).await;

        assert_eq!(memory.messages().len(), 1);
        assert_eq!(storage.get_messages("default").await.len(), 1);
    }
}
