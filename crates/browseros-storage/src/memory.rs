// SPDX-FileCopyrightText: 2026 BrowserOS Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Process-lifetime storage used when the durable backend is unavailable.

use std::collections::HashMap;

use async_trait::async_trait;
use tokio::sync::RwLock;

use browseros_core::types::StoredMessageRow;
use browseros_core::{HealthStatus, MemoryError, PluginAdapter, StorageAdapter};

/// In-memory storage. Always available.
///
/// Rows are cloned on the way in and on the way out, so callers can never
/// mutate what is stored.
#[derive(Default)]
pub struct InMemoryStorage {
    conversations: RwLock<HashMap<String, Vec<StoredMessageRow>>>,
}

impl InMemoryStorage {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl PluginAdapter for InMemoryStorage {
    fn name(&self) -> &str {
        "memory"
    }

    fn version(&self) -> semver::Version {
        semver::Version::new(0, 1, 0)
    }

    async fn health_check(&self) -> Result<HealthStatus, MemoryError> {
        Ok(HealthStatus::Healthy)
    }

    async fn shutdown(&self) -> Result<(), MemoryError> {
        Ok(())
    }
}

#[async_trait]
impl StorageAdapter for InMemoryStorage {
    async fn initialize(&self) {}

    fn is_available(&self) -> bool {
        true
    }

    async fn replace_conversation(&self, conversation_id: &str, rows: &[StoredMessageRow]) {
        self.conversations
            .write()
            .await
            .insert(conversation_id.to_string(), rows.to_vec());
    }

    async fn get_messages(&self, conversation_id: &str) -> Vec<StoredMessageRow> {
        let mut rows = self
            .conversations
            .read()
            .await
            .get(conversation_id)
            .cloned()
            .unwrap_or_default();
        rows.sort_by_key(|row| row.sequence);
        rows
    }

    async fn clear_conversation(&self, conversation_id: &str) {
        self.conversations.write().await.remove(conversation_id);
    }
}
