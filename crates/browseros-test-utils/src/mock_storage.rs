// SPDX-FileCopyrightText: 2026 BrowserOS Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Storage adapters for observing and breaking persistence in tests.

use std::sync::atomic::{AtomicUsize, Ordering};

use async_trait::async_trait;

use browseros_core::types::{HealthStatus, StoredMessageRow};
use browseros_core::{MemoryError, PluginAdapter, StorageAdapter};
use browseros_storage::InMemoryStorage;

/// In-memory storage that counts every write it receives.
///
/// [`seed`](RecordingStorage::seed) stores rows without counting, so a test
/// can prepare a conversation and then assert that restoring it wrote nothing.
#[derive(Default)]
pub struct RecordingStorage {
    inner: InMemoryStorage,
    replaces: AtomicUsize,
    clears: AtomicUsize,
}

impl RecordingStorage {
    pub fn new() -> Self {
        Self::default()
    }

    /// Store rows directly, bypassing the write counters.
    pub async fn seed(&self, conversation_id: &str, rows: &[StoredMessageRow]) {
        self.inner.replace_conversation(conversation_id, rows).await;
    }

    /// Number of `replace_conversation` calls so far.
    pub fn replace_count(&self) -> usize {
        self.replaces.load(Ordering::SeqCst)
    }

    /// Number of `clear_conversation` calls so far.
    pub fn clear_count(&self) -> usize {
        self.clears.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl PluginAdapter for RecordingStorage {
    fn name(&self) -> &str {
        "recording"
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
impl StorageAdapter for RecordingStorage {
    async fn initialize(&self) {}

    fn is_available(&self) -> bool {
        true
    }

    async fn replace_conversation(&self, conversation_id: &str, rows: &[StoredMessageRow]) {
        self.replaces.fetch_add(1, Ordering::SeqCst);
        self.inner.replace_conversation(conversation_id, rows).await;
    }

    async fn get_messages(&self, conversation_id: &str) -> Vec<StoredMessageRow> {
        self.inner.get_messages(conversation_id).await
    }

    async fn clear_conversation(&self, conversation_id: &str) {
        self.clears.fetch_add(1, Ordering::SeqCst);
        self.inner.clear_conversation(conversation_id).await;
    }
}

/// A backend whose initialization always fails.
#[derive(Default)]
pub struct FailingStorage {
    init_attempts: AtomicUsize,
}

impl FailingStorage {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn init_attempts(&self) -> usize {
        self.init_attempts.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl PluginAdapter for FailingStorage {
    fn name(&self) -> &str {
        "failing"
    }

    fn version(&self) -> semver::Version {
        semver::Version::new(0, 1, 0)
    }

    async fn health_check(&self) -> Result<HealthStatus, MemoryError> {
        Ok(HealthStatus::Unhealthy("never initialized".into()))
    }

    async fn shutdown(&self) -> Result<(), MemoryError> {
        Ok(())
    }
}

#[async_trait]
impl StorageAdapter for FailingStorage {
    async fn initialize(&self) {
        self.init_attempts.fetch_add(1, Ordering::SeqCst);
        tracing::warn!("failing storage refused to initialize");
    }

    fn is_available(&self) -> bool {
        false
    }

    async fn replace_conversation(&self, _conversation_id: &str, _rows: &[StoredMessageRow]) {}

    async fn get_messages(&self, _conversation_id: &str) -> Vec<StoredMessageRow> {
        Vec::new()
    }

    async fn clear_conversation(&self, _conversation_id: &str) {}
}
