// SPDX-FileCopyrightText: 2026 BrowserOS Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Storage adapter trait for conversation persistence backends.

use async_trait::async_trait;

use crate::traits::adapter::PluginAdapter;
use crate::types::StoredMessageRow;

/// A backend that stores whole conversations as ordered row sets.
///
/// None of these operations return errors. Implementations log failures and
/// degrade: `initialize` failures show up through [`is_available`], write
/// failures leave the previously committed rows untouched, and read failures
/// return an empty list.
///
/// [`is_available`]: StorageAdapter::is_available
#[async_trait]
pub trait StorageAdapter: PluginAdapter {
    /// Acquires or creates the backing store. Safe to call more than once.
    async fn initialize(&self);

    /// True once the backend initialized successfully and is usable.
    fn is_available(&self) -> bool;

    /// Atomically replaces every row of `conversation_id` with `rows`, in order.
    async fn replace_conversation(&self, conversation_id: &str, rows: &[StoredMessageRow]);

    /// Returns the rows of `conversation_id` ordered by ascending sequence.
    async fn get_messages(&self, conversation_id: &str) -> Vec<StoredMessageRow>;

    /// Deletes every row and the conversation record of `conversation_id`.
    async fn clear_conversation(&self, conversation_id: &str);
}
