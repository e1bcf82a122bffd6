// SPDX-FileCopyrightText: 2026 BrowserOS Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Row types stored by the backends.

use serde::Serialize;

pub use browseros_core::types::StoredMessageRow;

/// A conversation registry entry with its current row count.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ConversationRecord {
    pub id: String,
    /// Milliseconds since the Unix epoch.
    pub created_at: i64,
    /// Milliseconds since the Unix epoch, bumped on every replace.
    pub updated_at: i64,
    pub message_count: i64,
}
