// SPDX-FileCopyrightText: 2026 BrowserOS Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Conversation registry operations.
//!
//! The synchronous helpers take a plain `rusqlite::Connection` so they can run
//! inside a transaction opened by the message queries.

use browseros_core::MemoryError;
use rusqlite::params;

use crate::database::Database;
use crate::models::ConversationRecord;

/// Insert the conversation or bump its `updated_at`.
pub(crate) fn upsert_conversation(
    conn: &rusqlite::Connection,
    conversation_id: &str,
    now_ms: i64,
) -> Result<(), rusqlite::Error> {
    let mut stmt = conn.prepare_cached(
        "INSERT INTO conversations (id, created_at, updated_at) VALUES (?1, ?2, ?2)
         ON CONFLICT(id) DO UPDATE SET updated_at = excluded.updated_at",
    )?;
    stmt.execute(params![conversation_id, now_ms])?;
    Ok(())
}

/// Remove the conversation record. Rows cascade.
pub(crate) fn delete_conversation(
    conn: &rusqlite::Connection,
    conversation_id: &str,
) -> Result<usize, rusqlite::Error> {
    let mut stmt = conn.prepare_cached("DELETE FROM conversations WHERE id = ?1")?;
    stmt.execute(params![conversation_id])
}

/// List every conversation, most recently updated first.
pub async fn list_conversations(db: &Database) -> Result<Vec<ConversationRecord>, MemoryError> {
    db.connection()
        .call(|conn| -> Result<Vec<ConversationRecord>, rusqlite::Error> {
            let mut stmt = conn.prepare_cached(
                "SELECT c.id, c.created_at, c.updated_at, COUNT(m.id)
                 FROM conversations c
                 LEFT JOIN chat_messages m ON m.conversation_id = c.id
                 GROUP BY c.id
                 ORDER BY c.updated_at DESC, c.id ASC",
            )?;
            let records = stmt
                .query_map([], |row| {
                    Ok(ConversationRecord {
                        id: row.get(0)?,
                        created_at: row.get(1)?,
                        updated_at: row.get(2)?,
                        message_count: row.get(3)?,
                    })
                })?
                .collect::<Result<Vec<_>, _>>()?;
            Ok(records)
        })
        .await
        .map_err(crate::database::map_tr_err)
}

/// Fetch one conversation record.
pub async fn get_conversation(
    db: &Database,
    conversation_id: &str,
) -> Result<Option<ConversationRecord>, MemoryError> {
    let conversation_id = conversation_id.to_string();
    db.connection()
        .call(move |conn| -> Result<Option<ConversationRecord>, rusqlite::Error> {
            let mut stmt = conn.prepare_cached(
                "SELECT c.id, c.created_at, c.updated_at,
                        (SELECT COUNT(*) FROM chat_messages m WHERE m.conversation_id = c.id)
                 FROM conversations c WHERE c.id = ?1",
            )?;
            let result = stmt.query_row(params![conversation_id], |row| {
                Ok(ConversationRecord {
                    id: row.get(0)?,
                    created_at: row.get(1)?,
                    updated_at: row.get(2)?,
                    message_count: row.get(3)?,
                })
            });
            match result {
                Ok(record) => Ok(Some(record)),
                Err(rusqlite::Error::QueryReturnedNoRows) => Ok(None),
                Err(e) => Err(e),
            }
        })
        .await
        .map_err(crate::database::map_tr_err)
}
