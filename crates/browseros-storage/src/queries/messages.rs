// SPDX-FileCopyrightText: 2026 BrowserOS Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Message row operations.
//!
//! A conversation is always written as a whole: the existing rows are
//! deleted and the new set inserted inside one transaction, so readers see
//! either the previous set or the new one.

use browseros_core::MemoryError;
use rusqlite::params;
use serde_json::{Map, Value};
use tracing::warn;

use crate::database::Database;
use crate::models::StoredMessageRow;
use crate::queries::conversations::{delete_conversation, upsert_conversation};

/// A row with its metadata already encoded as JSON text.
struct EncodedRow {
    role: String,
    content: String,
    metadata: Option<String>,
    sequence: i64,
    created_at: i64,
}

/// Replace every row of `conversation_id` with `rows`, in one transaction.
pub async fn replace_conversation(
    db: &Database,
    conversation_id: &str,
    rows: &[StoredMessageRow],
    now_ms: i64,
) -> Result<(), MemoryError> {
    let encoded = rows
        .iter()
        .map(|row| {
            let metadata = row
                .metadata
                .as_ref()
                .map(serde_json::to_string)
                .transpose()?;
            Ok(EncodedRow {
                role: row.role.clone(),
                content: row.content.clone(),
                metadata,
                sequence: row.sequence,
                created_at: row.created_at,
            })
        })
        .collect::<Result<Vec<_>, serde_json::Error>>()
        .map_err(|e| MemoryError::Codec {
            message: "failed to encode row metadata".into(),
            source: Some(e),
        })?;

    let conversation_id = conversation_id.to_string();
    db.connection()
        .call(move |conn| -> Result<(), rusqlite::Error> {
            let tx = conn.transaction()?;
            upsert_conversation(&tx, &conversation_id, now_ms)?;
            tx.prepare_cached("DELETE FROM chat_messages WHERE conversation_id = ?1")?
                .execute(params![conversation_id])?;
            {
                let mut insert = tx.prepare_cached(
                    "INSERT INTO chat_messages
                        (conversation_id, role, content, metadata, sequence, created_at)
                     VALUES (?1, ?2, ?3, ?4, ?5, ?6)",
                )?;
                for row in &encoded {
                    insert.execute(params![
                        conversation_id,
                        row.role,
                        row.content,
                        row.metadata,
                        row.sequence,
                        row.created_at,
                    ])?;
                }
            }
            tx.commit()
        })
        .await
        .map_err(crate::database::map_tr_err)
}

/// Get the rows of a conversation ordered by sequence.
///
/// A row whose metadata is not a valid JSON object is returned with
/// `metadata = None` rather than failing the whole read.
pub async fn get_messages(
    db: &Database,
    conversation_id: &str,
) -> Result<Vec<StoredMessageRow>, MemoryError> {
    let lookup_id = conversation_id.to_string();
    let raw = db
        .connection()
        .call(move |conn| -> Result<Vec<RawRow>, rusqlite::Error> {
            let mut stmt = conn.prepare_cached(
                "SELECT role, content, metadata, sequence, created_at
                 FROM chat_messages WHERE conversation_id = ?1
                 ORDER BY sequence ASC",
            )?;
            let rows = stmt
                .query_map(params![lookup_id], |row| {
                    Ok(RawRow {
                        role: row.get(0)?,
                        content: row.get(1)?,
                        metadata: row.get(2)?,
                        sequence: row.get(3)?,
                        created_at: row.get(4)?,
                    })
                })?
                .collect::<Result<Vec<_>, _>>()?;
            Ok(rows)
        })
        .await
        .map_err(crate::database::map_tr_err)?;

    Ok(raw
        .into_iter()
        .map(|row| StoredMessageRow {
            metadata: decode_metadata(conversation_id, row.sequence, row.metadata),
            role: row.role,
            content: row.content,
            sequence: row.sequence,
            created_at: row.created_at,
        })
        .collect())
}

/// Delete the rows and the registry entry of a conversation, in one transaction.
pub async fn clear_conversation(db: &Database, conversation_id: &str) -> Result<(), MemoryError> {
    let conversation_id = conversation_id.to_string();
    db.connection()
        .call(move |conn| -> Result<(), rusqlite::Error> {
            let tx = conn.transaction()?;
            tx.prepare_cached("DELETE FROM chat_messages WHERE conversation_id = ?1")?
                .execute(params![conversation_id])?;
            delete_conversation(&tx, &conversation_id)?;
            tx.commit()
        })
        .await
        .map_err(crate::database::map_tr_err)
}

struct RawRow {
    role: String,
    content: String,
    metadata: Option<String>,
    sequence: i64,
    created_at: i64,
}

fn decode_metadata(
    conversation_id: &str,
    sequence: i64,
    raw: Option<String>,
) -> Option<Map<String, Value>> {
    let raw = raw?;
    match serde_json::from_str::<Value>(&raw) {
        Ok(Value::Object(map)) => Some(map),
        Ok(_) => {
            warn!(conversation_id, sequence, "row metadata is not a JSON object, ignoring it");
            None
        }
        Err(e) => {
            warn!(
                conversation_id,
                sequence,
                error = %e,
                "failed to decode row metadata, ignoring it"
            );
            None
        }
    }
}
