// SPDX-FileCopyrightText: 2026 BrowserOS Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Mapping between [`Message`] and the flat [`StoredMessageRow`] format.
//!
//! Kind-specific fields travel in the row's `metadata` object under camelCase
//! keys. Keys are only written when they carry something, so a plain human
//! message is stored with no metadata at all.

use serde::de::DeserializeOwned;
use serde::Serialize;
use serde_json::{Map, Value};
use tracing::{debug, warn};

use browseros_core::types::{
    AiMessage, BaseMessage, InvalidToolCall, Message, MessageContent, MessageKind,
    StoredMessageRow, ToolCall, ToolMessage, UsageMetadata,
};
use browseros_core::MemoryError;

const CONTENT_IS_JSON: &str = "contentIsJson";
const ADDITIONAL_KWARGS: &str = "additionalKwargs";
const TOOL_CALL_ID: &str = "toolCallId";
const STATUS: &str = "status";
const ARTIFACT: &str = "artifact";
const TOOL_METADATA: &str = "toolMetadata";
const TOOL_CALLS: &str = "toolCalls";
const INVALID_TOOL_CALLS: &str = "invalidToolCalls";
const USAGE_METADATA: &str = "usageMetadata";

/// Serialize one message into a row at `sequence`.
pub fn encode_message(message: &Message, sequence: i64, created_at: i64) -> StoredMessageRow {
    // Typed fields overwrite any carried-over key of the same name.
    let mut meta = message.extra().clone();

    let content = match message.content() {
        MessageContent::Text(text) => text.clone(),
        MessageContent::Structured(value) => match serde_json::to_string(value) {
            Ok(json) => {
                meta.insert(CONTENT_IS_JSON.into(), Value::Bool(true));
                json
            }
            Err(e) => {
                warn!(
                    sequence,
                    error = %e,
                    "failed to encode structured content, storing debug text"
                );
                format!("{value:?}")
            }
        },
    };

    put_map(&mut meta, ADDITIONAL_KWARGS, message.additional_kwargs());

    match message {
        Message::Tool(tool) => {
            if !tool.tool_call_id.is_empty() {
                meta.insert(TOOL_CALL_ID.into(), Value::String(tool.tool_call_id.clone()));
            }
            if let Some(status) = &tool.status {
                meta.insert(STATUS.into(), Value::String(status.clone()));
            }
            if let Some(artifact) = &tool.artifact {
                meta.insert(ARTIFACT.into(), artifact.clone());
            }
            put_map(&mut meta, TOOL_METADATA, &tool.metadata);
        }
        Message::Ai(ai) => {
            put_list(&mut meta, TOOL_CALLS, &ai.tool_calls, sequence);
            put_list(&mut meta, INVALID_TOOL_CALLS, &ai.invalid_tool_calls, sequence);
            if let Some(usage) = &ai.usage_metadata {
                put_value(&mut meta, USAGE_METADATA, usage, sequence);
            }
        }
        Message::System(_)
        | Message::Human(_)
        | Message::BrowserState(_)
        | Message::TodoList(_) => {}
    }

    StoredMessageRow {
        role: message.kind().to_string(),
        content,
        sequence,
        created_at,
        metadata: (!meta.is_empty()).then_some(meta),
    }
}

/// Serialize a whole conversation; sequences are the list positions.
pub fn encode_all(messages: &[Message], created_at: i64) -> Vec<StoredMessageRow> {
    messages
        .iter()
        .enumerate()
        .map(|(index, message)| encode_message(message, index as i64, created_at))
        .collect()
}

fn put_map(meta: &mut Map<String, Value>, key: &str, map: &Map<String, Value>) {
    if !map.is_empty() {
        meta.insert(key.into(), Value::Object(map.clone()));
    }
}

fn put_list<T: Serialize>(meta: &mut Map<String, Value>, key: &str, items: &[T], sequence: i64) {
    if !items.is_empty() {
        put_value(meta, key, items, sequence);
    }
}

fn put_value<T: Serialize + ?Sized>(
    meta: &mut Map<String, Value>,
    key: &str,
    value: &T,
    sequence: i64,
) {
    match serde_json::to_value(value) {
        Ok(value) => {
            meta.insert(key.into(), value);
        }
        Err(e) => {
            warn!(sequence, key, error = %e, "failed to encode row metadata field, dropping it")
        }
    }
}

/// Rebuild a message from a stored row.
///
/// Rows with an unrecognized role are restored as AI messages. Each metadata
/// field is read on its own: a value of the wrong type is kept untouched with
/// the message's uninterpreted metadata and written back on the next save.
/// Only a tool-call list that cannot be read fails the row.
pub fn decode_row(row: &StoredMessageRow) -> Result<Message, MemoryError> {
    let mut meta = row.metadata.clone().unwrap_or_default();

    let content_is_json = meta.get(CONTENT_IS_JSON) == Some(&Value::Bool(true));
    if content_is_json {
        meta.remove(CONTENT_IS_JSON);
    }
    let content = decode_content(row, content_is_json);

    let kind = row.role.parse::<MessageKind>().unwrap_or_else(|_| {
        debug!(role = %row.role, sequence = row.sequence, "unknown role, restoring as ai");
        MessageKind::Ai
    });

    let additional_kwargs = take_lenient(&mut meta, ADDITIONAL_KWARGS, row).unwrap_or_default();

    let message = match kind {
        MessageKind::System => Message::System(base(content, additional_kwargs, meta)),
        MessageKind::Human => Message::Human(base(content, additional_kwargs, meta)),
        MessageKind::BrowserState => {
            Message::BrowserState(base(as_plain_text(content), additional_kwargs, meta))
        }
        MessageKind::TodoList => {
            Message::TodoList(base(as_plain_text(content), additional_kwargs, meta))
        }
        MessageKind::Tool => {
            let tool_call_id = take_lenient(&mut meta, TOOL_CALL_ID, row).unwrap_or_default();
            let status = take_lenient(&mut meta, STATUS, row);
            let artifact = meta.remove(ARTIFACT);
            let metadata = take_lenient(&mut meta, TOOL_METADATA, row).unwrap_or_default();
            Message::Tool(ToolMessage {
                content,
                tool_call_id,
                status,
                artifact,
                metadata,
                additional_kwargs,
                extra: meta,
            })
        }
        MessageKind::Ai => {
            let tool_calls: Vec<ToolCall> = take_strict(&mut meta, TOOL_CALLS, row)?;
            let invalid_tool_calls: Vec<InvalidToolCall> =
                take_strict(&mut meta, INVALID_TOOL_CALLS, row)?;
            let usage_metadata: Option<UsageMetadata> =
                take_lenient(&mut meta, USAGE_METADATA, row);
            Message::Ai(AiMessage {
                content,
                tool_calls,
                invalid_tool_calls,
                usage_metadata,
                additional_kwargs,
                extra: meta,
            })
        }
    };
    Ok(message)
}

fn base(
    content: impl Into<MessageContent>,
    additional_kwargs: Map<String, Value>,
    extra: Map<String, Value>,
) -> BaseMessage {
    BaseMessage {
        content: content.into(),
        additional_kwargs,
        extra,
    }
}

/// Removes and returns `key` when it has the expected type. Otherwise the raw
/// value stays in `meta`.
fn take_lenient<T: DeserializeOwned>(
    meta: &mut Map<String, Value>,
    key: &str,
    row: &StoredMessageRow,
) -> Option<T> {
    let value = meta.get(key)?;
    match T::deserialize(value) {
        Ok(parsed) => {
            meta.remove(key);
            Some(parsed)
        }
        Err(e) => {
            debug!(
                sequence = row.sequence,
                key,
                error = %e,
                "metadata field has an unexpected type, carrying it over as-is"
            );
            None
        }
    }
}

fn take_strict<T: DeserializeOwned + Default>(
    meta: &mut Map<String, Value>,
    key: &str,
    row: &StoredMessageRow,
) -> Result<T, MemoryError> {
    match meta.remove(key) {
        Some(value) => serde_json::from_value(value).map_err(|e| MemoryError::Codec {
            message: format!("malformed `{key}` on row {} ({})", row.sequence, row.role),
            source: Some(e),
        }),
        None => Ok(T::default()),
    }
}

fn decode_content(row: &StoredMessageRow, content_is_json: bool) -> MessageContent {
    if !content_is_json || row.content.is_empty() {
        return MessageContent::Text(row.content.clone());
    }
    match serde_json::from_str::<Value>(&row.content) {
        Ok(value) => MessageContent::Structured(value),
        Err(e) => {
            debug!(
                sequence = row.sequence,
                error = %e,
                "flagged JSON content did not parse, keeping raw text"
            );
            MessageContent::Text(row.content.clone())
        }
    }
}

// Browser state and todo lists are text-only kinds.
fn as_plain_text(content: MessageContent) -> String {
    match content {
        MessageContent::Text(text) => text,
        MessageContent::Structured(value) => value.to_string(),
    }
}
