// SPDX-FileCopyrightText: 2026 BrowserOS Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! `browseros status` and `browseros list`.
//!
//! Both talk to the SQLite backend directly: they report on the durable
//! store itself, including when it cannot be opened.

use std::io::IsTerminal;

use browseros_config::BrowserOsConfig;
use browseros_core::{HealthStatus, MemoryError, PluginAdapter, StorageAdapter};
use browseros_memory::codec;
use browseros_storage::{ConversationRecord, SqliteStorage};
use colored::Colorize;
use serde::Serialize;

use crate::Target;

/// Structured status output for `--json` mode.
#[derive(Debug, Serialize)]
pub struct StatusResponse {
    pub backend: String,
    pub available: bool,
    pub health: String,
    pub database_path: String,
    pub conversation_id: String,
    pub messages: usize,
    pub estimated_tokens: usize,
    pub max_tokens: usize,
    pub conversations: usize,
    /// Time of the conversation's last write, absent if never written.
    pub last_updated: Option<String>,
}

fn describe_health(health: &HealthStatus) -> String {
    match health {
        HealthStatus::Healthy => "healthy".to_string(),
        HealthStatus::Degraded(reason) => format!("degraded: {reason}"),
        HealthStatus::Unhealthy(reason) => format!("unhealthy: {reason}"),
    }
}

/// Run `browseros status`.
pub async fn run_status(
    config: &BrowserOsConfig,
    target: &Target,
    json: bool,
    plain: bool,
) -> Result<(), MemoryError> {
    let storage = SqliteStorage::new(&target.database_path);
    storage.initialize().await;
    let health = storage.health_check().await?;

    let rows = storage.get_messages(&target.conversation_id).await;
    let estimated_tokens: usize = rows
        .iter()
        .filter_map(|row| codec::decode_row(row).ok())
        .map(|message| browseros_memory::estimate_tokens(&message))
        .sum();
    let (conversations, last_updated) = if storage.is_available() {
        let record = storage.get_conversation(&target.conversation_id).await?;
        (
            storage.list_conversations().await?.len(),
            record.map(|r| format_timestamp(r.updated_at)),
        )
    } else {
        (0, None)
    };

    let status = StatusResponse {
        backend: storage.name().to_string(),
        available: storage.is_available(),
        health: describe_health(&health),
        database_path: target.database_path.display().to_string(),
        conversation_id: target.conversation_id.clone(),
        messages: rows.len(),
        estimated_tokens,
        max_tokens: config.chat_memory.max_tokens,
        conversations,
        last_updated,
    };

    if json {
        println!(
            "{}",
            serde_json::to_string_pretty(&status).unwrap_or_else(|_| "{}".to_string())
        );
    } else {
        let use_color = !plain && std::io::stdout().is_terminal();
        print_status(&status, use_color);
    }

    storage.shutdown().await
}

fn print_status(status: &StatusResponse, color: bool) {
    let state = if status.available { "available" } else { "unavailable" };
    let state = match (color, status.available) {
        (true, true) => state.green().bold().to_string(),
        (true, false) => state.red().bold().to_string(),
        (false, _) => state.to_string(),
    };
    println!("backend:       {} ({state})", status.backend);
    println!("health:        {}", status.health);
    println!("database:      {}", status.database_path);
    println!("conversation:  {}", status.conversation_id);
    println!(
        "messages:      {} (~{} of {} tokens)",
        status.messages, status.estimated_tokens, status.max_tokens
    );
    println!(
        "updated:       {}",
        status.last_updated.as_deref().unwrap_or("never")
    );
    println!("conversations: {}", status.conversations);
}

/// Run `browseros list`.
pub async fn run_list(target: &Target, json: bool) -> Result<(), MemoryError> {
    let storage = SqliteStorage::new(&target.database_path);
    storage.initialize().await;
    let conversations = storage.list_conversations().await?;

    if json {
        let text = serde_json::to_string_pretty(&conversations).map_err(|e| {
            MemoryError::Codec {
                message: "failed to render conversation list".into(),
                source: Some(e),
            }
        })?;
        println!("{text}");
    } else if conversations.is_empty() {
        println!("no stored conversations");
    } else {
        for record in &conversations {
            println!("{}", format_record(record));
        }
    }

    storage.shutdown().await
}

fn format_timestamp(millis: i64) -> String {
    chrono::DateTime::from_timestamp_millis(millis)
        .map(|t| t.format("%Y-%m-%d %H:%M:%S UTC").to_string())
        .unwrap_or_else(|| millis.to_string())
}

fn format_record(record: &ConversationRecord) -> String {
    let updated = format_timestamp(record.updated_at);
    format!(
        "{:<32} {:>5} message(s)  updated {updated}",
        record.id, record.message_count
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn health_is_described() {
        assert_eq!(describe_health(&HealthStatus::Healthy), "healthy");
        assert_eq!(
            describe_health(&HealthStatus::Unhealthy("not initialized".into())),
            "unhealthy: not initialized"
        );
    }

    #[test]
    fn record_line_shows_count_and_time() {
        let record = ConversationRecord {
            id: "persist-case".into(),
            created_at: 0,
            updated_at: 1_700_000_000_000,
            message_count: 3,
        };
        let line = format_record(&record);
        assert!(line.starts_with("persist-case"));
        assert!(line.contains("3 message(s)"));
        assert!(line.contains("2023-11-14 22:13:20 UTC"));
    }

    #[test]
    fn status_serializes_for_scripts() {
        let status = StatusResponse {
            backend: "sqlite".into(),
            available: false,
            health: "unhealthy: x".into(),
            database_path: "/nope/chat.sqlite".into(),
            conversation_id: "default".into(),
            messages: 0,
            estimated_tokens: 0,
            max_tokens: 128_000,
            conversations: 0,
            last_updated: None,
        };
        let value = serde_json::to_value(&status).unwrap();
        assert_eq!(value["available"], serde_json::json!(false));
        assert_eq!(value["max_tokens"], serde_json::json!(128_000));
        assert!(value["last_updated"].is_null());
    }
}
