// SPDX-FileCopyrightText: 2026 BrowserOS Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! `browseros show`, `append` and `clear`.
//!
//! Each command opens the conversation through [`ChatMemory`], so it sees
//! exactly what an agent would restore and writes exactly what an agent
//! would persist.

use std::io::IsTerminal;

use browseros_config::BrowserOsConfig;
use browseros_core::{
    MemoryError, Message, MessageContent, MessageKind, PluginAdapter, StorageAdapter,
};
use browseros_memory::{ChatMemory, ChatMemoryBuilder, estimate_tokens};
use colored::Colorize;
use serde_json::{Value, json};

use crate::Target;

async fn open(config: &BrowserOsConfig, target: &Target) -> ChatMemory {
    ChatMemoryBuilder::new(config.chat_memory.clone())
        .conversation_id(target.conversation_id.clone())
        .database_path(target.database_path.clone())
        .build()
        .await
}

/// Run `browseros show`.
pub async fn run_show(
    config: &BrowserOsConfig,
    target: &Target,
    json: bool,
    plain: bool,
) -> Result<(), MemoryError> {
    let memory = open(config, target).await;

    if json {
        let entries: Vec<Value> = memory
            .messages()
            .iter()
            .enumerate()
            .map(|(index, message)| {
                let content = match message.content() {
                    MessageContent::Text(text) => Value::String(text.clone()),
                    MessageContent::Structured(value) => value.clone(),
                };
                json!({
                    "sequence": index,
                    "role": message.kind().to_string(),
                    "content": content,
                    "tokens": estimate_tokens(message),
                })
            })
            .collect();
        let text = serde_json::to_string_pretty(&entries).map_err(|e| MemoryError::Codec {
            message: "failed to render conversation".into(),
            source: Some(e),
        })?;
        println!("{text}");
    } else {
        let use_color = !plain && std::io::stdout().is_terminal();
        if memory.messages().is_empty() {
            println!("(conversation `{}` is empty)", memory.conversation_id());
        }
        for (index, message) in memory.messages().iter().enumerate() {
            println!("{}", format_message(index, message, use_color));
        }
    }

    memory.shutdown().await
}

/// Run `browseros append`.
pub async fn run_append(
    config: &BrowserOsConfig,
    target: &Target,
    kind: MessageKind,
    content: &str,
    as_json: bool,
    tool_call_id: Option<String>,
) -> Result<(), MemoryError> {
    let content = if as_json {
        let value = serde_json::from_str::<Value>(content).map_err(|e| MemoryError::Codec {
            message: "content is not valid JSON".into(),
            source: Some(e),
        })?;
        MessageContent::Structured(value)
    } else {
        MessageContent::Text(content.to_string())
    };

    let mut memory = open(config, target).await;
    if !memory.storage().is_available() || memory.storage().name() != "sqlite" {
        return Err(MemoryError::Unavailable {
            backend: "sqlite".into(),
        });
    }
    memory.add(build_message(kind, content, tool_call_id), None).await;
    tracing::info!(
        conversation_id = memory.conversation_id(),
        role = %kind,
        messages = memory.messages().len(),
        "message appended"
    );
    memory.shutdown().await
}

/// Run `browseros clear`.
pub async fn run_clear(config: &BrowserOsConfig, target: &Target) -> Result<(), MemoryError> {
    let mut memory = open(config, target).await;
    let removed = memory.messages().len();
    memory.clear().await;
    println!(
        "cleared {removed} message(s) from conversation `{}`",
        memory.conversation_id()
    );
    memory.shutdown().await
}

fn build_message(
    kind: MessageKind,
    content: MessageContent,
    tool_call_id: Option<String>,
) -> Message {
    match kind {
        MessageKind::System => Message::system(content),
        MessageKind::Human => Message::human(content),
        MessageKind::Ai => Message::ai(content),
        MessageKind::Tool => Message::tool(content, tool_call_id.unwrap_or_default()),
        MessageKind::BrowserState => Message::browser_state(content.to_text()),
        MessageKind::TodoList => Message::todo_list(content.to_text()),
    }
}

fn format_message(index: usize, message: &Message, color: bool) -> String {
    let label = match message {
        Message::Tool(tool) if !tool.tool_call_id.is_empty() => {
            format!("{} ({})", message.kind(), tool.tool_call_id)
        }
        _ => message.kind().to_string(),
    };
    let label = if color {
        match message.kind() {
            MessageKind::System => label.dimmed().to_string(),
            MessageKind::Human => label.green().bold().to_string(),
            MessageKind::Ai => label.cyan().bold().to_string(),
            MessageKind::Tool => label.yellow().to_string(),
            MessageKind::BrowserState | MessageKind::TodoList => label.magenta().to_string(),
        }
    } else {
        label
    };

    let mut line = format!("{index:>3}  {label}: {}", message.content().to_text());
    if let Message::Ai(ai) = message {
        for call in &ai.tool_calls {
            line.push_str(&format!("\n       -> {}({})", call.name, call.args));
        }
    }
    line
}
