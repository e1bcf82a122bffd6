// SPDX-FileCopyrightText: 2026 BrowserOS Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Message model and stored-row types shared across the workspace.

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use strum::{Display, EnumString};

/// Health status reported by adapter health checks.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum HealthStatus {
    /// Adapter is fully operational.
    Healthy,
    /// Adapter is operational but experiencing issues.
    Degraded(String),
    /// Adapter is not operational.
    Unhealthy(String),
}

/// Discriminant of a [`Message`], persisted as the row `role`.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, Display, EnumString, Serialize, Deserialize,
)]
#[serde(rename_all = "snake_case")]
#[strum(serialize_all = "snake_case")]
pub enum MessageKind {
    System,
    Human,
    Ai,
    Tool,
    BrowserState,
    TodoList,
}

/// Message body: either plain text or an arbitrary JSON structure.
#[derive(Debug, Clone, PartialEq)]
pub enum MessageContent {
    Text(String),
    Structured(Value),
}

impl MessageContent {
    /// Returns the text when the content is a plain string.
    pub fn as_text(&self) -> Option<&str> {
        match self {
            MessageContent::Text(text) => Some(text),
            MessageContent::Structured(_) => None,
        }
    }

    /// Renders the content as text; structured content becomes its JSON text.
    pub fn to_text(&self) -> String {
        match self {
            MessageContent::Text(text) => text.clone(),
            MessageContent::Structured(value) => value.to_string(),
        }
    }
}

impl From<&str> for MessageContent {
    fn from(text: &str) -> Self {
        MessageContent::Text(text.to_string())
    }
}

impl From<String> for MessageContent {
    fn from(text: String) -> Self {
        MessageContent::Text(text)
    }
}

impl From<Value> for MessageContent {
    fn from(value: Value) -> Self {
        MessageContent::Structured(value)
    }
}

/// A tool invocation requested by the model.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ToolCall {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,
    pub name: String,
    #[serde(default)]
    pub args: Value,
    /// Provider fields without a typed counterpart (e.g. `type`).
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

/// A tool invocation the model attempted but that could not be parsed.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct InvalidToolCall {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub args: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

/// Token accounting attached to a model response.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct UsageMetadata {
    #[serde(default)]
    pub input_tokens: u64,
    #[serde(default)]
    pub output_tokens: u64,
    #[serde(default)]
    pub total_tokens: u64,
    /// Breakdowns such as `input_token_details`, kept as reported.
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

/// Content plus side-channel annotations. Used by the kinds that carry no
/// extra fields (system, human, browser state, todo list).
#[derive(Debug, Clone, PartialEq)]
pub struct BaseMessage {
    pub content: MessageContent,
    pub additional_kwargs: Map<String, Value>,
    /// Stored metadata keys this model does not interpret. Written back
    /// unchanged so a restore followed by a write loses nothing.
    pub extra: Map<String, Value>,
}

impl BaseMessage {
    pub fn new(content: impl Into<MessageContent>) -> Self {
        Self {
            content: content.into(),
            additional_kwargs: Map::new(),
            extra: Map::new(),
        }
    }

    pub fn with_kwargs(mut self, kwargs: Map<String, Value>) -> Self {
        self.additional_kwargs = kwargs;
        self
    }
}

/// A model response, optionally requesting tool calls.
#[derive(Debug, Clone, PartialEq)]
pub struct AiMessage {
    pub content: MessageContent,
    pub tool_calls: Vec<ToolCall>,
    pub invalid_tool_calls: Vec<InvalidToolCall>,
    pub usage_metadata: Option<UsageMetadata>,
    pub additional_kwargs: Map<String, Value>,
    pub extra: Map<String, Value>,
}

impl AiMessage {
    pub fn new(content: impl Into<MessageContent>) -> Self {
        Self {
            content: content.into(),
            tool_calls: Vec::new(),
            invalid_tool_calls: Vec::new(),
            usage_metadata: None,
            additional_kwargs: Map::new(),
            extra: Map::new(),
        }
    }

    pub fn with_tool_calls(mut self, tool_calls: Vec<ToolCall>) -> Self {
        self.tool_calls = tool_calls;
        self
    }

    pub fn with_invalid_tool_calls(mut self, invalid: Vec<InvalidToolCall>) -> Self {
        self.invalid_tool_calls = invalid;
        self
    }

    pub fn with_usage(mut self, usage: UsageMetadata) -> Self {
        self.usage_metadata = Some(usage);
        self
    }

    pub fn with_kwargs(mut self, kwargs: Map<String, Value>) -> Self {
        self.additional_kwargs = kwargs;
        self
    }
}

/// The result of a tool invocation, linked to its request by `tool_call_id`.
#[derive(Debug, Clone, PartialEq)]
pub struct ToolMessage {
    pub content: MessageContent,
    pub tool_call_id: String,
    pub status: Option<String>,
    pub artifact: Option<Value>,
    pub metadata: Map<String, Value>,
    pub additional_kwargs: Map<String, Value>,
    pub extra: Map<String, Value>,
}

impl ToolMessage {
    pub fn new(content: impl Into<MessageContent>, tool_call_id: impl Into<String>) -> Self {
        Self {
            content: content.into(),
            tool_call_id: tool_call_id.into(),
            status: None,
            artifact: None,
            metadata: Map::new(),
            additional_kwargs: Map::new(),
            extra: Map::new(),
        }
    }

    pub fn with_status(mut self, status: impl Into<String>) -> Self {
        self.status = Some(status.into());
        self
    }

    pub fn with_artifact(mut self, artifact: Value) -> Self {
        self.artifact = Some(artifact);
        self
    }

    pub fn with_metadata(mut self, metadata: Map<String, Value>) -> Self {
        self.metadata = metadata;
        self
    }

    pub fn with_kwargs(mut self, kwargs: Map<String, Value>) -> Self {
        self.additional_kwargs = kwargs;
        self
    }
}

/// A single conversation entry.
#[derive(Debug, Clone, PartialEq)]
pub enum Message {
    System(BaseMessage),
    Human(BaseMessage),
    Ai(AiMessage),
    Tool(ToolMessage),
    /// Snapshot of the browser the agent is driving.
    BrowserState(BaseMessage),
    /// The agent's current task list.
    TodoList(BaseMessage),
}

impl Message {
    pub fn system(content: impl Into<MessageContent>) -> Self {
        Message::System(BaseMessage::new(content))
    }

    pub fn human(content: impl Into<MessageContent>) -> Self {
        Message::Human(BaseMessage::new(content))
    }

    pub fn ai(content: impl Into<MessageContent>) -> Self {
        Message::Ai(AiMessage::new(content))
    }

    pub fn tool(content: impl Into<MessageContent>, tool_call_id: impl Into<String>) -> Self {
        Message::Tool(ToolMessage::new(content, tool_call_id))
    }

    pub fn browser_state(content: impl Into<String>) -> Self {
        Message::BrowserState(BaseMessage::new(content.into()))
    }

    pub fn todo_list(content: impl Into<String>) -> Self {
        Message::TodoList(BaseMessage::new(content.into()))
    }

    pub fn kind(&self) -> MessageKind {
        match self {
            Message::System(_) => MessageKind::System,
            Message::Human(_) => MessageKind::Human,
            Message::Ai(_) => MessageKind::Ai,
            Message::Tool(_) => MessageKind::Tool,
            Message::BrowserState(_) => MessageKind::BrowserState,
            Message::TodoList(_) => MessageKind::TodoList,
        }
    }

    pub fn content(&self) -> &MessageContent {
        match self {
            Message::System(m)
            | Message::Human(m)
            | Message::BrowserState(m)
            | Message::TodoList(m) => &m.content,
            Message::Ai(m) => &m.content,
            Message::Tool(m) => &m.content,
        }
    }

    pub fn additional_kwargs(&self) -> &Map<String, Value> {
        match self {
            Message::System(m)
            | Message::Human(m)
            | Message::BrowserState(m)
            | Message::TodoList(m) => &m.additional_kwargs,
            Message::Ai(m) => &m.additional_kwargs,
            Message::Tool(m) => &m.additional_kwargs,
        }
    }

    /// Uninterpreted metadata carried over from storage.
    pub fn extra(&self) -> &Map<String, Value> {
        match self {
            Message::System(m)
            | Message::Human(m)
            | Message::BrowserState(m)
            | Message::TodoList(m) => &m.extra,
            Message::Ai(m) => &m.extra,
            Message::Tool(m) => &m.extra,
        }
    }
}

/// The at-rest representation of one message within a conversation.
///
/// `content` is always a string. Structured content is JSON-encoded and
/// flagged with `metadata.contentIsJson = true`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StoredMessageRow {
    /// Kind tag of the message (see [`MessageKind`]). Kept as a string so rows
    /// written by other producers with unknown roles can still be read.
    pub role: String,
    pub content: String,
    /// Zero-based position within the conversation at the last write.
    pub sequence: i64,
    /// Milliseconds since the Unix epoch.
    pub created_at: i64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub metadata: Option<Map<String, Value>>,
}
