// SPDX-FileCopyrightText: 2026 BrowserOS Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Configuration model structs for BrowserOS chat memory.
//!
//! All structs use `#[serde(deny_unknown_fields)]` to reject unrecognized
//! config keys at startup, providing actionable error messages.

use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

/// Conversation id used when neither the caller nor the environment names one.
pub const DEFAULT_CONVERSATION_ID: &str = "default";

/// File name of the database created under the working directory by default.
pub const DEFAULT_DATABASE_FILE: &str = "chat_memory.sqlite";

/// Top-level configuration.
#[derive(Debug, Clone, Default, Deserialize, Serialize)]
#[serde(deny_unknown_fields)]
pub struct BrowserOsConfig {
    /// Conversation persistence settings.
    #[serde(default)]
    pub chat_memory: ChatMemoryConfig,

    /// Log output settings.
    #[serde(default)]
    pub logging: LoggingConfig,
}

/// Conversation persistence configuration.
///
/// Both identifiers are optional here: `None` means "use the built-in
/// default", which is resolved by [`ChatMemoryConfig::conversation_id`] and
/// [`ChatMemoryConfig::database_path`].
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(deny_unknown_fields)]
pub struct ChatMemoryConfig {
    /// Conversation to persist into and restore from.
    /// Environment: `BROWSEROS_CHAT_MEMORY_ID`.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub conversation_id: Option<String>,

    /// Path of the SQLite database file.
    /// Environment: `BROWSEROS_CHAT_MEMORY_PATH`.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub database_path: Option<String>,

    /// Token budget of the in-memory history.
    #[serde(default = "default_max_tokens")]
    pub max_tokens: usize,
}

impl Default for ChatMemoryConfig {
    fn default() -> Self {
        Self {
            conversation_id: None,
            database_path: None,
            max_tokens: default_max_tokens(),
        }
    }
}

impl ChatMemoryConfig {
    /// Configured conversation id, or [`DEFAULT_CONVERSATION_ID`].
    pub fn conversation_id(&self) -> String {
        self.conversation_id
            .clone()
            .unwrap_or_else(|| DEFAULT_CONVERSATION_ID.to_string())
    }

    /// Configured database path, or `chat_memory.sqlite` in the working directory.
    pub fn database_path(&self) -> PathBuf {
        match &self.database_path {
            Some(path) => PathBuf::from(path),
            None => default_database_path(),
        }
    }
}

fn default_max_tokens() -> usize {
    128_000
}

fn default_database_path() -> PathBuf {
    std::env::current_dir()
        .map(|dir| dir.join(DEFAULT_DATABASE_FILE))
        .unwrap_or_else(|_| Path::new(DEFAULT_DATABASE_FILE).to_path_buf())
}

/// Log output configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(deny_unknown_fields)]
pub struct LoggingConfig {
    /// Logging level (trace, debug, info, warn, error). `RUST_LOG` wins when set.
    #[serde(default = "default_log_level")]
    pub level: String,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: default_log_level(),
        }
    }
}

fn default_log_level() -> String {
    "info".to_string()
}
