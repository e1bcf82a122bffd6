// SPDX-FileCopyrightText: 2026 BrowserOS Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Error types for BrowserOS chat memory.

use thiserror::Error;

/// The error type used by storage queries, the row codec and configuration.
///
/// Storage adapter trait methods never return this type: they log and swallow
/// failures. It flows through the internal query functions and the codec so
/// that failures can be tested precisely.
#[derive(Debug, Error)]
pub enum MemoryError {
    /// Configuration errors (invalid TOML, empty identifiers, bad paths).
    #[error("configuration error: {0}")]
    Config(String),

    /// Storage backend errors (connection, migration, query, transaction).
    #[error("storage error: {source}")]
    Storage {
        source: Box<dyn std::error::Error + Send + Sync>,
    },

    /// A stored row could not be mapped back onto a message, or a message
    /// could not be mapped onto a row.
    #[error("codec error: {message}")]
    Codec {
        message: String,
        source: Option<serde_json::Error>,
    },

    /// The backend has not been initialized or failed to initialize.
    #[error("storage backend `{backend}` is not available")]
    Unavailable { backend: String },

    /// Internal or unexpected errors.
    #[error("internal error: {0}")]
    Internal(String),
}

impl MemoryError {
    /// Wraps any error as a [`MemoryError::Storage`].
    pub fn storage<E>(err: E) -> Self
    where
        E: std::error::Error + Send + Sync + 'static,
    {
        MemoryError::Storage {
            source: Box::new(err),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn storage_error_displays_source() {
        let err = MemoryError::storage(std::io::Error::other("disk full"));
        assert_eq!(err.to_string(), "storage error: disk full");
    }

    #[test]
    fn unavailable_names_backend() {
        let err = MemoryError::Unavailable {
            backend: "sqlite".into(),
        };
        assert_eq!(err.to_string(), "storage backend `sqlite` is not available");
    }
}
