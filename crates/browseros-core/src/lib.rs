// SPDX-FileCopyrightText: 2026 BrowserOS Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Core library for BrowserOS chat memory.
//!
//! Provides the message model, the flat row format it is persisted as, the
//! error type, and the adapter traits every storage backend implements.

pub mod error;
pub mod traits;
pub mod types;

pub use error::MemoryError;
pub use types::{
    AiMessage, BaseMessage, HealthStatus, InvalidToolCall, Message, MessageContent, MessageKind,
    StoredMessageRow, ToolCall, ToolMessage, UsageMetadata,
};

pub use traits::{PluginAdapter, StorageAdapter};

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn memory_error_has_all_variants() {
        let _config = MemoryError::Config("test".into());
        let _storage = MemoryError::Storage {
            source: Box::new(std::io::Error::other("test")),
        };
        let _codec = MemoryError::Codec {
            message: "test".into(),
            source: None,
        };
        let _unavailable = MemoryError::Unavailable {
            backend: "test".into(),
        };
        let _internal = MemoryError::Internal("test".into());
    }

    #[test]
    fn health_status_variants() {
        let healthy = HealthStatus::Healthy;
        let degraded = HealthStatus::Degraded("slow".into());
        let unhealthy = HealthStatus::Unhealthy("down".into());

        assert_eq!(healthy, HealthStatus::Healthy);
        assert_ne!(degraded, healthy);
        assert_ne!(unhealthy, healthy);
    }

    #[test]
    fn storage_adapter_is_object_safe() {
        fn _assert_plugin_adapter<T: PluginAdapter>() {}
        fn _assert_storage_adapter<T: StorageAdapter>() {}
        fn _assert_dyn(_: &dyn StorageAdapter) {}
    }
}
