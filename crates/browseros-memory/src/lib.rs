// SPDX-FileCopyrightText: 2026 BrowserOS Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Persistent chat memory for BrowserOS.
//!
//! [`ChatMemory`] wraps a [`MessagePipeline`] (by default the token-budgeted
//! [`MessageHistory`]) and keeps a storage backend in sync with it. Messages
//! are flattened into [`StoredMessageRow`](browseros_core::StoredMessageRow)s
//! by the [`codec`] and replayed on the next start.
//!
//! ```no_run
//! # async fn demo() {
//! use browseros_core::Message;
//! use browseros_memory::ChatMemoryBuilder;
//!
//! let mut memory = ChatMemoryBuilder::from_env()
//!     .conversation_id("tab-42")
//!     .build()
//!     .await;
//! memory.add(Message::human("open the docs"), None).await;
//! # }
//! ```

pub mod codec;
pub mod controller;
pub mod history;

pub use controller::{ChatMemory, ChatMemoryBuilder, DurableFactory, Mode, sqlite_factory};
pub use history::{MessageHistory, MessagePipeline, estimate_tokens};
