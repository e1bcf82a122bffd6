// SPDX-FileCopyrightText: 2026 BrowserOS Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Conversation storage backends for BrowserOS chat memory.
//!
//! [`SqliteStorage`] is the durable backend: WAL-mode SQLite with an embedded
//! schema and a single-writer connection via `tokio-rusqlite`. It replaces a
//! conversation's rows transactionally on every write. [`InMemoryStorage`] is
//! the transient fallback used when the durable store cannot be opened.

pub mod adapter;
pub mod database;
pub mod memory;
pub mod migrations;
pub mod models;
pub mod queries;

pub use adapter::SqliteStorage;
pub use database::Database;
pub use memory::InMemoryStorage;
pub use models::*;
