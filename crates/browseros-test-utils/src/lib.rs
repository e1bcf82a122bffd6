// SPDX-FileCopyrightText: 2026 BrowserOS Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Test utilities for BrowserOS chat memory integration tests.
//!
//! # Components
//!
//! - [`TestHarness`] - temp directory with a SQLite database path
//! - [`RecordingStorage`] - in-memory storage that counts writes
//! - [`FailingStorage`] - storage that never becomes available

pub mod harness;
pub mod mock_storage;

pub use harness::TestHarness;
pub use mock_storage::{FailingStorage, RecordingStorage};
