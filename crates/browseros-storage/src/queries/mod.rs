// SPDX-FileCopyrightText: 2026 BrowserOS Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Query modules for the conversation registry and message rows.

pub mod conversations;
pub mod messages;
