// SPDX-FileCopyrightText: 2026 BrowserOS Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! In-memory message pipeline with a token budget.

use browseros_core::types::{Message, MessageKind};
use tracing::debug;

/// Rough characters-per-token ratio used for budget estimates.
const CHARS_PER_TOKEN: usize = 4;

/// The live message list a [`ChatMemory`](crate::ChatMemory) wraps.
///
/// Implementations own the messages and enforce whatever budget they like;
/// none of these operations persist anything.
pub trait MessagePipeline: Send {
    /// Append `message`, or insert it at `position` (clamped to the length).
    fn add(&mut self, message: Message, position: Option<usize>);

    /// Remove the newest message. Returns false when the list was empty.
    fn remove_last(&mut self) -> bool;

    /// Drop every message.
    fn clear(&mut self);

    /// Change the token budget, evicting messages if it shrank.
    fn set_max_tokens(&mut self, max_tokens: usize);

    /// The messages in conversation order.
    fn messages(&self) -> &[Message];
}

/// Estimated token cost of one message: its text length over four, at least one.
///
/// Structured content is measured by its JSON text, and AI tool-call
/// arguments count toward the total.
pub fn estimate_tokens(message: &Message) -> usize {
    let mut chars = message.content().to_text().chars().count();
    if let Message::Ai(ai) = message {
        chars += ai
            .tool_calls
            .iter()
            .map(|call| call.name.len() + call.args.to_string().len())
            .sum::<usize>();
    }
    (chars / CHARS_PER_TOKEN).max(1)
}

/// Ordered messages kept within a token budget.
///
/// When the estimate exceeds the budget the oldest non-system messages are
/// evicted first. The newest message is never evicted, so a single oversized
/// message is still kept.
#[derive(Debug, Clone)]
pub struct MessageHistory {
    messages: Vec<Message>,
    max_tokens: usize,
}

impl MessageHistory {
    pub fn new(max_tokens: usize) -> Self {
        Self {
            messages: Vec::new(),
            max_tokens,
        }
    }

    pub fn max_tokens(&self) -> usize {
        self.max_tokens
    }

    /// Estimated tokens of everything currently held.
    pub fn total_tokens(&self) -> usize {
        self.messages.iter().map(estimate_tokens).sum()
    }

    fn enforce_budget(&mut self) {
        let mut total = self.total_tokens();
        while total > self.max_tokens && self.messages.len() > 1 {
            let newest = self.messages.len() - 1;
            let Some(index) = self.messages[..newest]
                .iter()
                .position(|m| m.kind() != MessageKind::System)
            else {
                break;
            };
            let evicted = self.messages.remove(index);
            total -= estimate_tokens(&evicted);
            debug!(
                kind = %evicted.kind(),
                index,
                total_tokens = total,
                max_tokens = self.max_tokens,
                "evicted message over token budget"
            );
        }
    }
}

impl Default for MessageHistory {
    fn default() -> Self {
        Self::new(128_000)
    }
}

impl MessagePipeline for MessageHistory {
    fn add(&mut self, message: Message, position: Option<usize>) {
        match position {
            Some(index) => {
                let index = index.min(self.messages.len());
                self.messages.insert(index, message);
            }
            None => self.messages.push(message),
        }
        self.enforce_budget();
    }

    fn remove_last(&mut self) -> bool {
        self.messages.pop().is_some()
    }

    fn clear(&mut self) {
        self.messages.clear();
    }

    fn set_max_tokens(&mut self, max_tokens: usize) {
        self.max_tokens = max_tokens;
        self.enforce_budget();
    }

    fn messages(&self) -> &[Message] {
        &self.messages
    }
}
