// SPDX-FileCopyrightText: 2026 Scribe Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Source-agnostic inbound events.
//!
//! The polling layer maps raw Telegram updates into these before they
//! reach the pipeline, so ingestion logic and its tests never touch the
//! Bot API types.

use scribe_core::Sender;

/// A broadcast post observed in a channel.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ChannelPost {
    pub channel_id: i64,
    /// Public handle of the channel, when it has one. Posts from chats
    /// without a channel identity are discarded by the pipeline.
    pub channel_username: Option<String>,
    pub channel_title: Option<String>,
    pub message_id: i64,
    pub text: Option<String>,
    pub caption: Option<String>,
    /// Epoch seconds as reported by Telegram.
    pub timestamp: Option<f64>,
    pub sender: Option<Sender>,
}

/// A direct message addressed to the account.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct PrivateMessage {
    pub chat_id: i64,
    pub message_id: i64,
    pub text: Option<String>,
    pub caption: Option<String>,
    pub timestamp: Option<f64>,
    pub sender: Option<Sender>,
}

/// Text precedence shared by both paths: body, else caption, else empty.
/// The persisted column is always a string, never null.
pub(crate) fn effective_text(text: Option<&str>, caption: Option<&str>) -> String {
    text.or(caption).unwrap_or_default().to_string()
}
