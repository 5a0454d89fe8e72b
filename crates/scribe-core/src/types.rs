// SPDX-FileCopyrightText: 2026 Scribe Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Domain types shared across the ingestion pipeline, storage, and gateway.

use serde::{Deserialize, Serialize};
use strum::{Display, EnumString};

/// Where a message was observed: a channel broadcast or a direct message.
///
/// The string forms (`channel` / `private`) are what the `source` column
/// stores and what the partial unique indexes filter on.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, Display, EnumString, Serialize, Deserialize,
)]
#[strum(serialize_all = "lowercase")]
#[serde(rename_all = "lowercase")]
pub enum MessageSource {
    Channel,
    Private,
}

/// The identified sender of a message, when the source event carries one.
///
/// Channel posts frequently have no sender; private messages without one
/// are dropped by the pipeline rather than stored with placeholder identity.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Sender {
    pub id: Option<i64>,
    pub username: Option<String>,
    pub first_name: Option<String>,
}

/// A message as submitted to the store, before a row id is assigned.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NewMessage {
    pub source: MessageSource,
    pub channel_id: Option<i64>,
    pub channel_username: Option<String>,
    pub channel_title: Option<String>,
    pub chat_id: Option<i64>,
    /// Source-local message identifier; unique only within its dedup scope.
    pub message_id: i64,
    pub text: Option<String>,
    /// Epoch seconds as reported by the messaging source.
    pub timestamp: Option<f64>,
    pub sender: Option<Sender>,
}

/// A persisted message row, including the server-assigned id and creation time.
#[derive(Debug, Clone, PartialEq)]
pub struct StoredMessage {
    pub id: i64,
    pub source: String,
    pub channel_id: Option<i64>,
    pub channel_username: Option<String>,
    pub channel_title: Option<String>,
    pub chat_id: Option<i64>,
    pub message_id: i64,
    pub text: Option<String>,
    pub timestamp: Option<f64>,
    pub from_user_id: Option<i64>,
    pub from_username: Option<String>,
    pub from_first_name: Option<String>,
    pub created_at: String,
}

impl NewMessage {
    /// A channel-sourced message with the fields the channel path populates.
    pub fn channel(
        channel_id: i64,
        channel_username: impl Into<String>,
        channel_title: impl Into<String>,
        message_id: i64,
        text: impl Into<String>,
        timestamp: Option<f64>,
        sender: Option<Sender>,
    ) -> Self {
        Self {
            source: MessageSource::Channel,
            channel_id: Some(channel_id),
            channel_username: Some(channel_username.into()),
            channel_title: Some(channel_title.into()),
            chat_id: None,
            message_id,
            text: Some(text.into()),
            timestamp,
            sender,
        }
    }

    /// A private-sourced message with the fields the private path populates.
    pub fn private(
        chat_id: i64,
        message_id: i64,
        text: impl Into<String>,
        timestamp: Option<f64>,
        sender: Sender,
    ) -> Self {
        Self {
            source: MessageSource::Private,
            channel_id: None,
            channel_username: None,
            channel_title: None,
            chat_id: Some(chat_id),
            message_id,
            text: Some(text.into()),
            timestamp,
            sender: Some(sender),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::str::FromStr;

    #[test]
    fn message_source_round_trips_as_lowercase() {
        assert_eq!(MessageSource::Channel.to_string(), "channel");
        assert_eq!(MessageSource::Private.to_string(), "private");
        assert_eq!(
            MessageSource::from_str("channel").unwrap(),
            MessageSource::Channel
        );

        let json = serde_json::to_string(&MessageSource::Private).unwrap();
        assert_eq!(json, "\"private\"");
    }

    #[test]
    fn channel_constructor_fills_channel_scope_only() {
        let msg = NewMessage::channel(42, "news", "News", 7, "hello", Some(1.0), None);
        assert_eq!(msg.source, MessageSource::Channel);
        assert_eq!(msg.channel_username.as_deref(), Some("news"));
        assert!(msg.chat_id.is_none());
        assert_eq!(msg.text.as_deref(), Some("hello"));
    }

    #[test]
    fn private_constructor_fills_chat_scope_only() {
        let sender = Sender {
            id: Some(9),
            username: Some("alice".into()),
            first_name: None,
        };
        let msg = NewMessage::private(5, 9, "", None, sender);
        assert_eq!(msg.source, MessageSource::Private);
        assert_eq!(msg.chat_id, Some(5));
        assert!(msg.channel_username.is_none());
        assert!(msg.sender.is_some());
    }
}
