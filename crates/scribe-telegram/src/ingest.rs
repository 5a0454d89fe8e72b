// SPDX-FileCopyrightText: 2026 Scribe Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Ingestion pipeline: filters inbound events against the registry and
//! persists the survivors.
//!
//! Every handler is total: storage failures are logged and swallowed so
//! one malformed event never stops subsequent ingestion.

use std::sync::Arc;

use tracing::{debug, error};

use scribe_core::NewMessage;
use scribe_registry::ChannelRegistry;
use scribe_storage::{DUPLICATE, MessageStore};

use crate::events::{ChannelPost, PrivateMessage, effective_text};

/// Routes inbound events to storage, applying registry policy per source.
pub struct IngestionPipeline {
    registry: Arc<ChannelRegistry>,
    store: Arc<MessageStore>,
}

impl IngestionPipeline {
    pub fn new(registry: Arc<ChannelRegistry>, store: Arc<MessageStore>) -> Self {
        Self { registry, store }
    }

    /// Channel path: only posts from monitored channels are kept.
    ///
    /// A post with no channel username can never match the registry and
    /// is discarded up front.
    pub async fn handle_channel_post(&self, post: ChannelPost) {
        let Some(username) = post.channel_username.as_deref() else {
            debug!(channel_id = post.channel_id, "skipping post with no channel username");
            return;
        };
        if !self.registry.is_active(username) {
            debug!(channel = username, "channel not active, skipping post");
            return;
        }

        let msg = NewMessage::channel(
            post.channel_id,
            username,
            post.channel_title.clone().unwrap_or_default(),
            post.message_id,
            effective_text(post.text.as_deref(), post.caption.as_deref()),
            post.timestamp,
            post.sender.clone(),
        );
        self.persist(msg).await;
    }

    /// Private path: gated by the global enabled flag only, never
    /// per-chat. Unattributed messages are dropped rather than stored
    /// with placeholder identity.
    pub async fn handle_private_message(&self, dm: PrivateMessage) {
        if !self.registry.enabled() {
            debug!("ingestion disabled, skipping private message");
            return;
        }
        let Some(sender) = dm.sender.clone() else {
            debug!(chat_id = dm.chat_id, "skipping private message with no sender");
            return;
        };

        let msg = NewMessage::private(
            dm.chat_id,
            dm.message_id,
            effective_text(dm.text.as_deref(), dm.caption.as_deref()),
            dm.timestamp,
            sender,
        );
        self.persist(msg).await;
    }

    async fn persist(&self, msg: NewMessage) {
        match self.store.insert(&msg).await {
            Ok(DUPLICATE) => {
                debug!(
                    source = %msg.source,
                    message_id = msg.message_id,
                    "duplicate message, skipped"
                );
            }
            Ok(row_id) => {
                debug!(source = %msg.source, message_id = msg.message_id, row_id, "message stored");
            }
            Err(e) => {
                error!(
                    source = %msg.source,
                    message_id = msg.message_id,
                    error = %e,
                    "failed to store message"
                );
            }
        }
    }
}
