// SPDX-FileCopyrightText: 2026 Scribe Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Long-polling Telegram source.
//!
//! Maps raw Bot API updates into the source-agnostic events in
//! [`crate::events`] and feeds them to the pipeline. Channel posts and
//! private messages take separate branches; group chatter and service
//! updates are ignored.

use std::sync::Arc;

use teloxide::dptree;
use teloxide::prelude::*;
use teloxide::types::ChatKind;
use tracing::{debug, info};

use scribe_core::{ScribeError, Sender};

use crate::events::{ChannelPost, PrivateMessage};
use crate::ingest::IngestionPipeline;

/// Telegram long-polling source feeding an [`IngestionPipeline`].
pub struct TelegramSource {
    bot: Bot,
    pipeline: Arc<IngestionPipeline>,
}

impl TelegramSource {
    /// Requires a non-empty bot token.
    pub fn new(token: &str, pipeline: Arc<IngestionPipeline>) -> Result<Self, ScribeError> {
        if token.is_empty() {
            return Err(ScribeError::Config(
                "telegram.bot_token cannot be empty".into(),
            ));
        }
        Ok(Self {
            bot: Bot::new(token),
            pipeline,
        })
    }

    /// Run long polling until the update stream ends.
    pub async fn run(self) {
        info!("starting Telegram long polling");

        let channel_pipe = self.pipeline.clone();
        let private_pipe = self.pipeline;

        let handler = dptree::entry()
            .branch(Update::filter_channel_post().endpoint(move |msg: Message| {
                let pipeline = channel_pipe.clone();
                async move {
                    pipeline.handle_channel_post(map_channel_post(&msg)).await;
                    respond(())
                }
            }))
            .branch(Update::filter_message().endpoint(move |msg: Message| {
                let pipeline = private_pipe.clone();
                async move {
                    if is_dm(&msg) {
                        pipeline.handle_private_message(map_private_message(&msg)).await;
                    } else {
                        debug!(chat_id = msg.chat.id.0, "ignoring non-DM message");
                    }
                    respond(())
                }
            }));

        Dispatcher::builder(self.bot, handler)
            .default_handler(|_| async {}) // Silently ignore other update kinds
            .build()
            .dispatch()
            .await;
    }
}

/// Whether the message is from a private (DM) chat.
fn is_dm(msg: &Message) -> bool {
    matches!(msg.chat.kind, ChatKind::Private(_))
}

fn map_sender(msg: &Message) -> Option<Sender> {
    msg.from.as_ref().map(|user| Sender {
        id: Some(user.id.0 as i64),
        username: user.username.clone(),
        first_name: Some(user.first_name.clone()),
    })
}

pub(crate) fn map_channel_post(msg: &Message) -> ChannelPost {
    ChannelPost {
        channel_id: msg.chat.id.0,
        channel_username: msg.chat.username().map(String::from),
        channel_title: msg.chat.title().map(String::from),
        message_id: i64::from(msg.id.0),
        text: msg.text().map(String::from),
        caption: msg.caption().map(String::from),
        timestamp: Some(msg.date.timestamp() as f64),
        sender: map_sender(msg),
    }
}

pub(crate) fn map_private_message(msg: &Message) -> PrivateMessage {
    PrivateMessage {
        chat_id: msg.chat.id.0,
        message_id: i64::from(msg.id.0),
        text: msg.text().map(String::from),
        caption: msg.caption().map(String::from),
        timestamp: Some(msg.date.timestamp() as f64),
        sender: map_sender(msg),
    }
}
