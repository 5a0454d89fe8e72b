// SPDX-FileCopyrightText: 2026 Scribe Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Telegram ingestion source for the Scribe agent.
//!
//! Listens to channel posts and private messages via long polling,
//! filters them through the channel registry, and persists survivors in
//! the message store.

pub mod events;
pub mod ingest;
pub mod source;

pub use events::{ChannelPost, PrivateMessage};
pub use ingest::IngestionPipeline;
pub use source::TelegramSource;
