// SPDX-FileCopyrightText: 2026 Scribe Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Core library for the Scribe ingestion agent.
//!
//! Defines the shared error type and the domain types that flow between
//! the ingestion pipeline, the message store, and the gateway control
//! channel. Heavier concerns (storage, transport, config) live in their
//! own crates.

pub mod error;
pub mod types;

pub use error::ScribeError;
pub use types::{MessageSource, NewMessage, Sender, StoredMessage};
