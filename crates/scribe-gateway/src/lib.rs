// SPDX-FileCopyrightText: 2026 Scribe Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Authenticated WebSocket control channel for the Scribe agent.
//!
//! The agent keeps one persistent connection to an operator gateway. It
//! pushes `message.received` events outward and answers registry commands
//! (`channel.add`, `channel.remove`, `bot.enable`, `bot.disable`) inward.

pub mod auth;
pub mod client;
pub mod dispatch;
pub mod frames;

pub use client::{GatewayClient, SEND_FAILED};
pub use dispatch::{dispatch, handle_command};
pub use frames::Frame;
