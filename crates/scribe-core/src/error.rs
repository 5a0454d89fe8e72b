// SPDX-FileCopyrightText: 2026 Scribe Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Error types for the Scribe ingestion agent.

use thiserror::Error;

/// The primary error type used across all Scribe crates.
#[derive(Debug, Error)]
pub enum ScribeError {
    /// Configuration errors (invalid TOML, missing required fields, type mismatches).
    #[error("configuration error: {0}")]
    Config(String),

    /// Storage backend errors (database connection, query failure, migration failure).
    #[error("storage error: {source}")]
    Storage {
        source: Box<dyn std::error::Error + Send + Sync>,
    },

    /// Messaging-source errors (connection failure, malformed event).
    #[error("channel error: {message}")]
    Channel {
        message: String,
        source: Option<Box<dyn std::error::Error + Send + Sync>>,
    },

    /// Gateway transport errors (connection lost, send/receive failure).
    #[error("gateway error: {message}")]
    Gateway {
        message: String,
        source: Option<Box<dyn std::error::Error + Send + Sync>>,
    },

    /// The gateway rejected or garbled the connect handshake. Fatal to `connect()`.
    #[error("handshake failed: {0}")]
    Handshake(String),

    /// Internal or unexpected errors.
    #[error("internal error: {0}")]
    Internal(String),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn error_messages_render_with_context() {
        let e = ScribeError::Config("telegram.bot_token is required".into());
        assert!(e.to_string().contains("configuration error"));

        let e = ScribeError::Storage {
            source: Box::new(std::io::Error::other("disk full")),
        };
        assert!(e.to_string().contains("disk full"));

        let e = ScribeError::Handshake("unexpected reply".into());
        assert_eq!(e.to_string(), "handshake failed: unexpected reply");
    }
}
