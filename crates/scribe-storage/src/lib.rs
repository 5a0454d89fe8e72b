// SPDX-FileCopyrightText: 2026 Scribe Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! SQLite persistence layer for the Scribe ingestion agent.
//!
//! Provides WAL-mode SQLite storage with embedded migrations, a
//! single-writer concurrency model via `tokio-rusqlite`, an idempotent
//! message insert with per-source dedup, and read-only queries for the
//! operator query tool.

pub mod database;
pub mod migrations;
pub mod models;
pub mod queries;
pub mod store;

pub use database::Database;
pub use models::*;
pub use queries::messages::{MessageFilter, recent_messages};
pub use store::{DUPLICATE, MessageStore};
