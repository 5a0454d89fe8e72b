// SPDX-FileCopyrightText: 2026 Scribe Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Domain model types for storage entities.
//!
//! The canonical types are defined in `scribe-core::types` so they can
//! cross crate boundaries; this module re-exports them for convenience
//! within the storage crate.

pub use scribe_core::types::{MessageSource, NewMessage, Sender, StoredMessage};
