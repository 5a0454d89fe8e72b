// SPDX-FileCopyrightText: 2026 Scribe Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Idempotent message persistence with post-insert notification hooks.

use std::sync::{Arc, Mutex};

use rusqlite::params;
use tracing::{debug, warn};

use scribe_core::{NewMessage, ScribeError};

use crate::database::{Database, map_tr_err};

/// Row id returned when an insert was suppressed by a uniqueness
/// constraint. Deduplication is normal flow, not an error.
pub const DUPLICATE: i64 = 0;

type InsertCallback = Arc<dyn Fn(i64, &NewMessage) -> Result<(), ScribeError> + Send + Sync>;

/// Append-only durable store of ingested messages.
///
/// Inserts are conflict-tolerant: a message whose dedup key already exists
/// is silently dropped and reported as [`DUPLICATE`]. Registered callbacks
/// fire exactly once per non-duplicate insert, in registration order, each
/// isolated by a catch-log-continue boundary.
pub struct MessageStore {
    db: Database,
    callbacks: Mutex<Vec<InsertCallback>>,
}

impl MessageStore {
    /// Open the store at `path`, creating schema as needed.
    pub async fn open(path: &str) -> Result<Self, ScribeError> {
        let db = Database::open(path).await?;
        Ok(Self {
            db,
            callbacks: Mutex::new(Vec::new()),
        })
    }

    /// The underlying database handle, for read-only query modules.
    pub fn database(&self) -> &Database {
        &self.db
    }

    /// Register a hook invoked after every successful (non-duplicate)
    /// insert with the assigned row id and the original payload.
    ///
    /// A failing callback is logged and never affects the insert result,
    /// other callbacks, or subsequent inserts. A callback may register
    /// further callbacks; those take effect from the next insert on.
    pub fn register_callback<F>(&self, callback: F)
    where
        F: Fn(i64, &NewMessage) -> Result<(), ScribeError> + Send + Sync + 'static,
    {
        self.callbacks
            .lock()
            .expect("callback lock poisoned")
            .push(Arc::new(callback));
    }

    /// Insert one message.
    ///
    /// Returns the assigned row id, or [`DUPLICATE`] when the insert was
    /// suppressed by one of the per-source uniqueness constraints. Any
    /// other storage failure surfaces as an error.
    pub async fn insert(&self, msg: &NewMessage) -> Result<i64, ScribeError> {
        let row = msg.clone();
        let row_id = self
            .db
            .connection()
            .call(move |conn| {
                let sender = row.sender.as_ref();
                let changed = conn.execute(
                    "INSERT INTO messages (
                         source, channel_id, channel_username, channel_title,
                         chat_id, message_id, text, timestamp,
                         from_user_id, from_username, from_first_name
                     ) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10, ?11)
                     ON CONFLICT DO NOTHING",
                    params![
                        row.source.to_string(),
                        row.channel_id,
                        row.channel_username,
                        row.channel_title,
                        row.chat_id,
                        row.message_id,
                        row.text,
                        row.timestamp,
                        sender.and_then(|s| s.id),
                        sender.and_then(|s| s.username.clone()),
                        sender.and_then(|s| s.first_name.clone()),
                    ],
                )?;
                if changed == 0 {
                    Ok(DUPLICATE)
                } else {
                    Ok(conn.last_insert_rowid())
                }
            })
            .await
            .map_err(map_tr_err)?;

        if row_id == DUPLICATE {
            debug!(
                source = %msg.source,
                message_id = msg.message_id,
                "duplicate insert suppressed"
            );
            return Ok(DUPLICATE);
        }

        debug!(row_id, source = %msg.source, message_id = msg.message_id, "inserted message");

        // Snapshot the list before invoking so a callback may register
        // further callbacks without deadlocking on the same lock.
        let callbacks: Vec<InsertCallback> = self
            .callbacks
            .lock()
            .expect("callback lock poisoned")
            .clone();
        for (index, callback) in callbacks.iter().enumerate() {
            if let Err(e) = callback(row_id, msg) {
                warn!(index, error = %e, "post-insert callback failed");
            }
        }

        Ok(row_id)
    }

    /// Flush the WAL. Idempotent; the connection is released on drop.
    pub async fn close(&self) -> Result<(), ScribeError> {
        self.db.checkpoint().await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use scribe_core::Sender;
    use std::sync::Arc;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use tempfile::tempdir;

    async fn open_store(dir: &tempfile::TempDir) -> MessageStore {
        let path = dir.path().join("store.db");
        MessageStore::open(path.to_str().unwrap()).await.unwrap()
    }

    fn channel_msg(username: &str, message_id: i64) -> NewMessage {
        NewMessage::channel(-100, username, "Title", message_id, "body", Some(1.5), None)
    }

    fn private_msg(chat_id: i64, message_id: i64) -> NewMessage {
        NewMessage::private(
            chat_id,
            message_id,
            "hi",
            None,
            Sender {
                id: Some(7),
                username: Some("alice".into()),
                first_name: Some("Alice".into()),
            },
        )
    }

    #[tokio::test]
    async fn duplicate_channel_insert_is_suppressed() {
        let dir = tempdir().unwrap();
        let store = open_store(&dir).await;

        let first = store.insert(&channel_msg("x", 9)).await.unwrap();
        assert!(first > 0, "first insert returns a real row id");

        let second = store.insert(&channel_msg("x", 9)).await.unwrap();
        assert_eq!(second, DUPLICATE);

        let count: i64 = store
            .database()
            .connection()
            .call(|conn| -> Result<i64, rusqlite::Error> {
                let n = conn.query_row("SELECT count(*) FROM messages", [], |row| row.get(0))?;
                Ok(n)
            })
            .await
            .unwrap();
        assert_eq!(count, 1, "table holds exactly one row after the dup");
    }

    #[tokio::test]
    async fn dedup_scopes_are_independent_per_source() {
        let dir = tempdir().unwrap();
        let store = open_store(&dir).await;

        // Same message_id across the private and channel scopes: both land.
        let a = store.insert(&private_msg(5, 9)).await.unwrap();
        let b = store.insert(&channel_msg("x", 9)).await.unwrap();
        assert!(a > 0);
        assert!(b > 0);
        assert_ne!(a, b);
    }

    #[tokio::test]
    async fn duplicate_private_insert_is_suppressed() {
        let dir = tempdir().unwrap();
        let store = open_store(&dir).await;

        assert!(store.insert(&private_msg(5, 9)).await.unwrap() > 0);
        assert_eq!(store.insert(&private_msg(5, 9)).await.unwrap(), DUPLICATE);
        // A different chat with the same message id is a different key.
        assert!(store.insert(&private_msg(6, 9)).await.unwrap() > 0);
    }

    #[tokio::test]
    async fn callbacks_fire_once_per_unique_insert_in_order() {
        let dir = tempdir().unwrap();
        let store = open_store(&dir).await;

        let order = Arc::new(Mutex::new(Vec::new()));
        let first = order.clone();
        store.register_callback(move |row_id, msg| {
            first.lock().unwrap().push((1, row_id, msg.message_id));
            Ok(())
        });
        let second = order.clone();
        store.register_callback(move |row_id, msg| {
            second.lock().unwrap().push((2, row_id, msg.message_id));
            Ok(())
        });

        let row_id = store.insert(&channel_msg("x", 1)).await.unwrap();
        store.insert(&channel_msg("x", 1)).await.unwrap(); // duplicate

        let calls = order.lock().unwrap().clone();
        assert_eq!(calls, vec![(1, row_id, 1), (2, row_id, 1)]);
    }

    #[tokio::test]
    async fn failing_callback_does_not_affect_insert_or_later_callbacks() {
        let dir = tempdir().unwrap();
        let store = open_store(&dir).await;

        let invoked = Arc::new(AtomicUsize::new(0));
        store.register_callback(|_, _| Err(ScribeError::Internal("boom".into())));
        let counter = invoked.clone();
        store.register_callback(move |_, _| {
            counter.fetch_add(1, Ordering::SeqCst);
            Ok(())
        });

        let row_id = store.insert(&channel_msg("x", 2)).await.unwrap();
        assert!(row_id > 0, "insert succeeds despite the failing callback");
        assert_eq!(invoked.load(Ordering::SeqCst), 1);

        // Subsequent inserts keep proceeding.
        assert!(store.insert(&channel_msg("x", 3)).await.unwrap() > 0);
        assert_eq!(invoked.load(Ordering::SeqCst), 2);
    }

    #[tokio::test]
    async fn callback_may_register_further_callbacks() {
        let dir = tempdir().unwrap();
        let store = Arc::new(open_store(&dir).await);

        let late_calls = Arc::new(AtomicUsize::new(0));
        let registrar = {
            let store = store.clone();
            let late_calls = late_calls.clone();
            move |_: i64, _: &NewMessage| {
                let late_calls = late_calls.clone();
                store.register_callback(move |_, _| {
                    late_calls.fetch_add(1, Ordering::SeqCst);
                    Ok(())
                });
                Ok(())
            }
        };
        store.register_callback(registrar);

        // Registering from within a callback must not deadlock, and the
        // new callback only sees later inserts.
        store.insert(&channel_msg("x", 1)).await.unwrap();
        assert_eq!(late_calls.load(Ordering::SeqCst), 0);

        store.insert(&channel_msg("x", 2)).await.unwrap();
        assert_eq!(late_calls.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn close_is_idempotent() {
        let dir = tempdir().unwrap();
        let store = open_store(&dir).await;
        store.insert(&channel_msg("x", 1)).await.unwrap();
        store.close().await.unwrap();
        store.close().await.unwrap();
    }
}
