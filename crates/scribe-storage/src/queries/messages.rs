// SPDX-FileCopyrightText: 2026 Scribe Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Read-only message queries for the operator query tool.

use rusqlite::ToSql;
use rusqlite::params_from_iter;

use scribe_core::{ScribeError, StoredMessage};

use crate::database::{Database, map_tr_err};

/// Filters for [`recent_messages`]. Unset fields match everything.
#[derive(Debug, Clone, Default)]
pub struct MessageFilter {
    /// Exact channel username.
    pub channel: Option<String>,
    /// Source kind: `channel` or `private`.
    pub source: Option<String>,
    /// Substring match against the message text.
    pub search: Option<String>,
    /// Lower bound on `DATE(created_at)`, as `YYYY-MM-DD`.
    pub since: Option<String>,
    /// Maximum number of rows, newest first.
    pub limit: i64,
}

impl MessageFilter {
    pub fn with_limit(limit: i64) -> Self {
        Self {
            limit,
            ..Self::default()
        }
    }
}

/// Fetch the most recent messages matching `filter`, newest first.
pub async fn recent_messages(
    db: &Database,
    filter: MessageFilter,
) -> Result<Vec<StoredMessage>, ScribeError> {
    db.connection()
        .call(move |conn| {
            let mut clauses: Vec<&str> = Vec::new();
            let mut params: Vec<Box<dyn ToSql>> = Vec::new();

            if let Some(source) = &filter.source {
                clauses.push("source = ?");
                params.push(Box::new(source.clone()));
            }
            if let Some(channel) = &filter.channel {
                clauses.push("channel_username = ?");
                params.push(Box::new(channel.clone()));
            }
            if let Some(search) = &filter.search {
                clauses.push("text LIKE ?");
                params.push(Box::new(format!("%{search}%")));
            }
            if let Some(since) = &filter.since {
                clauses.push("DATE(created_at) >= ?");
                params.push(Box::new(since.clone()));
            }

            let where_clause = if clauses.is_empty() {
                "1=1".to_string()
            } else {
                clauses.join(" AND ")
            };
            params.push(Box::new(filter.limit));

            let sql = format!(
                "SELECT id, source, channel_id, channel_username, channel_title,
                        chat_id, message_id, text, timestamp,
                        from_user_id, from_username, from_first_name, created_at
                 FROM messages
                 WHERE {where_clause}
                 ORDER BY created_at DESC, id DESC
                 LIMIT ?"
            );

            let mut stmt = conn.prepare(&sql)?;
            let rows = stmt.query_map(params_from_iter(params.iter().map(|p| p.as_ref())), |row| {
                Ok(StoredMessage {
                    id: row.get(0)?,
                    source: row.get(1)?,
                    channel_id: row.get(2)?,
                    channel_username: row.get(3)?,
                    channel_title: row.get(4)?,
                    chat_id: row.get(5)?,
                    message_id: row.get(6)?,
                    text: row.get(7)?,
                    timestamp: row.get(8)?,
                    from_user_id: row.get(9)?,
                    from_username: row.get(10)?,
                    from_first_name: row.get(11)?,
                    created_at: row.get(12)?,
                })
            })?;

            let mut messages = Vec::new();
            for row in rows {
                messages.push(row?);
            }
            Ok(messages)
        })
        .await
        .map_err(map_tr_err)
}
