// SPDX-FileCopyrightText: 2026 Scribe Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Operator query tool: tabular readout of stored messages.

use clap::Args;

use scribe_config::ScribeConfig;
use scribe_core::{ScribeError, StoredMessage};
use scribe_storage::{Database, MessageFilter, recent_messages};

/// Arguments for `scribe query`.
#[derive(Args, Debug)]
pub struct QueryArgs {
    /// Filter by channel username (e.g. news)
    #[arg(long)]
    pub channel: Option<String>,

    /// Filter by source type
    #[arg(long, value_parser = ["channel", "private"])]
    pub source: Option<String>,

    /// Substring search against message text
    #[arg(long)]
    pub search: Option<String>,

    /// Only messages created on or after this date (YYYY-MM-DD)
    #[arg(long)]
    pub since: Option<String>,

    /// Maximum number of results
    #[arg(long, default_value_t = 20)]
    pub limit: i64,

    /// Path to the database (defaults to storage.database_path)
    #[arg(long)]
    pub db: Option<String>,
}

/// Runs the query subcommand against an existing database.
pub async fn run_query(config: &ScribeConfig, args: QueryArgs) -> Result<(), ScribeError> {
    let db_path = args
        .db
        .clone()
        .unwrap_or_else(|| config.storage.database_path.clone());

    if !std::path::Path::new(&db_path).exists() {
        return Err(ScribeError::Config(format!("database not found: {db_path}")));
    }

    let db = Database::open(&db_path).await?;
    let filter = MessageFilter {
        channel: args.channel,
        source: args.source,
        search: args.search,
        since: args.since,
        limit: args.limit,
    };
    let rows = recent_messages(&db, filter).await?;

    if rows.is_empty() {
        println!("No messages found");
        return Ok(());
    }

    println!(
        "{:<6} | {:<10} | {:<20} | {:<50} | {:<19}",
        "ID", "Source", "Channel/From", "Text", "Time"
    );
    println!("{}", "-".repeat(116));
    for row in &rows {
        println!("{}", format_row(row));
    }
    println!("\nTotal: {} messages", rows.len());

    Ok(())
}

fn format_row(row: &StoredMessage) -> String {
    let channel_or_user = row
        .channel_username
        .as_deref()
        .or(row.from_username.as_deref())
        .unwrap_or("?");
    let time = row.created_at.get(..19).unwrap_or(&row.created_at);
    format!(
        "{:<6} | {:<10} | {:<20} | {:<50} | {:<19}",
        row.id,
        row.source,
        channel_or_user,
        preview(row.text.as_deref().unwrap_or("")),
        time
    )
}

/// Truncate long message text for single-line display.
fn preview(text: &str) -> String {
    const MAX: usize = 45;
    if text.chars().count() > MAX {
        let cut: String = text.chars().take(MAX).collect();
        format!("{cut}...")
    } else {
        text.to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn row(text: &str) -> StoredMessage {
        StoredMessage {
            id: 3,
            source: "channel".into(),
            channel_id: Some(-1),
            channel_username: Some("news".into()),
            channel_title: None,
            chat_id: None,
            message_id: 9,
            text: Some(text.into()),
            timestamp: None,
            from_user_id: None,
            from_username: None,
            from_first_name: None,
            created_at: "2026-02-01 10:30:00".into(),
        }
    }

    #[test]
    fn preview_truncates_long_text() {
        let long = "x".repeat(60);
        let shown = preview(&long);
        assert!(shown.ends_with("..."));
        assert_eq!(shown.chars().count(), 48);
        assert_eq!(preview("short"), "short");
    }

    #[test]
    fn format_row_prefers_channel_over_sender() {
        let line = format_row(&row("hello"));
        assert!(line.contains("news"));
        assert!(line.contains("hello"));
        assert!(line.contains("2026-02-01 10:30:00"));
    }

    #[test]
    fn format_row_falls_back_to_question_mark() {
        let mut r = row("hi");
        r.channel_username = None;
        let line = format_row(&r);
        assert!(line.contains(" ? "));
    }
}
