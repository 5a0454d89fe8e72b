// SPDX-FileCopyrightText: 2026 Scribe Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Scribe - a Telegram message ingestion agent.
//!
//! This is the binary entry point for the Scribe agent.

mod query;
mod run;

use clap::{Parser, Subcommand};

/// Scribe - a Telegram message ingestion agent.
#[derive(Parser, Debug)]
#[command(name = "scribe", version, about, long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Option<Commands>,
}

/// Available subcommands.
#[derive(Subcommand, Debug)]
enum Commands {
    /// Start the ingestion agent.
    Run,
    /// Query stored messages.
    Query(query::QueryArgs),
}

#[tokio::main]
async fn main() {
    let cli = Cli::parse();

    // Load and validate configuration at startup
    let config = match scribe_config::load_and_validate() {
        Ok(config) => config,
        Err(errors) => {
            scribe_config::render_errors(&errors);
            std::process::exit(1);
        }
    };

    let result = match cli.command {
        Some(Commands::Run) => run::run_agent(config).await,
        Some(Commands::Query(args)) => query::run_query(&config, args).await,
        None => {
            println!("scribe: use --help for available commands");
            Ok(())
        }
    };

    if let Err(e) = result {
        eprintln!("scribe: {e}");
        std::process::exit(1);
    }
}

#[cfg(test)]
mod tests {
    use clap::Parser;

    #[test]
    fn binary_loads_config_defaults() {
        // Verify config loads with defaults (no config file needed)
        let config = scribe_config::load_and_validate().expect("default config should be valid");
        assert_eq!(config.agent.name, "scribe");
    }

    #[test]
    fn query_args_parse() {
        let cli = super::Cli::parse_from([
            "scribe", "query", "--channel", "news", "--source", "channel", "--limit", "5",
        ]);
        let Some(super::Commands::Query(args)) = cli.command else {
            panic!("expected query subcommand");
        };
        assert_eq!(args.channel.as_deref(), Some("news"));
        assert_eq!(args.limit, 5);
    }
}
