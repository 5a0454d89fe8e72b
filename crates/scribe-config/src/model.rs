// SPDX-FileCopyrightText: 2026 Scribe Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Configuration model structs for the Scribe ingestion agent.
//!
//! All structs use `#[serde(deny_unknown_fields)]` to reject unrecognized
//! config keys at startup with actionable error messages.

use serde::{Deserialize, Serialize};

/// Top-level Scribe configuration.
///
/// Loaded from TOML files following the XDG hierarchy, with environment
/// variable overrides. All sections are optional and default to sensible
/// values; only the credentials have no usable default.
#[derive(Debug, Clone, Default, Deserialize, Serialize)]
#[serde(deny_unknown_fields)]
pub struct ScribeConfig {
    /// Agent identity and logging settings.
    #[serde(default)]
    pub agent: AgentConfig,

    /// Telegram messaging-source settings.
    #[serde(default)]
    pub telegram: TelegramConfig,

    /// Control-plane gateway connection settings.
    #[serde(default)]
    pub gateway: GatewayConfig,

    /// Message storage settings.
    #[serde(default)]
    pub storage: StorageConfig,

    /// Channel registry persistence settings.
    #[serde(default)]
    pub registry: RegistryConfig,
}

/// Agent identity and logging configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(deny_unknown_fields)]
pub struct AgentConfig {
    /// Display name of the agent, used in log output.
    #[serde(default = "default_agent_name")]
    pub name: String,

    /// Logging level (trace, debug, info, warn, error).
    #[serde(default = "default_log_level")]
    pub log_level: String,
}

impl Default for AgentConfig {
    fn default() -> Self {
        Self {
            name: default_agent_name(),
            log_level: default_log_level(),
        }
    }
}

fn default_agent_name() -> String {
    "scribe".to_string()
}

fn default_log_level() -> String {
    "info".to_string()
}

/// Telegram messaging-source configuration.
#[derive(Debug, Clone, Default, Deserialize, Serialize)]
#[serde(deny_unknown_fields)]
pub struct TelegramConfig {
    /// Telegram Bot API token. Required for `scribe run`.
    #[serde(default)]
    pub bot_token: Option<String>,
}

/// Control-plane gateway configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(deny_unknown_fields)]
pub struct GatewayConfig {
    /// WebSocket URL of the operator gateway.
    #[serde(default = "default_gateway_url")]
    pub url: String,

    /// Shared secret keying the connect-handshake signature.
    /// Required for `scribe run`.
    #[serde(default)]
    pub token: Option<String>,
}

impl Default for GatewayConfig {
    fn default() -> Self {
        Self {
            url: default_gateway_url(),
            token: None,
        }
    }
}

fn default_gateway_url() -> String {
    "ws://127.0.0.1:18789/ws".to_string()
}

/// Message storage configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(deny_unknown_fields)]
pub struct StorageConfig {
    /// Path to the SQLite database file.
    #[serde(default = "default_database_path")]
    pub database_path: String,
}

impl Default for StorageConfig {
    fn default() -> Self {
        Self {
            database_path: default_database_path(),
        }
    }
}

fn default_database_path() -> String {
    "scribe.db".to_string()
}

/// Channel registry persistence configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(deny_unknown_fields)]
pub struct RegistryConfig {
    /// Path to the JSON document mirroring the registry state.
    #[serde(default = "default_persist_path")]
    pub persist_path: String,
}

impl Default for RegistryConfig {
    fn default() -> Self {
        Self {
            persist_path: default_persist_path(),
        }
    }
}

fn default_persist_path() -> String {
    "channels.json".to_string()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_are_usable() {
        let config = ScribeConfig::default();
        assert_eq!(config.agent.name, "scribe");
        assert_eq!(config.agent.log_level, "info");
        assert_eq!(config.storage.database_path, "scribe.db");
        assert_eq!(config.registry.persist_path, "channels.json");
        assert!(config.gateway.url.starts_with("ws://"));
        assert!(config.telegram.bot_token.is_none());
        assert!(config.gateway.token.is_none());
    }
}
