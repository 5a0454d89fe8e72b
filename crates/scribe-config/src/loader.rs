// SPDX-FileCopyrightText: 2026 Scribe Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Configuration loader using Figment for layered config merging.
//!
//! Supports XDG hierarchy: `./scribe.toml` > `~/.config/scribe/scribe.toml`
//! > `/etc/scribe/scribe.toml` with environment variable overrides via the
//! `SCRIBE_` prefix.

// figment::Error is external and cannot be boxed without a wrapper.
#![allow(clippy::result_large_err)]

use std::path::Path;

use figment::{
    Figment,
    providers::{Env, Format, Serialized, Toml},
};

use crate::model::ScribeConfig;

/// Load configuration from the standard XDG hierarchy with env var overrides.
///
/// Merge order (later overrides earlier):
/// 1. Compiled defaults
/// 2. `/etc/scribe/scribe.toml` (system-wide)
/// 3. `~/.config/scribe/scribe.toml` (user XDG config)
/// 4. `./scribe.toml` (local directory)
/// 5. `SCRIBE_*` environment variables
pub fn load_config() -> Result<ScribeConfig, figment::Error> {
    Figment::new()
        .merge(Serialized::defaults(ScribeConfig::default()))
        .merge(Toml::file("/etc/scribe/scribe.toml"))
        .merge(Toml::file(
            dirs::config_dir()
                .map(|d| d.join("scribe/scribe.toml"))
                .unwrap_or_default(),
        ))
        .merge(Toml::file("scribe.toml"))
        .merge(env_provider())
        .extract()
}

/// Load configuration from a TOML string only (no XDG lookup, no env).
///
/// Used for testing and explicit config specification.
pub fn load_config_from_str(toml_content: &str) -> Result<ScribeConfig, figment::Error> {
    Figment::new()
        .merge(Serialized::defaults(ScribeConfig::default()))
        .merge(Toml::string(toml_content))
        .extract()
}

/// Load configuration from a specific file path with env var overrides.
pub fn load_config_from_path(path: &Path) -> Result<ScribeConfig, figment::Error> {
    Figment::new()
        .merge(Serialized::defaults(ScribeConfig::default()))
        .merge(Toml::file(path))
        .merge(env_provider())
        .extract()
}

/// Create the environment variable provider using explicit `map()` for
/// section-to-dot mapping.
///
/// Uses `Env::map()` NOT `Env::split("_")` to avoid ambiguity with
/// underscore-containing key names: `SCRIBE_TELEGRAM_BOT_TOKEN` must map to
/// `telegram.bot_token`, not `telegram.bot.token`.
fn env_provider() -> Env {
    Env::prefixed("SCRIBE_").map(|key| {
        // `key` is the lowercased env var name with the prefix stripped,
        // e.g. SCRIBE_TELEGRAM_BOT_TOKEN -> "telegram_bot_token".
        let key_str = key.as_str();
        let mapped = key_str
            .replacen("agent_", "agent.", 1)
            .replacen("telegram_", "telegram.", 1)
            .replacen("gateway_", "gateway.", 1)
            .replacen("storage_", "storage.", 1)
            .replacen("registry_", "registry.", 1);
        mapped.into()
    })
}
