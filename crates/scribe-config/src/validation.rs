// SPDX-FileCopyrightText: 2026 Scribe Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Post-deserialization validation for configuration values.
//!
//! Validates semantic constraints that cannot be expressed via serde
//! attributes, such as non-empty paths and a well-formed gateway URL.

use crate::diagnostic::ConfigError;
use crate::model::ScribeConfig;

/// Validate a deserialized configuration for semantic correctness.
///
/// Returns `Ok(())` if all validations pass, or `Err(Vec<ConfigError>)`
/// with all collected validation errors (does not fail fast).
pub fn validate_config(config: &ScribeConfig) -> Result<(), Vec<ConfigError>> {
    let mut errors = Vec::new();

    if config.storage.database_path.trim().is_empty() {
        errors.push(ConfigError::Validation {
            message: "storage.database_path must not be empty".to_string(),
        });
    }

    if config.registry.persist_path.trim().is_empty() {
        errors.push(ConfigError::Validation {
            message: "registry.persist_path must not be empty".to_string(),
        });
    }

    let url = config.gateway.url.trim();
    if url.is_empty() {
        errors.push(ConfigError::Validation {
            message: "gateway.url must not be empty".to_string(),
        });
    } else if !url.starts_with("ws://") && !url.starts_with("wss://") {
        errors.push(ConfigError::Validation {
            message: format!("gateway.url `{url}` must use the ws:// or wss:// scheme"),
        });
    }

    let level = config.agent.log_level.as_str();
    if !matches!(level, "trace" | "debug" | "info" | "warn" | "error") {
        errors.push(ConfigError::Validation {
            message: format!(
                "agent.log_level `{level}` is not one of trace, debug, info, warn, error"
            ),
        });
    }

    if errors.is_empty() { Ok(()) } else { Err(errors) }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_config_is_valid() {
        assert!(validate_config(&ScribeConfig::default()).is_ok());
    }

    #[test]
    fn bad_gateway_scheme_is_rejected() {
        let mut config = ScribeConfig::default();
        config.gateway.url = "http://example.com".into();
        let errors = validate_config(&config).unwrap_err();
        assert!(errors.iter().any(|e| e.to_string().contains("gateway.url")));
    }

    #[test]
    fn all_errors_are_collected() {
        let mut config = ScribeConfig::default();
        config.storage.database_path = " ".into();
        config.registry.persist_path = "".into();
        config.agent.log_level = "loud".into();
        let errors = validate_config(&config).unwrap_err();
        assert_eq!(errors.len(), 3, "validation must not fail fast: {errors:?}");
    }
}
