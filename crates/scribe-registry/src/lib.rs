// SPDX-FileCopyrightText: 2026 Scribe Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Registry of monitored channels plus the global ingestion flag.
//!
//! One registry instance is shared (via `Arc`) by the ingestion pipeline
//! and the command dispatcher. Every successful mutation persists the full
//! snapshot synchronously before returning, so a crash immediately after a
//! mutation never loses it. Load and save failures degrade to warnings:
//! the in-memory state stays authoritative and the process never dies over
//! a bad or missing persist file.

use std::collections::HashSet;
use std::path::{Path, PathBuf};
use std::sync::Mutex;

use serde::{Deserialize, Serialize};
use tracing::{debug, info, warn};

use scribe_core::ScribeError;

/// Persisted form of the registry: channel set plus the enabled flag.
#[derive(Debug, Serialize, Deserialize)]
struct RegistrySnapshot {
    #[serde(default)]
    channels: Vec<String>,
    #[serde(default = "default_enabled")]
    enabled: bool,
}

fn default_enabled() -> bool {
    true
}

#[derive(Debug)]
struct RegistryState {
    enabled: bool,
    channels: HashSet<String>,
}

/// Set of active channel usernames with a global enable/disable flag,
/// mirrored to a small JSON document on every mutation.
///
/// Usernames are matched exactly; callers own any canonicalization such as
/// stripping a leading `@`.
#[derive(Debug)]
pub struct ChannelRegistry {
    persist_path: PathBuf,
    state: Mutex<RegistryState>,
}

impl ChannelRegistry {
    /// Load the registry from `persist_path`.
    ///
    /// A missing or malformed file falls back to defaults
    /// (`enabled = true`, no channels) with a warning.
    pub fn load(persist_path: impl Into<PathBuf>) -> Self {
        let persist_path = persist_path.into();
        let state = match Self::read_snapshot(&persist_path) {
            Ok(Some(snapshot)) => {
                info!(
                    path = %persist_path.display(),
                    count = snapshot.channels.len(),
                    "loaded channel registry"
                );
                RegistryState {
                    enabled: snapshot.enabled,
                    channels: snapshot.channels.into_iter().collect(),
                }
            }
            Ok(None) => RegistryState {
                enabled: true,
                channels: HashSet::new(),
            },
            Err(e) => {
                warn!(
                    path = %persist_path.display(),
                    error = %e,
                    "failed to load channel registry, using defaults"
                );
                RegistryState {
                    enabled: true,
                    channels: HashSet::new(),
                }
            }
        };
        Self {
            persist_path,
            state: Mutex::new(state),
        }
    }

    fn read_snapshot(path: &Path) -> Result<Option<RegistrySnapshot>, ScribeError> {
        if !path.exists() {
            return Ok(None);
        }
        let content = std::fs::read_to_string(path).map_err(|e| ScribeError::Storage {
            source: Box::new(e),
        })?;
        let snapshot = serde_json::from_str(&content).map_err(|e| ScribeError::Storage {
            source: Box::new(e),
        })?;
        Ok(Some(snapshot))
    }

    /// Add a channel. Returns true if it was newly added (and persisted),
    /// false if it was already present (no-op, no persist).
    pub fn add(&self, username: &str) -> bool {
        let mut state = self.state.lock().expect("registry lock poisoned");
        if !state.channels.insert(username.to_string()) {
            debug!(username, "channel already in registry");
            return false;
        }
        self.save(&state);
        info!(username, "added channel");
        true
    }

    /// Remove a channel. Returns true if it was present (and the removal
    /// persisted), false if absent.
    pub fn remove(&self, username: &str) -> bool {
        let mut state = self.state.lock().expect("registry lock poisoned");
        if !state.channels.remove(username) {
            debug!(username, "channel not in registry");
            return false;
        }
        self.save(&state);
        info!(username, "removed channel");
        true
    }

    /// Enable ingestion globally. Returns true only if the flag changed.
    pub fn enable(&self) -> bool {
        let mut state = self.state.lock().expect("registry lock poisoned");
        if state.enabled {
            debug!("ingestion already enabled");
            return false;
        }
        state.enabled = true;
        self.save(&state);
        info!("ingestion enabled");
        true
    }

    /// Disable ingestion globally. Returns true only if the flag changed.
    pub fn disable(&self) -> bool {
        let mut state = self.state.lock().expect("registry lock poisoned");
        if !state.enabled {
            debug!("ingestion already disabled");
            return false;
        }
        state.enabled = false;
        self.save(&state);
        info!("ingestion disabled");
        true
    }

    /// Whether messages from `username` should be ingested right now.
    pub fn is_active(&self, username: &str) -> bool {
        let state = self.state.lock().expect("registry lock poisoned");
        state.enabled && state.channels.contains(username)
    }

    /// The global ingestion flag. Private messages are gated on this alone.
    pub fn enabled(&self) -> bool {
        self.state.lock().expect("registry lock poisoned").enabled
    }

    /// Snapshot of the channel set, in no particular order.
    pub fn channels(&self) -> Vec<String> {
        let state = self.state.lock().expect("registry lock poisoned");
        state.channels.iter().cloned().collect()
    }

    /// Persist the current state, logging (not raising) on failure so the
    /// mutation's boolean contract is never conflated with I/O errors.
    fn save(&self, state: &RegistryState) {
        if let Err(e) = self.write_snapshot(state) {
            warn!(
                path = %self.persist_path.display(),
                error = %e,
                "failed to save channel registry"
            );
        }
    }

    fn write_snapshot(&self, state: &RegistryState) -> Result<(), ScribeError> {
        if let Some(parent) = self.persist_path.parent()
            && !parent.as_os_str().is_empty()
        {
            std::fs::create_dir_all(parent).map_err(|e| ScribeError::Storage {
                source: Box::new(e),
            })?;
        }
        let snapshot = RegistrySnapshot {
            channels: state.channels.iter().cloned().collect(),
            enabled: state.enabled,
        };
        let json =
            serde_json::to_string_pretty(&snapshot).map_err(|e| ScribeError::Storage {
                source: Box::new(e),
            })?;
        std::fs::write(&self.persist_path, json).map_err(|e| ScribeError::Storage {
            source: Box::new(e),
        })?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    fn registry_in(dir: &tempfile::TempDir) -> ChannelRegistry {
        ChannelRegistry::load(dir.path().join("channels.json"))
    }

    #[test]
    fn missing_file_loads_defaults() {
        let dir = tempdir().unwrap();
        let registry = registry_in(&dir);
        assert!(registry.enabled());
        assert!(registry.channels().is_empty());
    }

    #[test]
    fn corrupt_file_loads_defaults() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("channels.json");
        std::fs::write(&path, "{not json").unwrap();

        let registry = ChannelRegistry::load(&path);
        assert!(registry.enabled());
        assert!(registry.channels().is_empty());
    }

    #[test]
    fn add_is_idempotent_and_persists_once() {
        let dir = tempdir().unwrap();
        let registry = registry_in(&dir);

        assert!(registry.add("x"));
        assert!(!registry.add("x"));

        let content =
            std::fs::read_to_string(dir.path().join("channels.json")).unwrap();
        let snapshot: RegistrySnapshot = serde_json::from_str(&content).unwrap();
        assert_eq!(snapshot.channels, vec!["x".to_string()]);
        assert!(snapshot.enabled);
    }

    #[test]
    fn remove_reports_presence() {
        let dir = tempdir().unwrap();
        let registry = registry_in(&dir);

        assert!(!registry.remove("ghost"));
        registry.add("news");
        assert!(registry.remove("news"));
        assert!(!registry.remove("news"));
    }

    #[test]
    fn disable_overrides_membership() {
        let dir = tempdir().unwrap();
        let registry = registry_in(&dir);

        registry.add("x");
        assert!(registry.is_active("x"));

        assert!(registry.disable());
        assert!(!registry.is_active("x"));
        assert!(!registry.disable(), "second disable is a no-op");

        assert!(registry.enable());
        assert!(registry.is_active("x"));
    }

    #[test]
    fn mutations_survive_reload() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("channels.json");

        {
            let registry = ChannelRegistry::load(&path);
            registry.add("alpha");
            registry.add("beta");
            registry.disable();
        }

        let reloaded = ChannelRegistry::load(&path);
        assert!(!reloaded.enabled());
        let mut channels = reloaded.channels();
        channels.sort();
        assert_eq!(channels, vec!["alpha".to_string(), "beta".to_string()]);
    }

    #[test]
    fn is_active_requires_membership() {
        let dir = tempdir().unwrap();
        let registry = registry_in(&dir);
        assert!(!registry.is_active("unknown"));
    }
}
