//! Repository configuration
//!
//! The mapping from canonical role names to wire filenames, the `_type`
//! names, and the default expiry windows are all properties of a
//! repository, carried as a plain value threaded through the repository
//! state and the client rather than process-wide mutable state.

use crate::expiry;
use crate::role::{base_role, ROLE_ROOT, ROLE_SNAPSHOT, ROLE_TARGETS, ROLE_TIMESTAMP};
use chrono::{Duration, Utc};
use std::collections::BTreeMap;

/// Per-repository configuration, fixed for the repository's lifetime
#[derive(Debug, Clone)]
pub struct Config {
    role_files: BTreeMap<String, String>,
    type_names: BTreeMap<String, String>,
    expiry_windows: BTreeMap<String, Duration>,
}

impl Default for Config {
    fn default() -> Self {
        let mut role_files = BTreeMap::new();
        let mut type_names = BTreeMap::new();
        for role in [ROLE_ROOT, ROLE_TARGETS, ROLE_SNAPSHOT, ROLE_TIMESTAMP] {
            role_files.insert(role.to_string(), format!("{role}.json"));
            type_names.insert(role.to_string(), role.to_string());
        }
        let mut expiry_windows = BTreeMap::new();
        expiry_windows.insert(ROLE_ROOT.to_string(), Duration::days(365));
        expiry_windows.insert(ROLE_TARGETS.to_string(), Duration::days(90));
        expiry_windows.insert(ROLE_SNAPSHOT.to_string(), Duration::days(7));
        expiry_windows.insert(ROLE_TIMESTAMP.to_string(), Duration::days(1));
        Config {
            role_files,
            type_names,
            expiry_windows,
        }
    }
}

impl Config {
    pub fn new() -> Self {
        Self::default()
    }

    /// Override the wire filename for a role (e.g. a legacy
    /// `release.txt` snapshot).
    pub fn with_role_file(mut self, role: impl Into<String>, file: impl Into<String>) -> Self {
        self.role_files.insert(role.into().to_lowercase(), file.into());
        self
    }

    /// Override the `_type` value expected for a role.
    pub fn with_type_name(mut self, role: impl Into<String>, name: impl Into<String>) -> Self {
        self.type_names.insert(role.into().to_lowercase(), name.into());
        self
    }

    /// Override the default expiry window for a role.
    pub fn with_expiry_window(mut self, role: impl Into<String>, window: Duration) -> Self {
        self.expiry_windows
            .insert(role.into().to_lowercase(), window);
        self
    }

    /// The key under which a role's file appears in Snapshot/Timestamp
    /// `meta` maps, and the filename it is published under.
    pub fn meta_entry(&self, role: &str) -> String {
        self.role_files
            .get(role)
            .cloned()
            .unwrap_or_else(|| format!("{role}.json"))
    }

    /// The `_type` value expected when verifying the given role.
    /// Delegated `targets/<path>` roles expect the targets type.
    pub fn type_name(&self, role: &str) -> String {
        let base = base_role(role);
        self.type_names
            .get(base)
            .cloned()
            .unwrap_or_else(|| base.to_string())
    }

    /// Whether the given `_type` value belongs to any configured role.
    pub fn valid_type(&self, typ: &str) -> bool {
        self.type_names.values().any(|v| v == typ)
    }

    /// Default `expires` string for freshly built metadata of a role.
    pub fn default_expires(&self, role: &str) -> String {
        let window = self
            .expiry_windows
            .get(base_role(role))
            .copied()
            .unwrap_or_else(|| Duration::days(365));
        expiry::format(Utc::now() + window)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_meta_entries() {
        let config = Config::default();
        assert_eq!(config.meta_entry("snapshot"), "snapshot.json");
        assert_eq!(config.meta_entry("targets/a"), "targets/a.json");
    }

    #[test]
    fn test_legacy_role_file() {
        let config = Config::default().with_role_file("snapshot", "release.txt");
        assert_eq!(config.meta_entry("snapshot"), "release.txt");
        assert_eq!(config.meta_entry("root"), "root.json");
    }

    #[test]
    fn test_type_names() {
        let config = Config::default();
        assert_eq!(config.type_name("root"), "root");
        assert_eq!(config.type_name("targets/releases"), "targets");
        assert!(config.valid_type("snapshot"));
        assert!(!config.valid_type("mirror"));
    }

    #[test]
    fn test_default_expires_ordering() {
        let config = Config::default();
        let timestamp = config.default_expires("timestamp");
        let root = config.default_expires("root");
        // Windows: timestamp one day, root one year.
        assert!(timestamp < root);
        assert!(crate::expiry::parse(&timestamp).is_some());
    }
}
