//! Results of installing and activating a tool

use serde::Serialize;
use std::collections::BTreeMap;

/// Outcome of a successful install request
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ToolInstallResult {
    /// Canonical tool name
    pub tool_name: String,
    /// True if no install command had to run
    pub is_already_installed: bool,
    /// The concrete version the request resolved to. May or may not be semver.
    pub concrete_version: String,
}

impl ToolInstallResult {
    /// Result for a version that was already on disk
    pub fn already_installed(tool_name: impl Into<String>, version: impl Into<String>) -> Self {
        Self {
            tool_name: tool_name.into(),
            is_already_installed: true,
            concrete_version: version.into(),
        }
    }

    /// Result for a version that was installed just now
    pub fn newly_installed(tool_name: impl Into<String>, version: impl Into<String>) -> Self {
        Self {
            tool_name: tool_name.into(),
            is_already_installed: false,
            concrete_version: version.into(),
        }
    }
}

/// Environment changes needed to make an installed tool version active
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct EnvironmentActivation {
    /// Variables to set, excluding `PATH`
    pub contributed_env_vars: BTreeMap<String, String>,
    /// Entries to put on `PATH`, highest priority first
    pub contributed_paths: Vec<String>,
}

impl EnvironmentActivation {
    /// Create an empty activation
    pub fn new() -> Self {
        Self::default()
    }

    /// Add an environment variable
    pub fn with_env(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.contributed_env_vars.insert(key.into(), value.into());
        self
    }

    /// Add a `PATH` entry
    pub fn with_path(mut self, path: impl Into<String>) -> Self {
        let path = path.into();
        if !self.contributed_paths.contains(&path) {
            self.contributed_paths.push(path);
        }
        self
    }

    /// Returns true if nothing is contributed
    pub fn is_empty(&self) -> bool {
        self.contributed_env_vars.is_empty() && self.contributed_paths.is_empty()
    }

    /// Fold another tool's activation into this one.
    ///
    /// Variables from `other` win on key collisions, other keys are kept.
    /// Paths from `other` are appended unless already present.
    pub fn merge(&mut self, other: EnvironmentActivation) {
        self.contributed_env_vars.extend(other.contributed_env_vars);
        for path in other.contributed_paths {
            if !self.contributed_paths.contains(&path) {
                self.contributed_paths.push(path);
            }
        }
    }

    /// Build a new `PATH` value with the contributed entries in front of `current`.
    ///
    /// Entries of `current` that are also contributed are dropped so each
    /// directory appears once.
    pub fn prepend_to_path(&self, current: &str) -> String {
        let mut entries: Vec<&str> = self.contributed_paths.iter().map(String::as_str).collect();
        entries.extend(
            current
                .split(':')
                .filter(|p| !p.is_empty() && !self.contributed_paths.iter().any(|c| c == p)),
        );
        entries.join(":")
    }
}
