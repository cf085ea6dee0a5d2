//! Environment activation for asdf-managed tools

use std::path::PathBuf;

use super::AsdfProvider;
use crate::domain::{EnvironmentActivation, ToolInstallResult};
use crate::provider::exec::CommandRunner;

/// Name of the variable asdf reads to pick a tool version, e.g. `ASDF_NODEJS_VERSION`
pub fn version_env_var(tool_name: &str) -> String {
    format!("ASDF_{}_VERSION", tool_name.to_uppercase().replace('-', "_"))
}

impl<R: CommandRunner> AsdfProvider<R> {
    /// asdf data directory: configured, then `ASDF_DATA_DIR`, then `~/.asdf`
    pub fn data_dir(&self) -> PathBuf {
        if let Some(data_dir) = &self.settings.data_dir {
            return data_dir.clone();
        }
        if let Some(data_dir) = self.settings.env.get("ASDF_DATA_DIR") {
            return PathBuf::from(data_dir);
        }
        if let Some(data_dir) = std::env::var_os("ASDF_DATA_DIR") {
            return PathBuf::from(data_dir);
        }
        std::env::var_os("HOME")
            .map(PathBuf::from)
            .unwrap_or_default()
            .join(".asdf")
    }

    /// Directory holding the asdf shims
    pub fn shims_dir(&self) -> PathBuf {
        self.data_dir().join("shims")
    }

    pub(super) fn activation(&self, result: &ToolInstallResult) -> EnvironmentActivation {
        let mut activation = EnvironmentActivation::new()
            .with_env(version_env_var(&result.tool_name), &result.concrete_version)
            .with_path(self.shims_dir().display().to_string());

        if let Some(data_dir) = &self.settings.data_dir {
            activation = activation.with_env("ASDF_DATA_DIR", data_dir.display().to_string());
        }
        activation
    }
}
