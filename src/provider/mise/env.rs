//! Environment activation through `mise env`

use std::collections::BTreeMap;

use super::MiseProvider;
use crate::domain::{EnvironmentActivation, ToolInstallResult};
use crate::error::ProviderError;
use crate::provider::exec::CommandRunner;

/// Turn `mise env --json` output into an activation.
///
/// mise returns a whole new `PATH` with the tool directories in front.
/// `PATH` is removed from the variables and only its entries that are not
/// already on `process_path` are contributed, in order and without duplicates.
pub fn process_env_output(
    mut envs: BTreeMap<String, String>,
    process_path: &str,
) -> EnvironmentActivation {
    let mise_path = envs.remove("PATH").unwrap_or_default();
    let process_entries: Vec<&str> = process_path.split(':').collect();

    let mut activation = EnvironmentActivation {
        contributed_env_vars: envs,
        contributed_paths: Vec::new(),
    };
    for entry in mise_path.split(':') {
        if !entry.is_empty() && !process_entries.contains(&entry) {
            activation = activation.with_path(entry);
        }
    }
    activation
}

impl<R: CommandRunner> MiseProvider<R> {
    /// Raw `mise env` variables for an installed version
    pub(super) fn tool_env(
        &self,
        result: &ToolInstallResult,
    ) -> Result<BTreeMap<String, String>, ProviderError> {
        const OPERATION: &str = "compute tool environment";

        let tool_version = format!("{}@{}", result.tool_name, result.concrete_version);
        // --quiet keeps warnings out of the JSON
        let output = self.run_mise(OPERATION, &["env", "--quiet", "--json", &tool_version])?;
        serde_json::from_str(&output.stdout).map_err(|e| {
            ProviderError::parse(OPERATION, format!("{}\n{}", e, output.stdout.trim()))
        })
    }
}
