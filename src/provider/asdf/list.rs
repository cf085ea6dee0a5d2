//! Installed and released version listings

use std::path::PathBuf;
use tracing::debug;

use super::{AsdfProvider, LIST_ALL_SUBCOMMAND_SINCE};
use crate::error::{ExecError, ProviderError};
use crate::provider::exec::CommandRunner;

/// Messages asdf prints instead of a list when nothing is installed
const NO_VERSIONS_MARKERS: [&str; 2] = ["No versions installed", "No compatible versions installed"];

/// Parse `asdf list` / `asdf list all` output.
///
/// There is no machine-readable format. Lines look like:
/// ```text
///   1.21.11
///  *1.22.0
///   1.23
/// ```
/// The `*` marks the current version and is dropped.
pub fn parse_version_list(output: &str) -> Vec<String> {
    output
        .lines()
        .map(|line| line.trim().replacen('*', "", 1).trim().to_string())
        .filter(|line| !line.is_empty() && !is_no_versions_message(line))
        .collect()
}

/// Returns true if the output says no versions are installed
pub fn is_no_versions_message(output: &str) -> bool {
    NO_VERSIONS_MARKERS.iter().any(|marker| output.contains(marker))
}

impl<R: CommandRunner> AsdfProvider<R> {
    pub(super) fn installed_versions(&self, tool_name: &str) -> Result<Vec<String>, ProviderError> {
        const OPERATION: &str = "list installed versions";

        let output = self.run_asdf_unchecked(OPERATION, &["list", tool_name])?;
        if !output.success {
            // asdf 0.16+ exits with 1 when nothing is installed
            if is_no_versions_message(&output.combined()) {
                return Ok(Vec::new());
            }
            return Err(ProviderError::command(
                OPERATION,
                ExecError::Failed {
                    command: format!("asdf list {}", tool_name),
                    code: output.code,
                    output: output.combined(),
                },
            ));
        }

        self.without_aliases(tool_name, parse_version_list(&output.stdout))
    }

    pub(super) fn released_versions(&self, tool_name: &str) -> Result<Vec<String>, ProviderError> {
        let args = if *self.bootstrapped_version()? >= LIST_ALL_SUBCOMMAND_SINCE {
            vec!["list", "all", tool_name]
        } else {
            vec!["list-all", tool_name]
        };
        let output = self.run_asdf("list released versions", &args)?;
        Ok(parse_version_list(&output.stdout))
    }

    /// Drop versions whose install directory is a symlink created by asdf-alias
    fn without_aliases(
        &self,
        tool_name: &str,
        versions: Vec<String>,
    ) -> Result<Vec<String>, ProviderError> {
        let mut kept = Vec::with_capacity(versions.len());
        for version in versions {
            let output = self.run_asdf("locate installed version", &["where", tool_name, &version])?;
            let install_dir = PathBuf::from(output.stdout.trim());
            let metadata = std::fs::symlink_metadata(&install_dir).map_err(|e| {
                ProviderError::parse(
                    "filter alias versions",
                    format!("{}: {}", install_dir.display(), e),
                )
            })?;

            if metadata.file_type().is_symlink() {
                debug!(tool = tool_name, version = %version, "skipping alias version");
                continue;
            }
            kept.push(version);
        }
        Ok(kept)
    }
}
