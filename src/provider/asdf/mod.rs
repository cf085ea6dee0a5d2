//! asdf backend
//!
//! Runs the `asdf` binary directly, or through `bash -c` when a shell init
//! line is configured for classic (bash) asdf:
//!
//! ```text
//! bash -c "<shell_init> && asdf <quoted args>"
//! ```

mod activate;
mod list;
mod plugin;

pub use activate::version_env_var;
pub use list::{is_no_versions_message, parse_version_list};
pub use plugin::{parse_plugin_list, ListedPlugin};

use semver::Version;
use std::collections::BTreeMap;
use tracing::{debug, info};

use super::exec::{run_checked, CommandOutput, CommandRunner, Invocation};
use super::pipeline::{install_with, VersionManager};
use super::{require_version, ProviderKind, ToolProvider};
use crate::config::AsdfSettings;
use crate::domain::{EnvironmentActivation, ToolInstallResult, ToolRequest};
use crate::error::{ExecError, ProviderError, ToolInstallError};

/// Oldest asdf release this provider supports
const MINIMUM_VERSION: Version = Version::new(0, 14, 0);

/// First release with `asdf list all` instead of `asdf list-all`
const LIST_ALL_SUBCOMMAND_SINCE: Version = Version::new(0, 16, 0);

/// Tools whose companion executables need shims regenerated after install
const RESHIM_TOOLS: [&str; 2] = ["nodejs", "golang"];

/// Tool provider backed by asdf
pub struct AsdfProvider<R> {
    runner: R,
    settings: AsdfSettings,
    /// Set by a successful bootstrap
    asdf_version: Option<Version>,
}

impl<R: CommandRunner> AsdfProvider<R> {
    /// Create a provider. Call [`ToolProvider::bootstrap`] before use.
    pub fn new(runner: R, settings: AsdfSettings) -> Self {
        Self {
            runner,
            settings,
            asdf_version: None,
        }
    }

    pub fn settings(&self) -> &AsdfSettings {
        &self.settings
    }

    pub fn runner(&self) -> &R {
        &self.runner
    }

    /// asdf version detected during bootstrap
    pub fn asdf_version(&self) -> Option<&Version> {
        self.asdf_version.as_ref()
    }

    fn bootstrapped_version(&self) -> Result<&Version, ProviderError> {
        self.asdf_version
            .as_ref()
            .ok_or_else(|| ProviderError::not_bootstrapped(ProviderKind::Asdf.display_name()))
    }

    fn command_env(&self) -> BTreeMap<String, String> {
        let mut envs = self.settings.env.clone();
        if let Some(data_dir) = &self.settings.data_dir {
            envs.insert("ASDF_DATA_DIR".to_string(), data_dir.display().to_string());
        }
        envs
    }

    fn invocation(&self, args: &[&str]) -> Result<Invocation, ProviderError> {
        let invocation = match &self.settings.shell_init {
            Some(shell_init) => {
                let command = shlex::try_join(
                    std::iter::once(self.settings.binary.as_str()).chain(args.iter().copied()),
                )
                .map_err(|e| ProviderError::parse("quote asdf arguments", e.to_string()))?;
                Invocation::new("bash", ["-c".to_string(), format!("{} && {}", shell_init, command)])
            }
            None => Invocation::new(self.settings.binary.as_str(), args.iter().copied()),
        };
        Ok(invocation.with_envs(&self.command_env()))
    }

    /// Run asdf and fail on a non-zero exit
    fn run_asdf(&self, operation: &str, args: &[&str]) -> Result<CommandOutput, ProviderError> {
        let invocation = self.invocation(args)?;
        run_checked(&self.runner, &invocation).map_err(|e| ProviderError::command(operation, e))
    }

    /// Run asdf and hand back the output whatever the exit status
    fn run_asdf_unchecked(
        &self,
        operation: &str,
        args: &[&str],
    ) -> Result<CommandOutput, ProviderError> {
        let invocation = self.invocation(args)?;
        self.runner.run(&invocation).map_err(|source| {
            ProviderError::command(
                operation,
                ExecError::Spawn {
                    command: invocation.command_line(),
                    source,
                },
            )
        })
    }
}

impl<R: CommandRunner> VersionManager for AsdfProvider<R> {
    fn provision_plugin(&self, request: &ToolRequest) -> Result<(), ProviderError> {
        self.ensure_plugin(request)
    }

    fn list_installed(&self, tool_name: &str) -> Result<Vec<String>, ProviderError> {
        self.installed_versions(tool_name)
    }

    fn list_released(&self, tool_name: &str) -> Result<Vec<String>, ProviderError> {
        self.released_versions(tool_name)
    }

    fn refresh_catalog(&self, tool_name: &str) -> Result<(), ProviderError> {
        // Some plugins hardcode their version list and need a plugin update to see new releases
        self.run_asdf("update plugin", &["plugin", "update", tool_name])?;
        Ok(())
    }

    fn install(&self, tool_name: &str, version: &str) -> Result<(), ProviderError> {
        let output = self.run_asdf_unchecked("install tool", &["install", tool_name, version])?;
        if output.success {
            return Ok(());
        }

        Err(ToolInstallError::install_failed(
            tool_name,
            version,
            format!(
                "asdf install {} {} exited with {}",
                tool_name,
                version,
                output
                    .code
                    .map_or_else(|| "a signal".to_string(), |code| format!("status {}", code))
            ),
            output.combined(),
        )
        .into())
    }

    fn post_install(&self, tool_name: &str, version: &str) -> Result<(), ProviderError> {
        if RESHIM_TOOLS.contains(&tool_name) {
            debug!(tool = tool_name, version, "regenerating shims");
            self.run_asdf("reshim", &["reshim", tool_name, version])?;
        }
        Ok(())
    }
}

impl<R: CommandRunner> ToolProvider for AsdfProvider<R> {
    fn kind(&self) -> ProviderKind {
        ProviderKind::Asdf
    }

    fn bootstrap(&mut self) -> Result<(), ProviderError> {
        // Classic asdf is a shell function loaded by shell_init, not a binary on PATH
        if self.settings.shell_init.is_none() && self.runner.locate(&self.settings.binary).is_none() {
            return Err(ProviderError::binary_not_found(&self.settings.binary));
        }

        let output = self.run_asdf("check asdf version", &["--version"])?;
        let version = require_version("asdf", &output.combined(), &MINIMUM_VERSION)?;
        info!(%version, "asdf is ready");
        self.asdf_version = Some(version);
        Ok(())
    }

    fn install_tool(&self, request: &ToolRequest) -> Result<ToolInstallResult, ProviderError> {
        self.bootstrapped_version()?;
        install_with(self, request)
    }

    fn activate_env(
        &self,
        result: &ToolInstallResult,
    ) -> Result<EnvironmentActivation, ProviderError> {
        self.bootstrapped_version()?;
        Ok(self.activation(result))
    }
}


#[cfg(test)]
mod tests {
    use super::testing::bootstrapped;
    use super::*;
    use crate::provider::exec::testing::ScriptedRunner;
    use crate::domain::ResolutionStrategy;
    use crate::error::ToolInstallErrorKind;
    use std::path::PathBuf;

    #[test]
    fn test_bootstrap_detects_version() {
        let runner = ScriptedRunner::new().respond("asdf --version", CommandOutput::ok("asdf version 0.16.7"));
        let mut provider = AsdfProvider::new(runner, AsdfSettings::default());
        provider.bootstrap().unwrap();
        assert_eq!(provider.asdf_version(), Some(&Version::new(0, 16, 7)));
    }

    #[test]
    fn test_bootstrap_fails_when_binary_missing() {
        let mut runner = ScriptedRunner::new();
        runner.on_path = false;
        let mut provider = AsdfProvider::new(runner, AsdfSettings::default());
        let err = provider.bootstrap().unwrap_err();
        assert!(matches!(err, ProviderError::BinaryNotFound { .. }));
    }

    #[test]
    fn test_bootstrap_rejects_old_asdf() {
        let runner = ScriptedRunner::new().respond("asdf --version", CommandOutput::ok("v0.13.1-0ae1a8e"));
        let mut provider = AsdfProvider::new(runner, AsdfSettings::default());
        let err = provider.bootstrap().unwrap_err();
        assert!(matches!(err, ProviderError::UnsupportedVersion { .. }));
    }

    #[test]
    fn test_operations_require_bootstrap() {
        let provider = AsdfProvider::new(ScriptedRunner::new(), AsdfSettings::default());
        let request = ToolRequest::new("nodejs", "20", ResolutionStrategy::Strict);
        assert!(matches!(
            provider.install_tool(&request),
            Err(ProviderError::NotBootstrapped { .. })
        ));
        let result = ToolInstallResult::already_installed("nodejs", "20.0.0");
        assert!(matches!(
            provider.activate_env(&result),
            Err(ProviderError::NotBootstrapped { .. })
        ));
        assert!(provider.runner.command_lines().is_empty());
    }

    #[test]
    fn test_shell_init_wraps_command_in_bash() {
        let settings = AsdfSettings {
            shell_init: Some(". /opt/asdf/asdf.sh".to_string()),
            data_dir: Some(PathBuf::from("/opt/asdf-data")),
            ..AsdfSettings::default()
        };
        let provider = AsdfProvider::new(ScriptedRunner::new(), settings);
        let invocation = provider.invocation(&["list", "java", "temurin 21"]).unwrap();

        assert_eq!(invocation.program, "bash");
        assert_eq!(invocation.args[0], "-c");
        let (init, command) = invocation.args[1].split_once(" && ").unwrap();
        assert_eq!(init, ". /opt/asdf/asdf.sh");
        assert_eq!(
            shlex::split(command).unwrap(),
            vec!["asdf", "list", "java", "temurin 21"]
        );
        assert_eq!(invocation.envs["ASDF_DATA_DIR"], "/opt/asdf-data");
    }

    #[test]
    fn test_bootstrap_with_shell_init_skips_path_lookup() {
        let mut runner = ScriptedRunner::new().respond(
            "bash -c . ~/.asdf/asdf.sh && asdf --version",
            CommandOutput::ok("v0.15.0-31e8c93"),
        );
        runner.on_path = false;
        let settings = AsdfSettings {
            shell_init: Some(". ~/.asdf/asdf.sh".to_string()),
            ..AsdfSettings::default()
        };
        let mut provider = AsdfProvider::new(runner, settings);
        provider.bootstrap().unwrap();
    }

    #[test]
    fn test_install_failure_is_structured() {
        let runner = ScriptedRunner::new().respond(
            "asdf install ruby 3.3.0",
            CommandOutput::failed(1, "BUILD FAILED (Ubuntu 22.04 using ruby-build 20240119)"),
        );
        let provider = bootstrapped(runner, AsdfSettings::default());
        let err = provider.install("ruby", "3.3.0").unwrap_err();
        match err {
            ProviderError::Install(install_err) => {
                assert_eq!(install_err.kind, ToolInstallErrorKind::InstallFailed);
                assert_eq!(install_err.cause, "asdf install ruby 3.3.0 exited with status 1");
                assert!(install_err.raw_output.contains("BUILD FAILED"));
            }
            other => panic!("unexpected error: {other:?}"),
        }
    }

    #[test]
    fn test_post_install_reshims_node_only() {
        let runner = ScriptedRunner::new().respond("asdf reshim nodejs 20.5.0", CommandOutput::ok(""));
        let provider = bootstrapped(runner, AsdfSettings::default());
        provider.post_install("nodejs", "20.5.0").unwrap();
        provider.post_install("ruby", "3.3.0").unwrap();
        assert_eq!(provider.runner.command_lines(), vec!["asdf reshim nodejs 20.5.0"]);
    }

    #[test]
    fn test_refresh_catalog_updates_plugin() {
        let runner = ScriptedRunner::new().respond("asdf plugin update flutter", CommandOutput::ok("Updated"));
        let provider = bootstrapped(runner, AsdfSettings::default());
        provider.refresh_catalog("flutter").unwrap();
    }
}
