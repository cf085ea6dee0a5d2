//! mise backend
//!
//! Resolution happens in this crate, not in mise: every install and env
//! lookup passes a concrete `tool@version` so mise's own fuzzy matching
//! never picks a different version than the one reported.

mod env;
mod list;

pub use env::process_env_output;
pub use list::{parse_installed_json, parse_remote_list};

use semver::Version;
use std::collections::BTreeMap;
use tracing::{debug, info};

use super::asdf::parse_plugin_list;
use super::exec::{run_checked, CommandOutput, CommandRunner, Invocation};
use super::pipeline::{install_with, VersionManager};
use super::{require_version, ProviderKind, ToolProvider};
use crate::config::MiseSettings;
use crate::domain::{EnvironmentActivation, ToolInstallResult, ToolPlugin, ToolRequest};
use crate::error::{ExecError, ProviderError, ToolInstallError};

/// Oldest mise release this provider supports
const MINIMUM_VERSION: Version = Version::new(2024, 1, 0);

/// Tool provider backed by mise
pub struct MiseProvider<R> {
    runner: R,
    settings: MiseSettings,
    mise_version: Option<Version>,
}

impl<R: CommandRunner> MiseProvider<R> {
    /// Create a provider. Call [`ToolProvider::bootstrap`] before use.
    pub fn new(runner: R, settings: MiseSettings) -> Self {
        Self {
            runner,
            settings,
            mise_version: None,
        }
    }

    pub fn settings(&self) -> &MiseSettings {
        &self.settings
    }

    pub fn runner(&self) -> &R {
        &self.runner
    }

    /// mise version detected during bootstrap
    pub fn mise_version(&self) -> Option<&Version> {
        self.mise_version.as_ref()
    }

    fn ensure_bootstrapped(&self) -> Result<(), ProviderError> {
        match self.mise_version {
            Some(_) => Ok(()),
            None => Err(ProviderError::not_bootstrapped(ProviderKind::Mise.display_name())),
        }
    }

    fn invocation(&self, args: &[&str]) -> Invocation {
        let mut envs = BTreeMap::new();
        if let Some(data_dir) = &self.settings.data_dir {
            envs.insert("MISE_DATA_DIR".to_string(), data_dir.display().to_string());
        }
        Invocation::new(self.settings.binary.as_str(), args.iter().copied()).with_envs(&envs)
    }

    fn run_mise(&self, operation: &str, args: &[&str]) -> Result<CommandOutput, ProviderError> {
        run_checked(&self.runner, &self.invocation(args))
            .map_err(|e| ProviderError::command(operation, e))
    }

    fn run_mise_unchecked(
        &self,
        operation: &str,
        args: &[&str],
    ) -> Result<CommandOutput, ProviderError> {
        let invocation = self.invocation(args);
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

impl<R: CommandRunner> VersionManager for MiseProvider<R> {
    /// Core tools need no plugin. Only an explicit `name::url` identifier
    /// makes mise install one.
    fn provision_plugin(&self, request: &ToolRequest) -> Result<(), ProviderError> {
        let Some(identifier) = request.plugin_identifier() else {
            return Ok(());
        };
        let plugin = ToolPlugin::parse_identifier(request.tool_name(), identifier);
        let Some(url) = plugin.url.as_deref() else {
            debug!(plugin = %plugin.name, "plugin identifier has no URL, relying on mise registry");
            return Ok(());
        };

        let listed = self.run_mise("list plugins", &["plugins", "ls", "--urls"])?;
        if parse_plugin_list(&listed.stdout)
            .iter()
            .any(|p| p.name == plugin.name)
        {
            return Ok(());
        }

        info!(plugin = %plugin.name, url, "installing mise plugin");
        self.run_mise("install plugin", &["plugins", "install", &plugin.name, url])?;
        Ok(())
    }

    fn list_installed(&self, tool_name: &str) -> Result<Vec<String>, ProviderError> {
        const OPERATION: &str = "list installed versions";
        let output = self.run_mise(OPERATION, &["ls", "--installed", "--json", tool_name])?;
        parse_installed_json(&output.stdout)
            .map_err(|e| ProviderError::parse(OPERATION, e.to_string()))
    }

    fn list_released(&self, tool_name: &str) -> Result<Vec<String>, ProviderError> {
        let output = self.run_mise("list released versions", &["ls-remote", tool_name])?;
        Ok(parse_remote_list(&output.stdout))
    }

    fn refresh_catalog(&self, tool_name: &str) -> Result<(), ProviderError> {
        self.run_mise("clear cache", &["cache", "clear", tool_name])?;
        Ok(())
    }

    fn install(&self, tool_name: &str, version: &str) -> Result<(), ProviderError> {
        let tool_version = format!("{}@{}", tool_name, version);
        let output = self.run_mise_unchecked("install tool", &["install", "--yes", &tool_version])?;
        if output.success {
            return Ok(());
        }

        Err(ToolInstallError::install_failed(
            tool_name,
            version,
            format!(
                "mise install {} exited with {}",
                tool_version,
                output
                    .code
                    .map_or_else(|| "a signal".to_string(), |code| format!("status {}", code))
            ),
            output.combined(),
        )
        .into())
    }
}

impl<R: CommandRunner> ToolProvider for MiseProvider<R> {
    fn kind(&self) -> ProviderKind {
        ProviderKind::Mise
    }

    fn bootstrap(&mut self) -> Result<(), ProviderError> {
        if self.runner.locate(&self.settings.binary).is_none() {
            return Err(ProviderError::binary_not_found(&self.settings.binary));
        }

        let output = self.run_mise("check mise version", &["--version"])?;
        let version = require_version("mise", &output.combined(), &MINIMUM_VERSION)?;
        info!(%version, "mise is ready");
        self.mise_version = Some(version);
        Ok(())
    }

    fn install_tool(&self, request: &ToolRequest) -> Result<ToolInstallResult, ProviderError> {
        self.ensure_bootstrapped()?;
        install_with(self, request)
    }

    fn activate_env(
        &self,
        result: &ToolInstallResult,
    ) -> Result<EnvironmentActivation, ProviderError> {
        self.ensure_bootstrapped()?;
        let envs = self.tool_env(result)?;
        let process_path = std::env::var("PATH").unwrap_or_default();
        Ok(process_env_output(envs, &process_path))
    }
}
