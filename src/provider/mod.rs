//! Tool providers
//!
//! A provider wraps one external version manager and exposes the three
//! operations callers need:
//! - `bootstrap`: check the version manager is usable
//! - `install_tool`: resolve a request and install the result if missing
//! - `activate_env`: compute the environment that makes a version active

pub mod asdf;
pub mod exec;
pub mod mise;
pub mod pipeline;

use std::fmt;
use std::sync::LazyLock;

use clap::ValueEnum;
#[cfg(test)]
use mockall::automock;
use regex::Regex;
use semver::Version;
use serde::{Deserialize, Serialize};

use crate::config::ProviderConfig;
use crate::domain::{EnvironmentActivation, ToolInstallResult, ToolRequest};
use crate::error::ProviderError;
use crate::version::parse_lenient;

pub use asdf::AsdfProvider;
pub use exec::{CommandOutput, CommandRunner, Invocation, SystemRunner};
pub use mise::MiseProvider;
pub use pipeline::{install_with, VersionManager};

/// Pre-compiled regex for extracting version numbers from `--version` output
static VERSION_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"v?(\d+\.\d+(?:\.\d+)?)").expect("version regex is valid"));

/// Supported version managers
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize, ValueEnum,
)]
#[serde(rename_all = "lowercase")]
pub enum ProviderKind {
    #[default]
    Asdf,
    Mise,
}

impl ProviderKind {
    /// Returns the display name
    pub fn display_name(&self) -> &'static str {
        match self {
            ProviderKind::Asdf => "asdf",
            ProviderKind::Mise => "mise",
        }
    }
}

impl fmt::Display for ProviderKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.display_name())
    }
}

/// Capability set every version manager backend implements
#[cfg_attr(test, automock)]
pub trait ToolProvider {
    /// Which version manager this provider wraps
    fn kind(&self) -> ProviderKind;

    /// Check that the version manager is present and recent enough.
    ///
    /// Every other operation fails with `NotBootstrapped` until this succeeds.
    fn bootstrap(&mut self) -> Result<(), ProviderError>;

    /// Resolve a request to a concrete version and install it if needed
    fn install_tool(&self, request: &ToolRequest) -> Result<ToolInstallResult, ProviderError>;

    /// Environment changes that make an installed version active.
    /// Does not touch the current process environment.
    fn activate_env(
        &self,
        result: &ToolInstallResult,
    ) -> Result<EnvironmentActivation, ProviderError>;
}

/// Create the provider selected by the configuration
pub fn create_provider(config: &ProviderConfig) -> Box<dyn ToolProvider> {
    match config.kind {
        ProviderKind::Asdf => Box::new(AsdfProvider::new(SystemRunner::new(), config.asdf.clone())),
        ProviderKind::Mise => Box::new(MiseProvider::new(SystemRunner::new(), config.mise.clone())),
    }
}

/// Extract the first version number from `--version` output
pub(crate) fn extract_version(output: &str) -> Option<Version> {
    VERSION_RE
        .captures(output)
        .and_then(|caps| caps.get(1))
        .and_then(|m| parse_lenient(m.as_str()))
}

/// Parse `--version` output and check it against a minimum version
pub(crate) fn require_version(
    binary: &str,
    output: &str,
    minimum: &Version,
) -> Result<Version, ProviderError> {
    let found = extract_version(output).ok_or_else(|| {
        ProviderError::parse(
            format!("check {} version", binary),
            format!("no version number in {:?}", output.trim()),
        )
    })?;

    if found < *minimum {
        return Err(ProviderError::unsupported_version(
            binary,
            found.to_string(),
            minimum.to_string(),
        ));
    }
    Ok(found)
}
