//! Application error types using thiserror
//!
//! Error hierarchy:
//! - ResolveError: No version satisfies a request
//! - ToolInstallError: Structured install failure with remediation text
//! - ExecError: External command could not be spawned or failed
//! - ProviderError: Backend readiness, command and parse failures
//! - ConfigError: Issues with the tool configuration file

use std::fmt;
use std::path::PathBuf;
use thiserror::Error;

use crate::domain::ResolutionStrategy;

/// Application-level error type
#[derive(Error, Debug)]
pub enum AppError {
    /// Configuration related errors
    #[error(transparent)]
    Config(#[from] ConfigError),

    /// Version manager related errors
    #[error(transparent)]
    Provider(#[from] ProviderError),
}

/// Which version list the candidates of a failed resolution come from
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CandidateSource {
    Released,
    Installed,
}

/// No version in the applicable list satisfies a request
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NoMatchingVersion {
    pub tool: String,
    pub requested: String,
    pub strategy: ResolutionStrategy,
    pub candidate_source: CandidateSource,
    /// Versions the user could have asked for, in logical order
    pub candidates: Vec<String>,
}

impl NoMatchingVersion {
    /// Candidate listing, one `- version` line each
    pub fn candidate_listing(&self) -> String {
        self.candidates
            .iter()
            .map(|v| format!("- {}", v))
            .collect::<Vec<_>>()
            .join("\n")
    }
}

impl fmt::Display for NoMatchingVersion {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "no matching version found for {} {}",
            self.tool, self.requested
        )?;
        if !self.candidates.is_empty() {
            write!(f, "\navailable versions:\n{}", self.candidate_listing())?;
        }
        Ok(())
    }
}

impl std::error::Error for NoMatchingVersion {}

/// Errors produced by the resolution engine
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ResolveError {
    #[error(transparent)]
    NoMatchingVersion(#[from] NoMatchingVersion),
}

/// Broad class of a [`ToolInstallError`]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ToolInstallErrorKind {
    /// The request matched nothing, even after a catalog refresh
    NoMatchingVersion,
    /// The version manager's install command failed
    InstallFailed,
    /// No plugin is known for the tool
    UnsupportedTool,
}

/// Install failure carrying enough structure to render remediation guidance
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ToolInstallError {
    pub tool_name: String,
    pub requested_version: String,
    pub kind: ToolInstallErrorKind,
    pub cause: String,
    pub recommendation: String,
    pub raw_output: String,
}

impl ToolInstallError {
    /// Build the error for a request that matched no version
    pub fn no_matching_version(no_match: &NoMatchingVersion) -> Self {
        let requested = &no_match.requested;
        let (cause, recommendation) = match no_match.strategy {
            ResolutionStrategy::Strict => (
                format!("No exact match found for {}", requested),
                format!(
                    "If you want to use the latest released version matching {requested}, declare `{requested}:latest`. \
                     If you want to use the latest installed version matching {requested}, declare `{requested}:installed`."
                ),
            ),
            _ => (
                format!(
                    "No {} version of {} matches {}",
                    match no_match.candidate_source {
                        CandidateSource::Released => "released",
                        CandidateSource::Installed => "installed",
                    },
                    no_match.tool,
                    requested
                ),
                "Pick one of the available versions, or a prefix of one.".to_string(),
            ),
        };

        Self {
            tool_name: no_match.tool.clone(),
            requested_version: requested.clone(),
            kind: ToolInstallErrorKind::NoMatchingVersion,
            cause,
            recommendation,
            raw_output: no_match.to_string(),
        }
    }

    /// Build the error for a failed install command
    pub fn install_failed(
        tool_name: impl Into<String>,
        version: impl Into<String>,
        cause: impl Into<String>,
        raw_output: impl Into<String>,
    ) -> Self {
        Self {
            tool_name: tool_name.into(),
            requested_version: version.into(),
            kind: ToolInstallErrorKind::InstallFailed,
            cause: cause.into(),
            recommendation: String::new(),
            raw_output: raw_output.into(),
        }
    }

    /// Build the error for a tool with no known plugin
    pub fn unsupported_tool(tool_name: impl Into<String>, version: impl Into<String>) -> Self {
        let tool_name = tool_name.into();
        Self {
            cause: format!(
                "This tool integration ({}) is not tested or vetted.",
                tool_name
            ),
            recommendation: format!(
                "If you want to use this tool anyway, look up its asdf plugin and provide it in the `plugin` field of the tool declaration. \
                 For example: `plugin: {}::https://github/url/to/asdf/plugin/repo.git`",
                tool_name
            ),
            requested_version: version.into(),
            kind: ToolInstallErrorKind::UnsupportedTool,
            raw_output: String::new(),
            tool_name,
        }
    }
}

impl fmt::Display for ToolInstallError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "failed to install {} {}",
            self.tool_name, self.requested_version
        )?;
        if !self.cause.is_empty() {
            write!(f, "\nCause: {}", self.cause)?;
        }
        if !self.recommendation.is_empty() {
            write!(f, "\nRecommendation: {}", self.recommendation)?;
        }
        if !self.raw_output.is_empty() {
            write!(f, "\nAdditional info: {}", self.raw_output)?;
        }
        Ok(())
    }
}

impl std::error::Error for ToolInstallError {}

/// Errors from running an external command
#[derive(Error, Debug)]
pub enum ExecError {
    /// The process could not be started
    #[error("failed to run `{command}`: {source}")]
    Spawn {
        command: String,
        #[source]
        source: std::io::Error,
    },

    /// The process exited unsuccessfully
    #[error("`{command}` exited with {}: {output}", describe_exit(.code))]
    Failed {
        command: String,
        code: Option<i32>,
        output: String,
    },
}

fn describe_exit(code: &Option<i32>) -> String {
    match code {
        Some(code) => format!("status {}", code),
        None => "a signal".to_string(),
    }
}

/// Errors raised by a tool provider
#[derive(Error, Debug)]
pub enum ProviderError {
    /// The version manager binary is not on PATH
    #[error("{binary} not found on PATH")]
    BinaryNotFound { binary: String },

    /// The version manager is older than what is supported
    #[error("{binary} {found} is not supported, {minimum} or newer is required")]
    UnsupportedVersion {
        binary: String,
        found: String,
        minimum: String,
    },

    /// An operation was attempted before a successful bootstrap
    #[error("{provider} provider is not bootstrapped")]
    NotBootstrapped { provider: String },

    /// An external command failed during an operation
    #[error("{operation}: {source}")]
    Command {
        operation: String,
        #[source]
        source: ExecError,
    },

    /// Command output could not be understood
    #[error("{operation}: unexpected output: {message}")]
    Parse { operation: String, message: String },

    /// Structured install failure
    #[error(transparent)]
    Install(#[from] ToolInstallError),
}

/// Errors related to the tool configuration
#[derive(Error, Debug)]
pub enum ConfigError {
    /// Failed to read config file
    #[error("failed to read config file {path}: {source}")]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// Failed to parse config file
    #[error("failed to parse config file {path}: {message}")]
    Parse { path: PathBuf, message: String },

    /// A tool declaration is malformed
    #[error("invalid tool declaration '{declaration}': {message}")]
    InvalidDeclaration {
        declaration: String,
        message: String,
    },
}

impl ProviderError {
    /// Creates a new BinaryNotFound error
    pub fn binary_not_found(binary: impl Into<String>) -> Self {
        ProviderError::BinaryNotFound {
            binary: binary.into(),
        }
    }

    /// Creates a new UnsupportedVersion error
    pub fn unsupported_version(
        binary: impl Into<String>,
        found: impl Into<String>,
        minimum: impl Into<String>,
    ) -> Self {
        ProviderError::UnsupportedVersion {
            binary: binary.into(),
            found: found.into(),
            minimum: minimum.into(),
        }
    }

    /// Creates a new NotBootstrapped error
    pub fn not_bootstrapped(provider: impl Into<String>) -> Self {
        ProviderError::NotBootstrapped {
            provider: provider.into(),
        }
    }

    /// Wraps a command failure with the operation it belongs to
    pub fn command(operation: impl Into<String>, source: ExecError) -> Self {
        ProviderError::Command {
            operation: operation.into(),
            source,
        }
    }

    /// Creates a new Parse error
    pub fn parse(operation: impl Into<String>, message: impl Into<String>) -> Self {
        ProviderError::Parse {
            operation: operation.into(),
            message: message.into(),
        }
    }
}

impl ConfigError {
    /// Creates a new Read error
    pub fn read(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        ConfigError::Read {
            path: path.into(),
            source,
        }
    }

    /// Creates a new Parse error
    pub fn parse(path: impl Into<PathBuf>, message: impl Into<String>) -> Self {
        ConfigError::Parse {
            path: path.into(),
            message: message.into(),
        }
    }

    /// Creates a new InvalidDeclaration error
    pub fn invalid_declaration(declaration: impl Into<String>, message: impl Into<String>) -> Self {
        ConfigError::InvalidDeclaration {
            declaration: declaration.into(),
            message: message.into(),
        }
    }
}
