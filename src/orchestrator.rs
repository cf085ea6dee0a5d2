//! Install orchestrator for coordinating the whole workflow
//!
//! This module provides:
//! - Workflow coordination: load config → bootstrap → install → activate
//! - CLI overrides of the configured provider and tool declarations
//! - Tool name canonicalization (`node` → `nodejs`)
//! - Fail-fast error handling: the first failure stops the run

use std::path::Path;

use thiserror::Error;
use tracing::{debug, info};

use crate::cli::CliArgs;
use crate::config::Config;
use crate::domain::{canonical_tool_name, EnvironmentActivation, ToolInstallResult, ToolRequest};
use crate::error::{AppError, ProviderError};
use crate::progress::Progress;
use crate::provider::{create_provider, ProviderKind, ToolProvider};

/// Orchestrator for coordinating the install workflow
pub struct Orchestrator {
    provider: Box<dyn ToolProvider>,
    requests: Vec<ToolRequest>,
    options: RunOptions,
}

/// Knobs that change what a run does, not what it installs
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RunOptions {
    /// Compute environment activations after installing
    pub activate: bool,
    /// Draw progress spinners
    pub show_progress: bool,
}

impl Default for RunOptions {
    fn default() -> Self {
        Self {
            activate: true,
            show_progress: false,
        }
    }
}

/// One successfully processed tool
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ToolReport {
    /// The request after name canonicalization
    pub request: ToolRequest,
    pub result: ToolInstallResult,
    /// `None` when activation was skipped
    pub activation: Option<EnvironmentActivation>,
}

/// Result of running the orchestrator
#[derive(Debug)]
pub struct OrchestratorResult {
    pub provider: ProviderKind,
    /// Tools processed before the run ended, in declaration order
    pub tools: Vec<ToolReport>,
    /// All activations merged in declaration order
    pub activation: EnvironmentActivation,
    /// The failure that stopped the run
    pub error: Option<OrchestratorError>,
}

impl OrchestratorResult {
    fn new(provider: ProviderKind) -> Self {
        Self {
            provider,
            tools: Vec::new(),
            activation: EnvironmentActivation::new(),
            error: None,
        }
    }

    /// Returns true if the run stopped on an error
    pub fn has_failed(&self) -> bool {
        self.error.is_some()
    }

    /// Number of tools that needed an install
    pub fn newly_installed(&self) -> usize {
        self.tools
            .iter()
            .filter(|t| !t.result.is_already_installed)
            .count()
    }
}

/// Errors that stop an orchestrator run
#[derive(Error, Debug)]
pub enum OrchestratorError {
    /// The version manager is not usable
    #[error("{provider} is not ready: {source}")]
    Bootstrap {
        provider: ProviderKind,
        #[source]
        source: ProviderError,
    },

    /// A tool could not be resolved or installed
    #[error("{source}")]
    Install {
        tool: String,
        #[source]
        source: ProviderError,
    },

    /// The environment of an installed tool could not be computed
    #[error("activate {tool} {version}: {source}")]
    Activate {
        tool: String,
        version: String,
        #[source]
        source: ProviderError,
    },
}

impl Orchestrator {
    /// Create an orchestrator over an existing provider
    pub fn new(provider: Box<dyn ToolProvider>, requests: Vec<ToolRequest>, options: RunOptions) -> Self {
        Self {
            provider,
            requests,
            options,
        }
    }

    /// Build the orchestrator from command line arguments.
    ///
    /// A missing default config file is allowed when tools are given with `--tool`.
    pub fn from_cli(args: &CliArgs) -> Result<Self, AppError> {
        let mut config = load_config(&args.config, args.uses_default_config() && !args.tools.is_empty())?;

        if let Some(kind) = args.provider {
            config.provider.kind = kind;
        }
        for (tool_name, version) in &args.tools {
            config.set_tool(tool_name, version);
        }

        let requests = config.tool_requests()?;
        debug!(
            provider = %config.provider.kind,
            tools = requests.len(),
            "configuration loaded"
        );

        Ok(Self::new(
            create_provider(&config.provider),
            requests,
            RunOptions {
                activate: !args.no_activate,
                show_progress: args.show_progress(),
            },
        ))
    }

    /// Run the install workflow
    pub fn run(mut self) -> OrchestratorResult {
        let kind = self.provider.kind();
        let mut result = OrchestratorResult::new(kind);
        let mut progress = Progress::new(self.options.show_progress);

        // Step 1: Make sure the version manager is usable
        progress.spinner(&format!("Checking {}...", kind));
        if let Err(source) = self.provider.bootstrap() {
            progress.finish_and_clear();
            result.error = Some(OrchestratorError::Bootstrap {
                provider: kind,
                source,
            });
            return result;
        }

        // Step 2: Install and activate each tool in order
        for request in std::mem::take(&mut self.requests) {
            let tool_name = canonical_tool_name(request.tool_name()).to_string();
            let request = request.with_tool_name(tool_name);

            progress.spinner(&format!(
                "Installing {} {}...",
                request.tool_name(),
                request.unparsed_version()
            ));
            match self.process(&request) {
                Ok(report) => {
                    if let Some(activation) = &report.activation {
                        result.activation.merge(activation.clone());
                    }
                    result.tools.push(report);
                }
                Err(error) => {
                    result.error = Some(error);
                    break;
                }
            }
        }
        progress.finish_and_clear();

        info!(
            tools = result.tools.len(),
            installed = result.newly_installed(),
            failed = result.has_failed(),
            "run finished"
        );
        result
    }

    fn process(&self, request: &ToolRequest) -> Result<ToolReport, OrchestratorError> {
        let result = self
            .provider
            .install_tool(request)
            .map_err(|source| OrchestratorError::Install {
                tool: request.tool_name().to_string(),
                source,
            })?;

        let activation = if self.options.activate {
            let activation =
                self.provider
                    .activate_env(&result)
                    .map_err(|source| OrchestratorError::Activate {
                        tool: result.tool_name.clone(),
                        version: result.concrete_version.clone(),
                        source,
                    })?;
            Some(activation)
        } else {
            None
        };

        Ok(ToolReport {
            request: request.clone(),
            result,
            activation,
        })
    }
}

fn load_config(path: &Path, allow_missing: bool) -> Result<Config, AppError> {
    if allow_missing && !path.exists() {
        debug!(path = %path.display(), "no config file, using command line tools only");
        return Ok(Config::default());
    }
    Ok(Config::load(path)?)
}
