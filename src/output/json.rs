//! JSON output formatter for machine processing
//!
//! This module provides:
//! - JSON serialization of install results
//! - The merged environment activation
//! - Structured failure details (cause and recommendation) when available

use crate::domain::EnvironmentActivation;
use crate::error::{ProviderError, ToolInstallError};
use crate::orchestrator::{OrchestratorError, OrchestratorResult, ToolReport};
use crate::output::{OutputFormatter, Verbosity};
use serde::Serialize;
use std::collections::BTreeMap;
use std::io::Write;

/// JSON formatter for machine-readable output
pub struct JsonFormatter {
    /// Verbose output adds per-tool activations
    verbosity: Verbosity,
}

impl JsonFormatter {
    pub fn new(verbosity: Verbosity) -> Self {
        Self { verbosity }
    }
}

#[derive(Serialize)]
struct JsonOutput<'a> {
    provider: &'a str,
    success: bool,
    tools: Vec<JsonTool<'a>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    activation: Option<&'a EnvironmentActivation>,
    #[serde(skip_serializing_if = "Option::is_none")]
    error: Option<JsonError>,
}

#[derive(Serialize)]
struct JsonTool<'a> {
    tool: &'a str,
    requested: &'a str,
    strategy: &'a str,
    version: &'a str,
    already_installed: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    activation: Option<&'a EnvironmentActivation>,
}

#[derive(Serialize)]
struct JsonError {
    message: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    tool: Option<String>,
    #[serde(skip_serializing_if = "BTreeMap::is_empty")]
    details: BTreeMap<&'static str, String>,
}

impl JsonFormatter {
    fn tool_to_json<'a>(&self, report: &'a ToolReport) -> JsonTool<'a> {
        JsonTool {
            tool: &report.result.tool_name,
            requested: report.request.unparsed_version(),
            strategy: report.request.resolution_strategy().label(),
            version: &report.result.concrete_version,
            already_installed: report.result.is_already_installed,
            activation: if self.verbosity == Verbosity::Verbose {
                report.activation.as_ref()
            } else {
                None
            },
        }
    }

    fn error_to_json(error: &OrchestratorError) -> JsonError {
        let (tool, install_error) = match error {
            OrchestratorError::Bootstrap { .. } => (None, None),
            OrchestratorError::Install { tool, source } => (Some(tool.clone()), install_error(source)),
            OrchestratorError::Activate { tool, source, .. } => (Some(tool.clone()), install_error(source)),
        };

        let mut details = BTreeMap::new();
        if let Some(install_error) = install_error {
            for (key, value) in [
                ("cause", &install_error.cause),
                ("recommendation", &install_error.recommendation),
                ("raw_output", &install_error.raw_output),
            ] {
                if !value.is_empty() {
                    details.insert(key, value.clone());
                }
            }
        }

        JsonError {
            message: error.to_string(),
            tool,
            details,
        }
    }
}

fn install_error(error: &ProviderError) -> Option<&ToolInstallError> {
    match error {
        ProviderError::Install(install_error) => Some(install_error),
        _ => None,
    }
}

impl OutputFormatter for JsonFormatter {
    fn format(&self, result: &OrchestratorResult, writer: &mut dyn Write) -> std::io::Result<()> {
        let output = JsonOutput {
            provider: result.provider.display_name(),
            success: !result.has_failed(),
            tools: result.tools.iter().map(|t| self.tool_to_json(t)).collect(),
            activation: (!result.activation.is_empty()).then_some(&result.activation),
            error: result.error.as_ref().map(Self::error_to_json),
        };

        serde_json::to_writer_pretty(&mut *writer, &output)?;
        writeln!(writer)
    }
}
