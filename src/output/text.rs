//! Text output formatter for human-readable display
//!
//! This module provides:
//! - One aligned line per tool: requested → concrete version, install state
//! - The merged environment activation
//! - Colors via `colored`, switchable off for plain output

use crate::domain::EnvironmentActivation;
use crate::orchestrator::{OrchestratorResult, ToolReport};
use crate::output::{OutputFormatter, Verbosity};
use colored::Colorize;
use std::io::Write;

/// Text formatter for human-readable output
pub struct TextFormatter {
    verbosity: Verbosity,
    /// Whether to use colors
    color: bool,
}

impl TextFormatter {
    /// Create a new text formatter
    pub fn new(verbosity: Verbosity) -> Self {
        Self {
            verbosity,
            color: true,
        }
    }

    /// Create a new text formatter with color option
    pub fn with_color(verbosity: Verbosity, color: bool) -> Self {
        Self { verbosity, color }
    }

    fn state_label(&self, report: &ToolReport) -> String {
        match (report.result.is_already_installed, self.color) {
            (true, true) => "already installed".dimmed().to_string(),
            (true, false) => "already installed".to_string(),
            (false, true) => "installed".green().to_string(),
            (false, false) => "installed".to_string(),
        }
    }

    /// Format a single tool line
    fn format_tool_line(
        &self,
        report: &ToolReport,
        max_name_len: usize,
        writer: &mut dyn Write,
    ) -> std::io::Result<()> {
        let requested = match report.request.unparsed_version() {
            "" => "(any)",
            version => version,
        };
        let strategy = if self.verbosity == Verbosity::Verbose {
            format!(" ({})", report.request.resolution_strategy().label())
        } else {
            String::new()
        };

        if self.color {
            let name_display = format!("{:width$}", report.result.tool_name, width = max_name_len);
            writeln!(
                writer,
                "  {} {}{} {} {} [{}]",
                name_display,
                requested.dimmed(),
                strategy.dimmed(),
                "→".dimmed(),
                report.result.concrete_version.bright_white().bold(),
                self.state_label(report)
            )
        } else {
            writeln!(
                writer,
                "  {:width$} {}{} -> {} [{}]",
                report.result.tool_name,
                requested,
                strategy,
                report.result.concrete_version,
                self.state_label(report),
                width = max_name_len
            )
        }
    }

    fn format_activation(
        &self,
        activation: &EnvironmentActivation,
        writer: &mut dyn Write,
    ) -> std::io::Result<()> {
        if activation.is_empty() {
            return Ok(());
        }

        writeln!(writer)?;
        if self.color {
            writeln!(writer, "{}", "Environment:".bold())?;
        } else {
            writeln!(writer, "Environment:")?;
        }
        for (key, value) in &activation.contributed_env_vars {
            writeln!(writer, "  {}={}", key, value)?;
        }
        for path in &activation.contributed_paths {
            if self.color {
                writeln!(writer, "  {} {}", "PATH +=".dimmed(), path)?;
            } else {
                writeln!(writer, "  PATH += {}", path)?;
            }
        }
        Ok(())
    }

    fn format_header(&self, result: &OrchestratorResult, writer: &mut dyn Write) -> std::io::Result<()> {
        let total = result.tools.len();
        let installed = result.newly_installed();
        let tools = if total == 1 { "tool" } else { "tools" };

        if self.color {
            writeln!(
                writer,
                "{} — {} {}, {} newly installed",
                result.provider.display_name().bold(),
                total,
                tools,
                installed.to_string().green()
            )
        } else {
            writeln!(
                writer,
                "{} — {} {}, {} newly installed",
                result.provider, total, tools, installed
            )
        }
    }
}

impl OutputFormatter for TextFormatter {
    fn format(&self, result: &OrchestratorResult, writer: &mut dyn Write) -> std::io::Result<()> {
        // Failures go to stderr from main; quiet mode prints nothing else
        if self.verbosity == Verbosity::Quiet || result.tools.is_empty() {
            return Ok(());
        }

        self.format_header(result, writer)?;
        let max_name_len = result
            .tools
            .iter()
            .map(|t| t.result.tool_name.len())
            .max()
            .unwrap_or(0)
            .max(10);
        for report in &result.tools {
            self.format_tool_line(report, max_name_len, writer)?;
        }

        self.format_activation(&result.activation, writer)
    }
}
