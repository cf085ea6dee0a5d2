//! CLI argument parsing module for toolprovider

use clap::{ArgAction, Parser};
use std::path::PathBuf;

use crate::config::{parse_tool_arg, DEFAULT_CONFIG_FILE};
use crate::logging::LogFormat;
use crate::provider::ProviderKind;

/// Install and activate declared tool versions through asdf or mise
#[derive(Parser, Debug, Clone)]
#[command(
    name = "toolprovider",
    version,
    about = "Install and activate declared tool versions through asdf or mise"
)]
pub struct CliArgs {
    /// Tool configuration file
    #[arg(default_value = DEFAULT_CONFIG_FILE)]
    pub config: PathBuf,

    /// Version manager to use, overrides the configuration file
    #[arg(long, value_enum)]
    pub provider: Option<ProviderKind>,

    /// Add or override a tool declaration (can be specified multiple times)
    #[arg(
        long = "tool",
        value_name = "NAME=VERSION",
        value_parser = parse_tool_arg,
        action = ArgAction::Append
    )]
    pub tools: Vec<(String, String)>,

    /// Install only, skip environment activation
    #[arg(long)]
    pub no_activate: bool,

    // Output options
    /// Output results in JSON format
    #[arg(long)]
    pub json: bool,

    /// Enable verbose output
    #[arg(long, conflicts_with = "quiet")]
    pub verbose: bool,

    /// Enable quiet mode - minimal output
    #[arg(short, long)]
    pub quiet: bool,

    /// Log line format on stderr
    #[arg(long, value_enum, default_value_t = LogFormat::Compact)]
    pub log_format: LogFormat,
}

impl CliArgs {
    /// True if the config file is the implicit default
    pub fn uses_default_config(&self) -> bool {
        self.config.as_os_str() == DEFAULT_CONFIG_FILE
    }

    /// Progress spinners are only drawn for interactive text output
    pub fn show_progress(&self) -> bool {
        !self.quiet && !self.json
    }
}
