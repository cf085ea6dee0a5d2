//! Tool requests and resolution strategies
//!
//! A declaration such as `20`, `20:latest` or `20:installed` is turned into a
//! [`ToolRequest`]. The suffix picks the [`ResolutionStrategy`]:
//! - no suffix: `Strict` (exact version)
//! - `:installed`: `LatestInstalled` (best installed match, else released)
//! - `:latest`: `LatestReleased` (best released match)

use regex::Regex;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::sync::LazyLock;

static LATEST_SYNTAX: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^(.*):latest$").expect("latest syntax regex is valid"));

static INSTALLED_SYNTAX: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^(.*):installed$").expect("installed syntax regex is valid"));

/// How a fuzzy version request is turned into a concrete version
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ResolutionStrategy {
    /// The requested version must exist verbatim
    #[default]
    Strict,
    /// Prefer the highest installed match, fall back to the highest released match
    LatestInstalled,
    /// Prefer the highest released match, installed or not
    LatestReleased,
}

impl ResolutionStrategy {
    /// Label used in user-facing listings
    pub fn label(&self) -> &'static str {
        match self {
            ResolutionStrategy::Strict => "strict",
            ResolutionStrategy::LatestInstalled => "closest_installed",
            ResolutionStrategy::LatestReleased => "closest_released",
        }
    }
}

impl fmt::Display for ResolutionStrategy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.label())
    }
}

/// A request to make one tool version available
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ToolRequest {
    tool_name: String,
    unparsed_version: String,
    resolution_strategy: ResolutionStrategy,
    plugin_identifier: Option<String>,
}

impl ToolRequest {
    /// Create a request. The version is trimmed of surrounding whitespace.
    pub fn new(
        tool_name: impl Into<String>,
        unparsed_version: impl AsRef<str>,
        resolution_strategy: ResolutionStrategy,
    ) -> Self {
        Self {
            tool_name: tool_name.into(),
            unparsed_version: unparsed_version.as_ref().trim().to_string(),
            resolution_strategy,
            plugin_identifier: None,
        }
    }

    /// Parse a declaration using the `:latest` / `:installed` suffix syntax
    pub fn from_declaration(tool_name: impl Into<String>, declaration: &str) -> Self {
        let declaration = declaration.trim();

        if let Some(caps) = LATEST_SYNTAX.captures(declaration) {
            return Self::new(tool_name, &caps[1], ResolutionStrategy::LatestReleased);
        }
        if let Some(caps) = INSTALLED_SYNTAX.captures(declaration) {
            return Self::new(tool_name, &caps[1], ResolutionStrategy::LatestInstalled);
        }
        Self::new(tool_name, declaration, ResolutionStrategy::Strict)
    }

    /// Attach a plugin identifier (`name::url`, a URL, or a plugin name)
    pub fn with_plugin(mut self, plugin_identifier: impl Into<String>) -> Self {
        let identifier: String = plugin_identifier.into();
        let trimmed = identifier.trim();
        self.plugin_identifier = (!trimmed.is_empty()).then(|| trimmed.to_string());
        self
    }

    /// Returns a copy of this request targeting another tool name
    pub fn with_tool_name(mut self, tool_name: impl Into<String>) -> Self {
        self.tool_name = tool_name.into();
        self
    }

    pub fn tool_name(&self) -> &str {
        &self.tool_name
    }

    /// The requested version, already trimmed
    pub fn unparsed_version(&self) -> &str {
        &self.unparsed_version
    }

    pub fn resolution_strategy(&self) -> ResolutionStrategy {
        self.resolution_strategy
    }

    pub fn plugin_identifier(&self) -> Option<&str> {
        self.plugin_identifier.as_deref()
    }
}

impl fmt::Display for ToolRequest {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.unparsed_version.is_empty() {
            write!(f, "{} ({})", self.tool_name, self.resolution_strategy)
        } else {
            write!(
                f,
                "{} {} ({})",
                self.tool_name, self.unparsed_version, self.resolution_strategy
            )
        }
    }
}
