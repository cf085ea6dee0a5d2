//! Tool configuration file
//!
//! ```toml
//! [provider]
//! kind = "asdf"
//!
//! [provider.asdf]
//! shell_init = ". /opt/asdf/asdf.sh"
//! data_dir = "/opt/asdf-data"
//!
//! [tools]
//! nodejs = "20:latest"
//! golang = "1.22:installed"
//! foo = { version = "1.2.0", plugin = "foo::https://github.com/me/asdf-foo.git" }
//! ```

use serde::Deserialize;
use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

use crate::domain::ToolRequest;
use crate::error::ConfigError;
use crate::provider::ProviderKind;

/// Default config file name
pub const DEFAULT_CONFIG_FILE: &str = "tools.toml";

/// Parsed configuration file
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct Config {
    #[serde(default)]
    pub provider: ProviderConfig,
    /// Tool declarations keyed by tool name
    #[serde(default)]
    pub tools: BTreeMap<String, ToolDeclaration>,
}

/// Backend selection and per-backend settings
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct ProviderConfig {
    #[serde(default)]
    pub kind: ProviderKind,
    #[serde(default)]
    pub asdf: AsdfSettings,
    #[serde(default)]
    pub mise: MiseSettings,
}

/// Settings for the asdf backend
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct AsdfSettings {
    /// Name or path of the asdf executable
    pub binary: String,
    /// Shell line that loads classic (bash) asdf, e.g. `. $HOME/.asdf/asdf.sh`
    pub shell_init: Option<String>,
    /// Value for `ASDF_DATA_DIR`
    pub data_dir: Option<PathBuf>,
    /// Extra environment variables for every asdf command
    pub env: BTreeMap<String, String>,
}

impl Default for AsdfSettings {
    fn default() -> Self {
        Self {
            binary: "asdf".to_string(),
            shell_init: None,
            data_dir: None,
            env: BTreeMap::new(),
        }
    }
}

/// Settings for the mise backend
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct MiseSettings {
    /// Name or path of the mise executable
    pub binary: String,
    /// Value for `MISE_DATA_DIR`
    pub data_dir: Option<PathBuf>,
}

impl Default for MiseSettings {
    fn default() -> Self {
        Self {
            binary: "mise".to_string(),
            data_dir: None,
        }
    }
}

/// A tool declaration: either a bare version or a table with a plugin
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(untagged)]
pub enum ToolDeclaration {
    Version(String),
    Detailed {
        /// Missing means no preference
        #[serde(default)]
        version: String,
        #[serde(default)]
        plugin: Option<String>,
    },
}

impl ToolDeclaration {
    /// The declared version, including any `:latest` / `:installed` suffix
    pub fn version(&self) -> &str {
        match self {
            ToolDeclaration::Version(version) => version,
            ToolDeclaration::Detailed { version, .. } => version,
        }
    }

    /// The plugin identifier, if any
    pub fn plugin(&self) -> Option<&str> {
        match self {
            ToolDeclaration::Version(_) => None,
            ToolDeclaration::Detailed { plugin, .. } => plugin.as_deref(),
        }
    }
}

impl Config {
    /// Load and parse a config file
    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        let content =
            std::fs::read_to_string(path).map_err(|e| ConfigError::read(path, e))?;
        Self::parse(&content, path)
    }

    /// Parse config file content. `path` is only used in error messages.
    pub fn parse(content: &str, path: &Path) -> Result<Self, ConfigError> {
        toml::from_str(content).map_err(|e: toml::de::Error| ConfigError::parse(path, e.to_string()))
    }

    /// Add or replace a tool declaration
    pub fn set_tool(&mut self, tool_name: impl Into<String>, version: impl Into<String>) {
        self.tools
            .insert(tool_name.into(), ToolDeclaration::Version(version.into()));
    }

    /// Build one request per declared tool, ordered by tool name
    pub fn tool_requests(&self) -> Result<Vec<ToolRequest>, ConfigError> {
        self.tools
            .iter()
            .map(|(tool_name, declaration)| -> Result<ToolRequest, ConfigError> {
                validate_tool_name(tool_name)?;
                let request = ToolRequest::from_declaration(tool_name.as_str(), declaration.version());
                Ok(match declaration.plugin() {
                    Some(plugin) => request.with_plugin(plugin),
                    None => request,
                })
            })
            .collect()
    }
}

/// Parse a `NAME=VERSION` command line declaration
pub fn parse_tool_arg(arg: &str) -> Result<(String, String), ConfigError> {
    let (tool_name, version) = arg.split_once('=').ok_or_else(|| {
        ConfigError::invalid_declaration(arg, "expected NAME=VERSION, e.g. nodejs=20:latest")
    })?;
    let tool_name = tool_name.trim();
    validate_tool_name(tool_name)?;
    Ok((tool_name.to_string(), version.trim().to_string()))
}

fn validate_tool_name(tool_name: &str) -> Result<(), ConfigError> {
    if tool_name.is_empty() {
        return Err(ConfigError::invalid_declaration(
            tool_name,
            "tool name must not be empty",
        ));
    }
    if tool_name.chars().any(char::is_whitespace) {
        return Err(ConfigError::invalid_declaration(
            tool_name,
            "tool name must not contain whitespace",
        ));
    }
    Ok(())
}
