//! Read-only tool catalog: name aliases and vetted plugin sources

use std::collections::HashMap;
use std::sync::LazyLock;

/// Short names users commonly write, mapped to the canonical tool name
static TOOL_ALIASES: LazyLock<HashMap<&'static str, &'static str>> =
    LazyLock::new(|| HashMap::from([("go", "golang"), ("node", "nodejs")]));

/// Plugins known to work, keyed by canonical tool name
static VETTED_PLUGINS: LazyLock<HashMap<&'static str, (&'static str, &'static str)>> =
    LazyLock::new(|| {
        HashMap::from([
            (
                "flutter",
                ("flutter", "https://github.com/asdf-community/asdf-flutter.git"),
            ),
            ("tuist", ("tuist", "https://github.com/tuist/asdf-tuist.git")),
            (
                "kotlin",
                ("kotlin", "https://github.com/asdf-community/asdf-kotlin.git"),
            ),
            ("java", ("java", "https://github.com/halcyon/asdf-java.git")),
            ("ruby", ("ruby", "https://github.com/asdf-vm/asdf-ruby.git")),
            ("nodejs", ("nodejs", "https://github.com/asdf-vm/asdf-nodejs.git")),
            ("golang", ("golang", "https://github.com/asdf-community/asdf-golang.git")),
        ])
    });

/// Returns the canonical name for a tool (`node` -> `nodejs`)
pub fn canonical_tool_name(tool_name: &str) -> &str {
    TOOL_ALIASES.get(tool_name).copied().unwrap_or(tool_name)
}

/// Where a version-manager plugin comes from
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ToolPlugin {
    /// Plugin name as registered in the version manager
    pub name: String,
    /// Git URL of the plugin, if not resolvable by name alone
    pub url: Option<String>,
}

impl ToolPlugin {
    /// Parse a user-supplied plugin identifier for `tool_name`.
    ///
    /// Accepted forms:
    /// - `name::url`
    /// - a bare URL (plugin name defaults to the tool name)
    /// - a bare plugin name
    ///
    /// A plugin name that is an alias of the tool (`node` for `nodejs`) is
    /// replaced by the canonical name, so the plugin and the tool agree.
    pub fn parse_identifier(tool_name: &str, identifier: &str) -> Self {
        let identifier = identifier.trim();

        if let Some((name, url)) = identifier.split_once("::") {
            let name = name.trim();
            let url = url.trim();
            return Self {
                name: plugin_name(tool_name, if name.is_empty() { tool_name } else { name }),
                url: (!url.is_empty()).then(|| url.to_string()),
            };
        }

        if looks_like_url(identifier) {
            return Self {
                name: tool_name.to_string(),
                url: Some(identifier.to_string()),
            };
        }

        Self {
            name: plugin_name(tool_name, identifier),
            url: None,
        }
    }

    /// Look up the vetted plugin for a tool, following aliases
    pub fn vetted(tool_name: &str) -> Option<Self> {
        VETTED_PLUGINS
            .get(canonical_tool_name(tool_name))
            .map(|(name, url)| Self {
                name: name.to_string(),
                url: Some(url.to_string()),
            })
    }

    /// Plugin for a request: the explicit identifier wins over the vetted table
    pub fn for_tool(tool_name: &str, identifier: Option<&str>) -> Option<Self> {
        match identifier {
            Some(identifier) => Some(Self::parse_identifier(tool_name, identifier)),
            None => Self::vetted(tool_name),
        }
    }
}

fn plugin_name(tool_name: &str, name: &str) -> String {
    let canonical = canonical_tool_name(name);
    if canonical == canonical_tool_name(tool_name) {
        canonical.to_string()
    } else {
        name.to_string()
    }
}

fn looks_like_url(s: &str) -> bool {
    s.contains("://") || s.starts_with("git@") || s.ends_with(".git")
}
