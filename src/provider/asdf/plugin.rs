//! asdf plugin provisioning

use tracing::{debug, info, warn};

use super::AsdfProvider;
use crate::domain::{ToolPlugin, ToolRequest};
use crate::error::{ExecError, ProviderError, ToolInstallError};
use crate::provider::exec::CommandRunner;

/// One line of `asdf plugin list --urls`
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ListedPlugin {
    pub name: String,
    pub url: Option<String>,
}

/// Parse `asdf plugin list --urls` output (`name   url` per line)
pub fn parse_plugin_list(output: &str) -> Vec<ListedPlugin> {
    output
        .lines()
        .filter_map(|line| {
            let mut fields = line.split_whitespace();
            let name = fields.next()?;
            Some(ListedPlugin {
                name: name.to_string(),
                url: fields.next().map(str::to_string),
            })
        })
        .collect()
}

fn same_url(a: &str, b: &str) -> bool {
    fn normalize(url: &str) -> &str {
        url.trim_end_matches('/').trim_end_matches(".git")
    }
    normalize(a) == normalize(b)
}

impl<R: CommandRunner> AsdfProvider<R> {
    /// Make sure asdf has a plugin for the requested tool.
    ///
    /// Uses the request's plugin identifier, else the vetted plugin table.
    /// A tool with neither is only accepted if its plugin is already installed.
    pub(super) fn ensure_plugin(&self, request: &ToolRequest) -> Result<(), ProviderError> {
        let tool_name = request.tool_name();
        let listed = self.installed_plugins()?;

        let Some(plugin) = ToolPlugin::for_tool(tool_name, request.plugin_identifier()) else {
            if listed.iter().any(|p| p.name == tool_name) {
                debug!(tool = tool_name, "using already installed plugin");
                return Ok(());
            }
            return Err(ToolInstallError::unsupported_tool(tool_name, request.unparsed_version()).into());
        };

        if let Some(existing) = listed.iter().find(|p| p.name == plugin.name) {
            if let (Some(wanted), Some(actual)) = (&plugin.url, &existing.url) {
                if !same_url(wanted, actual) {
                    warn!(
                        plugin = %plugin.name,
                        installed_from = %actual,
                        requested = %wanted,
                        "plugin is installed from a different source, keeping it"
                    );
                }
            }
            debug!(plugin = %plugin.name, "plugin already installed");
            return Ok(());
        }

        info!(plugin = %plugin.name, url = plugin.url.as_deref().unwrap_or(""), "adding asdf plugin");
        let mut args = vec!["plugin", "add", plugin.name.as_str()];
        if let Some(url) = &plugin.url {
            args.push(url);
        }
        self.run_asdf("add plugin", &args)?;

        if !self.installed_plugins()?.iter().any(|p| p.name == plugin.name) {
            return Err(ProviderError::parse(
                "add plugin",
                format!("{} is not listed after asdf plugin add", plugin.name),
            ));
        }
        Ok(())
    }

    fn installed_plugins(&self) -> Result<Vec<ListedPlugin>, ProviderError> {
        const OPERATION: &str = "list plugins";

        let output = self.run_asdf_unchecked(OPERATION, &["plugin", "list", "--urls"])?;
        if output.success {
            return Ok(parse_plugin_list(&output.stdout));
        }
        // A fresh data dir has no plugins and asdf reports that as a failure
        if output.combined().contains("No plugins installed") {
            return Ok(Vec::new());
        }
        Err(ProviderError::command(
            OPERATION,
            ExecError::Failed {
                command: "asdf plugin list --urls".to_string(),
                code: output.code,
                output: output.combined(),
            },
        ))
    }
}
