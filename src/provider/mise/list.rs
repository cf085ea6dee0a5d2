//! mise version listings

use serde::Deserialize;

/// One entry of `mise ls --installed --json <tool>`. Other fields are ignored.
#[derive(Debug, Deserialize)]
struct InstalledEntry {
    version: String,
}

/// Parse the JSON array printed by `mise ls --installed --json <tool>`.
///
/// Blank output means nothing is installed.
pub fn parse_installed_json(output: &str) -> Result<Vec<String>, serde_json::Error> {
    if output.trim().is_empty() {
        return Ok(Vec::new());
    }
    let entries: Vec<InstalledEntry> = serde_json::from_str(output)?;
    Ok(entries.into_iter().map(|entry| entry.version).collect())
}

/// Parse `mise ls-remote <tool>` output, one version per line
pub fn parse_remote_list(output: &str) -> Vec<String> {
    output
        .lines()
        .map(str::trim)
        .filter(|line| !line.is_empty())
        .map(str::to_string)
        .collect()
}
