//! Version value types
//!
//! Tool catalogs mix proper semantic versions (`20.5.0`), partial ones that
//! only become semver after padding (`1.22`, `20`), and vendor identifiers
//! that never will (`temurin-21.0.0+35.0.LTS`). This module parses all of
//! them into a single tagged type.

use semver::Version;

/// A version string parsed for comparison purposes
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ParsedVersion {
    /// Parses as a semantic version (possibly after padding)
    SemVer(Version),
    /// Anything else; compared by its raw string
    Opaque,
}

impl ParsedVersion {
    /// Parse a raw version string
    pub fn parse(raw: &str) -> Self {
        match parse_lenient(raw) {
            Some(version) => ParsedVersion::SemVer(version),
            None => ParsedVersion::Opaque,
        }
    }

    /// Returns the parsed semantic version, if any
    pub fn as_semver(&self) -> Option<&Version> {
        match self {
            ParsedVersion::SemVer(version) => Some(version),
            ParsedVersion::Opaque => None,
        }
    }

    /// Returns true if the string parsed as a semantic version
    pub fn is_semver(&self) -> bool {
        matches!(self, ParsedVersion::SemVer(_))
    }
}

/// Parse a version string into a semver::Version, padding partial versions.
///
/// - An optional leading `v` is ignored
/// - The numeric core (before the first `-` or `+`) may have 1 to 3 components
/// - Missing components are padded with zeros
///
/// Examples:
/// - "20" -> 20.0.0
/// - "1.22" -> 1.22.0
/// - "1.0-rc.1" -> 1.0.0-rc.1
/// - "temurin-21" -> None
pub fn parse_lenient(raw: &str) -> Option<Version> {
    let trimmed = raw.trim();
    let trimmed = trimmed.strip_prefix('v').unwrap_or(trimmed);

    let core_end = trimmed.find(['-', '+']).unwrap_or(trimmed.len());
    let (core, rest) = trimmed.split_at(core_end);

    let parts: Vec<&str> = core.split('.').collect();
    if parts.len() > 3
        || parts
            .iter()
            .any(|p| p.is_empty() || !p.bytes().all(|b| b.is_ascii_digit()))
    {
        return None;
    }

    let normalized = match parts.len() {
        1 => format!("{}.0.0{}", core, rest),
        2 => format!("{}.0{}", core, rest),
        _ => trimmed.to_string(),
    };
    Version::parse(&normalized).ok()
}

/// Outcome of resolving a tool request to one concrete version
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct VersionResolution {
    /// The version exactly as it appears in the installed or released list
    pub version_string: String,
    /// Parsed form of `version_string`, present only if it is semver
    pub semver: Option<Version>,
    /// Whether this version is already installed
    pub is_installed: bool,
}

impl VersionResolution {
    /// Create a resolution for a version string taken from a candidate list
    pub fn new(version_string: impl Into<String>, is_installed: bool) -> Self {
        let version_string = version_string.into();
        let semver = parse_lenient(&version_string);
        Self {
            version_string,
            semver,
            is_installed,
        }
    }

    /// Returns true if the resolved version is a semantic version
    pub fn is_semver(&self) -> bool {
        self.semver.is_some()
    }
}
