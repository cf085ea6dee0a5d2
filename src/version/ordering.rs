//! Logical ordering of mixed version lists
//!
//! Semantic versions always outrank opaque identifiers. Semantic versions
//! compare by semver precedence, opaque identifiers compare as plain strings.

use std::cmp::Ordering;

use super::model::ParsedVersion;

/// A version string paired with its parsed form
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LogicalVersion<'a> {
    /// The original, unnormalized string
    pub original: &'a str,
    /// Parsed form used for comparison
    pub parsed: ParsedVersion,
}

impl<'a> LogicalVersion<'a> {
    /// Parse a version string for ordering
    pub fn new(original: &'a str) -> Self {
        Self {
            original,
            parsed: ParsedVersion::parse(original),
        }
    }
}

impl Ord for LogicalVersion<'_> {
    fn cmp(&self, other: &Self) -> Ordering {
        compare_logical(self, other)
    }
}

impl PartialOrd for LogicalVersion<'_> {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

/// Compare two versions in ascending logical order.
///
/// Opaque < SemVer. Equal semver values (`1.22` vs `1.22.0`) fall back to
/// the original strings so the order stays total.
pub fn compare_logical(a: &LogicalVersion<'_>, b: &LogicalVersion<'_>) -> Ordering {
    match (&a.parsed, &b.parsed) {
        (ParsedVersion::SemVer(va), ParsedVersion::SemVer(vb)) => va
            .cmp(vb)
            .then_with(|| a.original.cmp(b.original)),
        (ParsedVersion::SemVer(_), ParsedVersion::Opaque) => Ordering::Greater,
        (ParsedVersion::Opaque, ParsedVersion::SemVer(_)) => Ordering::Less,
        (ParsedVersion::Opaque, ParsedVersion::Opaque) => a.original.cmp(b.original),
    }
}

/// Sort versions newest first: semver versions by precedence, then
/// non-semver versions in reverse lexicographic order.
///
/// The returned strings are the originals, not their padded forms.
pub fn logically_sorted<S: AsRef<str>>(versions: &[S]) -> Vec<String> {
    let mut logical: Vec<LogicalVersion<'_>> = versions
        .iter()
        .map(|v| LogicalVersion::new(v.as_ref()))
        .collect();
    logical.sort_by(|a, b| b.cmp(a));
    logical.into_iter().map(|v| v.original.to_string()).collect()
}
