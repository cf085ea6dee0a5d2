//! Version resolution
//!
//! Maps a [`ToolRequest`] plus the installed and released version lists of a
//! tool to exactly one concrete version. Matching is a plain string-prefix
//! test on the original strings, run against the lists in logical order so
//! the first match is always the highest one.

use tracing::debug;

use super::model::VersionResolution;
use super::ordering::logically_sorted;
use crate::domain::{ResolutionStrategy, ToolRequest};
use crate::error::{CandidateSource, NoMatchingVersion, ResolveError};

/// Request literal for "newest released version"
pub const LATEST: &str = "latest";

/// Request literal for "newest installed version"
pub const INSTALLED: &str = "installed";

/// Resolve a request against the released and installed versions of a tool.
///
/// An exact match among installed versions always wins, whatever the strategy.
/// The returned `version_string` is always taken from one of the two lists.
pub fn resolve_version(
    request: &ToolRequest,
    released: &[String],
    installed: &[String],
) -> Result<VersionResolution, ResolveError> {
    let requested = request.unparsed_version();

    if !requested.is_empty() && installed.iter().any(|v| v == requested) {
        if request.resolution_strategy() != ResolutionStrategy::Strict {
            debug!(
                tool = request.tool_name(),
                version = requested,
                "request is an exact installed version, a partial version would let the strategy pick a newer one"
            );
        }
        return Ok(VersionResolution::new(requested, true));
    }

    let resolution = match request.resolution_strategy() {
        ResolutionStrategy::Strict => resolve_strict(request, released, installed),
        ResolutionStrategy::LatestInstalled => resolve_latest_installed(request, released, installed),
        ResolutionStrategy::LatestReleased => resolve_latest_released(request, released, installed),
    }?;

    debug!(
        tool = request.tool_name(),
        requested,
        strategy = %request.resolution_strategy(),
        resolved = %resolution.version_string,
        installed = resolution.is_installed,
        "resolved version"
    );
    Ok(resolution)
}

fn resolve_strict(
    request: &ToolRequest,
    released: &[String],
    installed: &[String],
) -> Result<VersionResolution, ResolveError> {
    let requested = request.unparsed_version();
    match requested {
        "" | LATEST => newest_released(request, released, installed),
        INSTALLED => newest_installed(request, installed),
        exact => {
            if released.iter().any(|v| v == exact) {
                return Ok(with_membership(exact, installed));
            }

            let ordered = logically_sorted(released);
            let sharing_prefix: Vec<String> = ordered
                .iter()
                .filter(|v| v.starts_with(exact))
                .cloned()
                .collect();
            let candidates = if sharing_prefix.is_empty() {
                ordered
            } else {
                sharing_prefix
            };
            Err(no_match(request, CandidateSource::Released, candidates))
        }
    }
}

fn resolve_latest_installed(
    request: &ToolRequest,
    released: &[String],
    installed: &[String],
) -> Result<VersionResolution, ResolveError> {
    match request.unparsed_version() {
        "" | INSTALLED => newest_installed(request, installed),
        LATEST => newest_released(request, released, installed),
        prefix => {
            if let Some(version) = first_prefix_match(&logically_sorted(installed), prefix) {
                return Ok(VersionResolution::new(version, true));
            }

            // Nothing on disk shares the prefix, so a released match is never installed
            let ordered = logically_sorted(released);
            match first_prefix_match(&ordered, prefix) {
                Some(version) => Ok(VersionResolution::new(version, false)),
                None => Err(no_match(request, CandidateSource::Released, ordered)),
            }
        }
    }
}

fn resolve_latest_released(
    request: &ToolRequest,
    released: &[String],
    installed: &[String],
) -> Result<VersionResolution, ResolveError> {
    match request.unparsed_version() {
        "" | LATEST => newest_released(request, released, installed),
        INSTALLED => newest_installed(request, installed),
        prefix => {
            let ordered = logically_sorted(released);
            match first_prefix_match(&ordered, prefix) {
                Some(version) => Ok(with_membership(version, installed)),
                None => Err(no_match(request, CandidateSource::Released, ordered)),
            }
        }
    }
}

fn newest_released(
    request: &ToolRequest,
    released: &[String],
    installed: &[String],
) -> Result<VersionResolution, ResolveError> {
    match logically_sorted(released).first() {
        Some(version) => Ok(with_membership(version, installed)),
        None => Err(no_match(request, CandidateSource::Released, Vec::new())),
    }
}

fn newest_installed(
    request: &ToolRequest,
    installed: &[String],
) -> Result<VersionResolution, ResolveError> {
    match logically_sorted(installed).first() {
        Some(version) => Ok(VersionResolution::new(version.as_str(), true)),
        None => Err(no_match(request, CandidateSource::Installed, Vec::new())),
    }
}

fn first_prefix_match<'a>(ordered: &'a [String], prefix: &str) -> Option<&'a str> {
    ordered
        .iter()
        .map(String::as_str)
        .find(|v| v.starts_with(prefix))
}

fn with_membership(version: &str, installed: &[String]) -> VersionResolution {
    let is_installed = installed.iter().any(|v| v == version);
    VersionResolution::new(version, is_installed)
}

fn no_match(
    request: &ToolRequest,
    candidate_source: CandidateSource,
    candidates: Vec<String>,
) -> ResolveError {
    ResolveError::NoMatchingVersion(NoMatchingVersion {
        tool: request.tool_name().to_string(),
        requested: request.unparsed_version().to_string(),
        strategy: request.resolution_strategy(),
        candidate_source,
        candidates,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;
    use semver::Version;

    fn versions(list: &[&str]) -> Vec<String> {
        list.iter().map(|v| v.to_string()).collect()
    }

    fn node_installed() -> Vec<String> {
        versions(&["18.6.3", "20.0.0", "20.1.0", "20.2.0", "21.0.0"])
    }

    fn node_released() -> Vec<String> {
        versions(&[
            "18.6.3", "20.0.0", "20.1.0", "20.2.0", "20.5.0", "21.0.0", "22.0.0",
        ])
    }

    fn java_released() -> Vec<String> {
        versions(&[
            "temurin-17.0.4+101",
            "temurin-21.0.0+35.0.LTS",
            "temurin-21.0.2+13.0.LTS",
            "openjdk-21",
            "zulu-21.30.15",
        ])
    }

    fn unwrap_no_match(err: ResolveError) -> NoMatchingVersion {
        match err {
            ResolveError::NoMatchingVersion(no_match) => no_match,
        }
    }

    #[test]
    fn test_latest_installed_prefers_installed_match() {
        let request = ToolRequest::new("nodejs", "20", ResolutionStrategy::LatestInstalled);
        let resolution = resolve_version(&request, &node_released(), &node_installed()).unwrap();
        assert_eq!(resolution.version_string, "20.2.0");
        assert!(resolution.is_installed);
        assert_eq!(resolution.semver, Some(Version::new(20, 2, 0)));
    }

    #[test]
    fn test_latest_released_picks_highest_release() {
        let request = ToolRequest::new("nodejs", "20", ResolutionStrategy::LatestReleased);
        let resolution = resolve_version(&request, &node_released(), &node_installed()).unwrap();
        assert_eq!(resolution.version_string, "20.5.0");
        assert!(!resolution.is_installed);
    }

    #[test]
    fn test_latest_released_match_may_be_installed() {
        let request = ToolRequest::new("nodejs", "21", ResolutionStrategy::LatestReleased);
        let resolution = resolve_version(&request, &node_released(), &node_installed()).unwrap();
        assert_eq!(resolution.version_string, "21.0.0");
        assert!(resolution.is_installed);
    }

    #[test]
    fn test_latest_installed_falls_back_to_released() {
        let request = ToolRequest::new("nodejs", "22", ResolutionStrategy::LatestInstalled);
        let resolution = resolve_version(&request, &node_released(), &node_installed()).unwrap();
        assert_eq!(resolution.version_string, "22.0.0");
        assert!(!resolution.is_installed);
    }

    #[test]
    fn test_padding_keeps_original_string() {
        let request = ToolRequest::new("golang", "20", ResolutionStrategy::LatestInstalled);
        let released = versions(&["20.0.0", "20.1", "21.0.0"]);
        let installed = versions(&["20.1"]);
        let resolution = resolve_version(&request, &released, &installed).unwrap();
        assert_eq!(resolution.version_string, "20.1");
        assert!(resolution.is_semver());
        assert_eq!(resolution.semver, Some(Version::new(20, 1, 0)));
        assert!(resolution.is_installed);
    }

    #[rstest]
    #[case(ResolutionStrategy::Strict)]
    #[case(ResolutionStrategy::LatestInstalled)]
    #[case(ResolutionStrategy::LatestReleased)]
    fn test_exact_installed_match_short_circuits(#[case] strategy: ResolutionStrategy) {
        let request = ToolRequest::new("nodejs", " 20.1.0 ", strategy);
        let resolution = resolve_version(&request, &[], &node_installed()).unwrap();
        assert_eq!(resolution.version_string, "20.1.0");
        assert!(resolution.is_installed);
    }

    #[test]
    fn test_strict_exact_release() {
        let request = ToolRequest::new("nodejs", "20.5.0", ResolutionStrategy::Strict);
        let resolution = resolve_version(&request, &node_released(), &node_installed()).unwrap();
        assert_eq!(resolution.version_string, "20.5.0");
        assert!(!resolution.is_installed);
    }

    #[test]
    fn test_strict_no_match_lists_prefix_candidates() {
        let request = ToolRequest::new("nodejs", "22", ResolutionStrategy::Strict);
        let released = versions(&["20.5.0", "22.1.0", "22.0.0"]);
        let err = resolve_version(&request, &released, &node_installed()).unwrap_err();
        let message = err.to_string();
        let no_match = unwrap_no_match(err);

        assert_eq!(no_match.candidates, vec!["22.1.0", "22.0.0"]);
        assert_eq!(no_match.candidate_source, CandidateSource::Released);
        assert_eq!(no_match.strategy, ResolutionStrategy::Strict);
        assert!(message.contains("no matching version found for nodejs 22"));
        assert!(message.contains("- 22.1.0"));
        assert!(!message.contains("- 20.5.0"));
    }

    #[test]
    fn test_strict_no_match_without_prefix_lists_all_released() {
        let request = ToolRequest::new("nodejs", "23", ResolutionStrategy::Strict);
        let err = resolve_version(&request, &node_released(), &[]).unwrap_err();
        let no_match = unwrap_no_match(err);
        assert_eq!(no_match.candidates.len(), node_released().len());
        assert_eq!(no_match.candidates[0], "22.0.0");
    }

    #[rstest]
    #[case(ResolutionStrategy::Strict, "", "22.0.0", false)]
    #[case(ResolutionStrategy::Strict, "latest", "22.0.0", false)]
    #[case(ResolutionStrategy::Strict, "installed", "21.0.0", true)]
    #[case(ResolutionStrategy::LatestInstalled, "", "21.0.0", true)]
    #[case(ResolutionStrategy::LatestInstalled, "installed", "21.0.0", true)]
    #[case(ResolutionStrategy::LatestInstalled, "latest", "22.0.0", false)]
    #[case(ResolutionStrategy::LatestReleased, "", "22.0.0", false)]
    #[case(ResolutionStrategy::LatestReleased, "latest", "22.0.0", false)]
    #[case(ResolutionStrategy::LatestReleased, "installed", "21.0.0", true)]
    fn test_literals_resolve_to_list_heads(
        #[case] strategy: ResolutionStrategy,
        #[case] requested: &str,
        #[case] expected: &str,
        #[case] is_installed: bool,
    ) {
        let request = ToolRequest::new("nodejs", requested, strategy);
        let resolution = resolve_version(&request, &node_released(), &node_installed()).unwrap();
        assert_eq!(resolution.version_string, expected);
        assert_eq!(resolution.is_installed, is_installed);
    }

    #[test]
    fn test_latest_released_head_is_checked_for_membership() {
        let request = ToolRequest::new("nodejs", "", ResolutionStrategy::LatestReleased);
        let installed = versions(&["22.0.0"]);
        let resolution = resolve_version(&request, &node_released(), &installed).unwrap();
        assert!(resolution.is_installed);
    }

    #[test]
    fn test_empty_latest_installed_without_installs_fails() {
        let request = ToolRequest::new("nodejs", "", ResolutionStrategy::LatestInstalled);
        let err = resolve_version(&request, &node_released(), &[]).unwrap_err();
        let no_match = unwrap_no_match(err);
        assert_eq!(no_match.candidate_source, CandidateSource::Installed);
        assert!(no_match.candidates.is_empty());
    }

    #[test]
    fn test_empty_catalog_fails() {
        let request = ToolRequest::new("nodejs", "latest", ResolutionStrategy::Strict);
        assert!(resolve_version(&request, &[], &[]).is_err());
    }

    #[rstest]
    #[case("temurin-21", ResolutionStrategy::LatestReleased, "temurin-21.0.2+13.0.LTS")]
    #[case("temurin-21", ResolutionStrategy::LatestInstalled, "temurin-21.0.2+13.0.LTS")]
    #[case("openjdk", ResolutionStrategy::LatestReleased, "openjdk-21")]
    #[case("temurin-17.0.4+101", ResolutionStrategy::Strict, "temurin-17.0.4+101")]
    fn test_non_semver_family_resolves_by_prefix(
        #[case] requested: &str,
        #[case] strategy: ResolutionStrategy,
        #[case] expected: &str,
    ) {
        let request = ToolRequest::new("java", requested, strategy);
        let resolution = resolve_version(&request, &java_released(), &[]).unwrap();
        assert_eq!(resolution.version_string, expected);
        assert!(!resolution.is_semver());
        assert!(!resolution.is_installed);
    }

    #[rstest]
    #[case(ResolutionStrategy::Strict)]
    #[case(ResolutionStrategy::LatestInstalled)]
    #[case(ResolutionStrategy::LatestReleased)]
    fn test_semver_request_does_not_cross_match_vendor_catalog(#[case] strategy: ResolutionStrategy) {
        let request = ToolRequest::new("java", "21", strategy);
        let err = resolve_version(&request, &java_released(), &[]).unwrap_err();
        let no_match = unwrap_no_match(err);
        assert_eq!(no_match.requested, "21");
        assert_eq!(no_match.tool, "java");
    }

    #[test]
    fn test_latest_installed_never_reports_missing_when_prefix_installed() {
        let installed = node_installed();
        let released = node_released();
        for prefix in ["1", "18", "2", "20", "20.1", "21"] {
            let request = ToolRequest::new("nodejs", prefix, ResolutionStrategy::LatestInstalled);
            let resolution = resolve_version(&request, &released, &installed).unwrap();
            assert!(resolution.is_installed, "prefix {prefix}");
        }
    }

    #[test]
    fn test_latest_released_returns_highest_prefix_match() {
        let released = node_released();
        for (prefix, expected) in [("1", "18.6.3"), ("2", "22.0.0"), ("20", "20.5.0"), ("20.1", "20.1.0")] {
            let request = ToolRequest::new("nodejs", prefix, ResolutionStrategy::LatestReleased);
            let resolution = resolve_version(&request, &released, &[]).unwrap();
            assert_eq!(resolution.version_string, expected);
        }
    }
}
