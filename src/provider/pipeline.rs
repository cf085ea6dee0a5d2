//! Install pipeline shared by all backends
//!
//! A backend only supplies the [`VersionManager`] primitives. The order of
//! calls, the exact-match short-circuit and the single catalog refresh live
//! here:
//! 1. provision the plugin
//! 2. list installed versions, return early on an exact match
//! 3. list released versions and resolve
//! 4. on a miss against the released catalog, refresh it and resolve once more
//! 5. install the resolved version unless it is already present

use tracing::{debug, info, warn};

#[cfg(test)]
use mockall::automock;

use crate::domain::{ToolInstallResult, ToolRequest};
use crate::error::{CandidateSource, NoMatchingVersion, ProviderError, ResolveError, ToolInstallError};
use crate::version::{resolve_version, VersionResolution};

/// Resolution attempts per request: the first one plus one after a catalog refresh
const RESOLVE_ATTEMPTS: usize = 2;

/// Primitive operations a version manager backend must provide
#[cfg_attr(test, automock)]
pub trait VersionManager {
    /// Make sure the version manager can handle the requested tool. Idempotent.
    fn provision_plugin(&self, request: &ToolRequest) -> Result<(), ProviderError>;

    /// Versions installed on this machine. Empty, not an error, if there are none.
    fn list_installed(&self, tool_name: &str) -> Result<Vec<String>, ProviderError>;

    /// All published versions
    fn list_released(&self, tool_name: &str) -> Result<Vec<String>, ProviderError>;

    /// Refresh the released-version catalog of a tool
    fn refresh_catalog(&self, tool_name: &str) -> Result<(), ProviderError>;

    /// Install one concrete version
    fn install(&self, tool_name: &str, version: &str) -> Result<(), ProviderError>;

    /// Tool specific fix-up after a fresh install
    fn post_install(&self, _tool_name: &str, _version: &str) -> Result<(), ProviderError> {
        Ok(())
    }
}

/// Outcome of a single resolution attempt
enum Attempt {
    Resolved(VersionResolution),
    /// The released catalog had no match and may be out of date
    StaleCatalog(NoMatchingVersion),
    /// No match that a catalog refresh could fix
    NoMatch(NoMatchingVersion),
}

impl Attempt {
    fn run(request: &ToolRequest, released: &[String], installed: &[String]) -> Self {
        match resolve_version(request, released, installed) {
            Ok(resolution) => Attempt::Resolved(resolution),
            Err(ResolveError::NoMatchingVersion(no_match)) => match no_match.candidate_source {
                CandidateSource::Released => Attempt::StaleCatalog(no_match),
                CandidateSource::Installed => Attempt::NoMatch(no_match),
            },
        }
    }
}

/// Run the install pipeline for one request against a backend
pub fn install_with<M: VersionManager + ?Sized>(
    manager: &M,
    request: &ToolRequest,
) -> Result<ToolInstallResult, ProviderError> {
    let tool_name = request.tool_name();

    manager.provision_plugin(request)?;
    let installed = manager.list_installed(tool_name)?;

    // Listing released versions can be slow and hit the network
    let requested = request.unparsed_version();
    if !requested.is_empty() && installed.iter().any(|v| v == requested) {
        debug!(tool = tool_name, version = requested, "exact version already installed");
        return Ok(ToolInstallResult::already_installed(tool_name, requested));
    }

    let resolution = resolve_with_refresh(manager, request, &installed)?;
    if resolution.is_installed {
        debug!(
            tool = tool_name,
            version = %resolution.version_string,
            "resolved version already installed"
        );
        return Ok(ToolInstallResult::already_installed(
            tool_name,
            resolution.version_string,
        ));
    }

    info!(tool = tool_name, version = %resolution.version_string, "installing");
    manager.install(tool_name, &resolution.version_string)?;
    manager.post_install(tool_name, &resolution.version_string)?;

    Ok(ToolInstallResult::newly_installed(
        tool_name,
        resolution.version_string,
    ))
}

fn resolve_with_refresh<M: VersionManager + ?Sized>(
    manager: &M,
    request: &ToolRequest,
    installed: &[String],
) -> Result<VersionResolution, ProviderError> {
    let tool_name = request.tool_name();
    let mut released = manager.list_released(tool_name)?;
    let mut attempt = 1;

    loop {
        match Attempt::run(request, &released, installed) {
            Attempt::Resolved(resolution) => return Ok(resolution),
            Attempt::StaleCatalog(no_match) if attempt < RESOLVE_ATTEMPTS => {
                warn!(
                    tool = tool_name,
                    requested = %no_match.requested,
                    "no matching version found, refreshing catalog and retrying"
                );
                manager.refresh_catalog(tool_name)?;
                released = manager.list_released(tool_name)?;
                attempt += 1;
            }
            Attempt::StaleCatalog(no_match) | Attempt::NoMatch(no_match) => {
                return Err(ToolInstallError::no_matching_version(&no_match).into());
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::ResolutionStrategy;
    use crate::error::ToolInstallErrorKind;
    use mockall::predicate::eq;
    use std::sync::atomic::{AtomicUsize, Ordering};

    fn versions(list: &[&str]) -> Vec<String> {
        list.iter().map(|v| v.to_string()).collect()
    }

    fn manager_with_installed(installed: &'static [&'static str]) -> MockVersionManager {
        let mut manager = MockVersionManager::new();
        manager.expect_provision_plugin().returning(|_| Ok(()));
        manager
            .expect_list_installed()
            .returning(move |_| Ok(versions(installed)));
        manager
    }

    #[test]
    fn test_exact_installed_match_skips_released_listing() {
        let mut manager = manager_with_installed(&["20.5.0"]);
        manager.expect_list_released().never();
        manager.expect_install().never();

        let request = ToolRequest::new("nodejs", "20.5.0", ResolutionStrategy::LatestReleased);
        let result = install_with(&manager, &request).unwrap();
        assert!(result.is_already_installed);
        assert_eq!(result.concrete_version, "20.5.0");
    }

    #[test]
    fn test_installs_resolved_version() {
        let mut manager = manager_with_installed(&["18.6.3"]);
        manager
            .expect_list_released()
            .times(1)
            .returning(|_| Ok(versions(&["20.5.0", "20.1.0", "18.6.3"])));
        manager
            .expect_install()
            .with(eq("nodejs"), eq("20.5.0"))
            .times(1)
            .returning(|_, _| Ok(()));
        manager
            .expect_post_install()
            .with(eq("nodejs"), eq("20.5.0"))
            .times(1)
            .returning(|_, _| Ok(()));
        manager.expect_refresh_catalog().never();

        let request = ToolRequest::new("nodejs", "20", ResolutionStrategy::LatestReleased);
        let result = install_with(&manager, &request).unwrap();
        assert!(!result.is_already_installed);
        assert_eq!(result.concrete_version, "20.5.0");
        assert_eq!(result.tool_name, "nodejs");
    }

    #[test]
    fn test_resolved_installed_version_is_not_reinstalled() {
        let mut manager = manager_with_installed(&["20.1.0"]);
        manager
            .expect_list_released()
            .returning(|_| Ok(versions(&["20.5.0", "20.1.0"])));
        manager.expect_install().never();

        let request = ToolRequest::new("nodejs", "20", ResolutionStrategy::LatestInstalled);
        let result = install_with(&manager, &request).unwrap();
        assert!(result.is_already_installed);
        assert_eq!(result.concrete_version, "20.1.0");
    }

    #[test]
    fn test_refreshes_catalog_once_and_retries() {
        let listings = AtomicUsize::new(0);
        let mut manager = manager_with_installed(&[]);
        manager.expect_list_released().times(2).returning(move |_| {
            if listings.fetch_add(1, Ordering::SeqCst) == 0 {
                Ok(versions(&["3.2.0"]))
            } else {
                Ok(versions(&["3.2.0", "3.3.0"]))
            }
        });
        manager
            .expect_refresh_catalog()
            .with(eq("ruby"))
            .times(1)
            .returning(|_| Ok(()));
        manager
            .expect_install()
            .with(eq("ruby"), eq("3.3.0"))
            .times(1)
            .returning(|_, _| Ok(()));
        manager.expect_post_install().returning(|_, _| Ok(()));

        let request = ToolRequest::new("ruby", "3.3.0", ResolutionStrategy::Strict);
        let result = install_with(&manager, &request).unwrap();
        assert_eq!(result.concrete_version, "3.3.0");
    }

    #[test]
    fn test_second_miss_becomes_install_error() {
        let mut manager = manager_with_installed(&["20.0.0"]);
        manager
            .expect_list_released()
            .times(2)
            .returning(|_| Ok(versions(&["20.0.0", "22.1.0"])));
        manager
            .expect_refresh_catalog()
            .times(1)
            .returning(|_| Ok(()));
        manager.expect_install().never();

        let request = ToolRequest::new("nodejs", "22", ResolutionStrategy::Strict);
        let err = install_with(&manager, &request).unwrap_err();
        match err {
            ProviderError::Install(install_err) => {
                assert_eq!(install_err.kind, ToolInstallErrorKind::NoMatchingVersion);
                assert!(install_err.to_string().contains("No exact match found for 22"));
                assert!(install_err.recommendation.contains("22:latest"));
                assert!(install_err.raw_output.contains("- 22.1.0"));
            }
            other => panic!("unexpected error: {other:?}"),
        }
    }

    #[test]
    fn test_missing_installed_versions_are_not_refreshed() {
        let mut manager = manager_with_installed(&[]);
        manager
            .expect_list_released()
            .times(1)
            .returning(|_| Ok(versions(&["20.0.0"])));
        manager.expect_refresh_catalog().never();

        let request = ToolRequest::new("nodejs", "installed", ResolutionStrategy::Strict);
        let err = install_with(&manager, &request).unwrap_err();
        assert!(matches!(err, ProviderError::Install(_)));
    }

    #[test]
    fn test_install_failure_skips_post_install() {
        let mut manager = manager_with_installed(&[]);
        manager
            .expect_list_released()
            .returning(|_| Ok(versions(&["1.22.1"])));
        manager.expect_install().returning(|tool, version| {
            Err(ToolInstallError::install_failed(tool, version, "asdf install failed", "boom").into())
        });
        manager.expect_post_install().never();

        let request = ToolRequest::new("golang", "1.22", ResolutionStrategy::LatestReleased);
        let err = install_with(&manager, &request).unwrap_err();
        assert!(err.to_string().contains("failed to install golang 1.22.1"));
    }

    #[test]
    fn test_provision_failure_stops_pipeline() {
        let mut manager = MockVersionManager::new();
        manager
            .expect_provision_plugin()
            .returning(|request| Err(ToolInstallError::unsupported_tool(request.tool_name(), "1.0").into()));
        manager.expect_list_installed().never();

        let request = ToolRequest::new("foo", "1.0", ResolutionStrategy::Strict);
        assert!(install_with(&manager, &request).is_err());
    }
}
