//! Version resolution against published registry versions

use semver::{Version, VersionReq};

use super::client::RegistryClient;
use crate::error::Result;

/// Parse version string, tolerating a leading 'v'
pub fn parse_version(version_str: &str) -> Option<Version> {
    let cleaned = version_str.strip_prefix('v').unwrap_or(version_str);
    Version::parse(cleaned).ok()
}

/// Greatest version satisfying `^base`, or `None` when nothing qualifies
/// (the caller then stays on its current version).
pub fn resolve_compatible(base: &str, versions: &[String]) -> Option<String> {
    let req = VersionReq::parse(&format!("^{}", base.trim_start_matches('v'))).ok()?;

    versions
        .iter()
        .filter_map(|raw| parse_version(raw).map(|v| (v, raw)))
        .filter(|(v, _)| req.matches(v))
        .max_by(|(a, _), (b, _)| a.cmp(b))
        .map(|(_, raw)| raw.clone())
}

/// Highest version by semver precedence, ignoring any range.
pub fn latest_of(versions: &[String]) -> Option<String> {
    versions
        .iter()
        .filter_map(|raw| parse_version(raw).map(|v| (v, raw)))
        .max_by(|(a, _), (b, _)| a.cmp(b))
        .map(|(_, raw)| raw.clone())
}

/// Query the registry and return its highest published version; `None`
/// when the package is unknown or has no parseable versions.
pub async fn resolve_latest(
    client: &RegistryClient,
    name: &str,
    registry: Option<&str>,
) -> Result<Option<String>> {
    let versions = client.list_versions(name, registry).await?;
    Ok(latest_of(&versions))
}

/// Newer release of `name` compatible with `current`, if the registry has one.
pub async fn check_for_update(
    client: &RegistryClient,
    name: &str,
    current: &str,
) -> Result<Option<String>> {
    let versions = client.list_versions(name, None).await?;
    let Some(current_version) = parse_version(current) else {
        return Ok(None);
    };

    Ok(resolve_compatible(current, &versions).filter(|candidate| {
        parse_version(candidate).is_some_and(|candidate| candidate > current_version)
    }))
}
