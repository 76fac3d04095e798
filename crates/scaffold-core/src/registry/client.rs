//! Registry client for package metadata and tarballs

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::time::Duration;
use tracing::{debug, instrument};

use crate::error::{Result, ScaffoldError};

/// Primary public npm registry.
pub const NPM_REGISTRY: &str = "https://registry.npmjs.org";

/// Mirror registry used by default.
pub const MIRROR_REGISTRY: &str = "https://registry.npmmirror.com";

/// Timeout for metadata lookups
const METADATA_TIMEOUT: Duration = Duration::from_secs(10);

/// Timeout for tarball downloads
const DOWNLOAD_TIMEOUT: Duration = Duration::from_secs(120);

/// Pick the public registry or the mirror.
pub fn default_registry(use_original: bool) -> &'static str {
    if use_original {
        NPM_REGISTRY
    } else {
        MIRROR_REGISTRY
    }
}

/// Package document returned by `GET {registry}/{name}`.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct PackageMetadata {
    #[serde(default)]
    pub name: String,

    #[serde(rename = "dist-tags", default)]
    pub dist_tags: BTreeMap<String, String>,

    /// Every published version keyed by its version string
    #[serde(default)]
    pub versions: BTreeMap<String, VersionManifest>,
}

impl PackageMetadata {
    pub fn version_list(&self) -> Vec<String> {
        self.versions.keys().cloned().collect()
    }
}

/// Manifest of one published version.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct VersionManifest {
    #[serde(default)]
    pub name: String,

    #[serde(default)]
    pub version: String,

    #[serde(default)]
    pub main: Option<String>,

    #[serde(default)]
    pub dist: Option<Dist>,
}

/// Distribution info for a published version.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Dist {
    pub tarball: String,

    /// SRI hash, usually sha512
    #[serde(default)]
    pub integrity: Option<String>,

    /// Legacy SHA-1 hex digest
    #[serde(default)]
    pub shasum: Option<String>,
}

/// Client for an npm-compatible registry.
#[derive(Debug, Clone)]
pub struct RegistryClient {
    client: reqwest::Client,
    registry_url: String,
}

impl RegistryClient {
    /// Create a client bound to `registry_url` (the mirror when `None`).
    pub fn new(registry_url: Option<&str>, user_agent: &str) -> Self {
        let registry_url = registry_url
            .map(|s| s.trim_end_matches('/').to_string())
            .unwrap_or_else(|| MIRROR_REGISTRY.to_string());

        Self {
            client: reqwest::Client::builder()
                .user_agent(user_agent)
                .build()
                .unwrap_or_else(|_| reqwest::Client::new()),
            registry_url,
        }
    }

    /// Default registry URL for this client.
    pub fn registry_url(&self) -> &str {
        &self.registry_url
    }

    fn metadata_url(&self, name: &str, registry: Option<&str>) -> String {
        let base = registry
            .map(|r| r.trim_end_matches('/'))
            .unwrap_or(&self.registry_url);
        format!("{}/{}", base, encode_package_name(name))
    }

    /// Fetch the package document. A non-2xx answer means "not found" and
    /// yields `Ok(None)`; transport failures are errors.
    #[instrument(skip(self))]
    pub async fn fetch_metadata(
        &self,
        name: &str,
        registry: Option<&str>,
    ) -> Result<Option<PackageMetadata>> {
        if name.trim().is_empty() {
            return Err(ScaffoldError::config("package name must not be empty"));
        }

        let url = self.metadata_url(name, registry);
        debug!("Fetching package metadata from {}", url);

        let response = self
            .client
            .get(&url)
            .header("Accept", "application/json")
            .timeout(METADATA_TIMEOUT)
            .send()
            .await
            .map_err(|source| ScaffoldError::Registry {
                url: url.clone(),
                source,
            })?;

        if !response.status().is_success() {
            debug!("{} answered HTTP {}", url, response.status());
            return Ok(None);
        }

        let metadata = response
            .json::<PackageMetadata>()
            .await
            .map_err(|source| ScaffoldError::Registry {
                url: url.clone(),
                source,
            })?;

        Ok(Some(metadata))
    }

    /// All published version strings; empty when the package is unknown.
    pub async fn list_versions(&self, name: &str, registry: Option<&str>) -> Result<Vec<String>> {
        Ok(self
            .fetch_metadata(name, registry)
            .await?
            .map(|metadata| metadata.version_list())
            .unwrap_or_default())
    }

    /// Download a tarball.
    #[instrument(skip(self))]
    pub async fn download_tarball(&self, url: &str) -> Result<Vec<u8>> {
        debug!("Downloading tarball from {}", url);

        let to_error = |source| ScaffoldError::Registry {
            url: url.to_string(),
            source,
        };

        let response = self
            .client
            .get(url)
            .timeout(DOWNLOAD_TIMEOUT)
            .send()
            .await
            .map_err(to_error)?;

        if !response.status().is_success() {
            return Err(ScaffoldError::RegistryResponse(format!(
                "Failed to download tarball {}: HTTP {}",
                url,
                response.status()
            )));
        }

        Ok(response.bytes().await.map_err(to_error)?.to_vec())
    }
}

/// Encode a package name for use in URLs.
fn encode_package_name(name: &str) -> String {
    if name.starts_with('@') {
        // @scope/name -> @scope%2Fname
        name.replacen('/', "%2F", 1)
    } else {
        name.to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_support::{registry_document, HttpStub};

    #[test]
    fn test_encode_package_name() {
        assert_eq!(encode_package_name("lodash"), "lodash");
        assert_eq!(encode_package_name("@scaffold/template-vue"), "@scaffold%2Ftemplate-vue");
    }

    #[test]
    fn test_default_registry() {
        assert_eq!(default_registry(true), NPM_REGISTRY);
        assert_eq!(default_registry(false), MIRROR_REGISTRY);
    }

    #[test]
    fn test_registry_url_strips_trailing_slash() {
        let client = RegistryClient::new(Some("http://localhost:4873/"), "test");
        assert_eq!(client.registry_url(), "http://localhost:4873");
        assert_eq!(
            client.metadata_url("@a/b", None),
            "http://localhost:4873/@a%2Fb"
        );
        assert_eq!(
            client.metadata_url("pkg", Some("http://other/")),
            "http://other/pkg"
        );
    }

    #[tokio::test]
    async fn test_list_versions_from_registry() {
        let stub = HttpStub::start(vec![(
            "/template-react",
            200,
            registry_document("template-react", &["1.0.0", "1.1.0", "2.0.0"]),
        )])
        .await;
        let client = RegistryClient::new(Some(&stub.url()), "test");

        let mut versions = client.list_versions("template-react", None).await.unwrap();
        versions.sort();
        assert_eq!(versions, vec!["1.0.0", "1.1.0", "2.0.0"]);
    }

    #[tokio::test]
    async fn test_not_found_is_not_an_error() {
        let stub = HttpStub::start(vec![]).await;
        let client = RegistryClient::new(Some(&stub.url()), "test");

        assert!(client.fetch_metadata("unpublished", None).await.unwrap().is_none());
        assert!(client.list_versions("unpublished", None).await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_empty_name_rejected() {
        let client = RegistryClient::new(Some("http://127.0.0.1:9"), "test");
        let err = client.fetch_metadata("  ", None).await.unwrap_err();
        assert!(matches!(err, ScaffoldError::Config(_)));
    }

    #[tokio::test]
    async fn test_transport_failure_is_registry_error() {
        // Port 9 (discard) is not listening locally
        let client = RegistryClient::new(Some("http://127.0.0.1:9"), "test");
        let err = client.fetch_metadata("anything", None).await.unwrap_err();
        assert!(matches!(err, ScaffoldError::Registry { .. }));
    }
}
