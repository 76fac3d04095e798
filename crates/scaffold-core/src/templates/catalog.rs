//! Template catalog loading from a remote service or a local file
//!
//! Remote catalogs answer `GET {base}/project/template` with a JSON array of
//! descriptors; local catalogs are YAML (or JSON) files with the same shape.

use super::descriptor::TemplateDescriptor;
use crate::error::{Result, ScaffoldError};
use std::path::PathBuf;
use std::time::Duration;
use tokio::fs;
use tracing::debug;
use url::Url;

/// Timeout for catalog requests
const CATALOG_TIMEOUT: Duration = Duration::from_secs(5);

/// Catalog source - either remote URL or local file
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CatalogSource {
    Remote(Url),
    Local(PathBuf),
}

impl CatalogSource {
    /// Create a remote catalog source from a base URL
    pub fn remote(base: &str) -> Result<Self> {
        let url = Url::parse(base)
            .map_err(|e| ScaffoldError::config(format!("Invalid catalog URL {}: {}", base, e)))?;
        Ok(Self::Remote(url))
    }

    /// Create a local catalog source from a path
    pub fn local(path: PathBuf) -> Self {
        Self::Local(path)
    }
}

/// Loads the list of available templates.
pub struct TemplateCatalog {
    source: CatalogSource,
    client: reqwest::Client,
}

impl TemplateCatalog {
    pub fn new(source: CatalogSource, user_agent: &str) -> Self {
        Self {
            source,
            client: reqwest::Client::builder()
                .user_agent(user_agent)
                .timeout(CATALOG_TIMEOUT)
                .build()
                .unwrap_or_else(|_| reqwest::Client::new()),
        }
    }

    /// Build a URL by appending path segments, preserving query parameters
    fn build_url(base: &Url, segments: &[&str]) -> Result<Url> {
        let mut url = base.clone();
        url.path_segments_mut()
            .map_err(|_| ScaffoldError::config(format!("URL cannot have path segments: {}", base)))?
            .pop_if_empty()
            .extend(segments);
        Ok(url)
    }

    /// Fetch every template descriptor from the source.
    pub async fn fetch(&self) -> Result<Vec<TemplateDescriptor>> {
        match &self.source {
            CatalogSource::Remote(base_url) => {
                let url = Self::build_url(base_url, &["project", "template"])?;
                debug!("Fetching template catalog from {}", url);

                let to_error = |source| ScaffoldError::Registry {
                    url: url.to_string(),
                    source,
                };
                let response = self
                    .client
                    .get(url.clone())
                    .send()
                    .await
                    .map_err(to_error)?;

                if !response.status().is_success() {
                    return Err(ScaffoldError::RegistryResponse(format!(
                        "Failed to fetch template catalog from {}: HTTP {}",
                        url,
                        response.status()
                    )));
                }

                response
                    .json::<Vec<TemplateDescriptor>>()
                    .await
                    .map_err(to_error)
            }
            CatalogSource::Local(path) => {
                debug!("Reading template catalog from {}", path.display());
                let content = fs::read_to_string(path).await?;
                Ok(serde_yaml::from_str(&content)?)
            }
        }
    }

    /// Get the catalog source
    pub fn source(&self) -> &CatalogSource {
        &self.source
    }
}
