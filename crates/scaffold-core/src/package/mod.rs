//! Versioned package references backed by a registry and a local cache
//!
//! A [`Package`] is either in cached mode (a `store_dir` is set and every
//! version lives in its own directory under it) or in direct mode (the
//! package is consumed from `target_path` as-is).

pub mod cache;
pub mod installer;

use std::path::{Path, PathBuf};
use std::sync::Arc;
use tracing::debug;

use crate::error::{Result, ScaffoldError};
use crate::registry::{resolve_latest, version::parse_version, RegistryClient};

pub use cache::{cache_path, entry_file_path};
pub use installer::{DependencyInstaller, InstallRequest, PackageSpec, TarballInstaller};

/// Sentinel version meaning "whatever the registry publishes as highest".
pub const LATEST: &str = "latest";

/// Construction options for a [`Package`].
#[derive(Debug, Clone)]
pub struct PackageOptions {
    /// Consuming directory (direct mode) or install root (cached mode)
    pub target_path: PathBuf,
    /// Cache root; enables cached mode
    pub store_dir: Option<PathBuf>,
    pub package_name: String,
    /// Explicit semver or [`LATEST`]
    pub package_version: String,
}

/// A remote-or-local package reference.
pub struct Package {
    target_path: PathBuf,
    store_dir: Option<PathBuf>,
    name: String,
    requested_version: String,
    resolved_version: Option<String>,
    registry: RegistryClient,
    installer: Arc<dyn DependencyInstaller>,
}

impl std::fmt::Debug for Package {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Package")
            .field("name", &self.name)
            .field("requested_version", &self.requested_version)
            .field("resolved_version", &self.resolved_version)
            .field("target_path", &self.target_path)
            .field("store_dir", &self.store_dir)
            .finish()
    }
}

impl Package {
    /// Validate `options` and build an unprepared reference.
    pub fn new(
        options: PackageOptions,
        registry: RegistryClient,
        installer: Arc<dyn DependencyInstaller>,
    ) -> Result<Self> {
        if options.package_name.trim().is_empty() {
            return Err(ScaffoldError::config("package name must not be empty"));
        }
        if options.target_path.as_os_str().is_empty() {
            return Err(ScaffoldError::config(format!(
                "target path must not be empty for package {}",
                options.package_name
            )));
        }
        let version = options.package_version.trim();
        if version != LATEST && parse_version(version).is_none() {
            return Err(ScaffoldError::config(format!(
                "invalid version '{}' for package {}",
                version, options.package_name
            )));
        }

        Ok(Self {
            target_path: options.target_path,
            store_dir: options.store_dir,
            name: options.package_name,
            requested_version: version.to_string(),
            resolved_version: None,
            registry,
            installer,
        })
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn requested_version(&self) -> &str {
        &self.requested_version
    }

    /// Resolved version, once [`Package::prepare`] has run.
    pub fn resolved_version(&self) -> Option<&str> {
        self.resolved_version.as_deref()
    }

    pub fn is_cached(&self) -> bool {
        self.store_dir.is_some()
    }

    /// Pin the version. No-op once resolved; `latest` hits the registry.
    pub async fn prepare(&mut self) -> Result<()> {
        if self.resolved_version.is_some() {
            return Ok(());
        }

        let version = if self.requested_version == LATEST {
            resolve_latest(&self.registry, &self.name, None)
                .await?
                .ok_or_else(|| ScaffoldError::NoVersionAvailable(self.name.clone()))?
        } else {
            self.requested_version.clone()
        };

        debug!("{} resolved to {}", self.name, version);
        self.resolved_version = Some(version);
        Ok(())
    }

    /// Cache directory of the resolved version. `None` in direct mode or
    /// before [`Package::prepare`].
    pub fn cache_file_path(&self) -> Option<PathBuf> {
        let store_dir = self.store_dir.as_ref()?;
        let version = self.resolved_version.as_ref()?;
        Some(cache_path(store_dir, &self.name, version))
    }

    /// Directory the package's files are read from.
    pub fn package_dir(&self) -> PathBuf {
        self.cache_file_path()
            .unwrap_or_else(|| self.target_path.clone())
    }

    /// Whether the package is present locally.
    pub async fn exists(&mut self) -> Result<bool> {
        match &self.store_dir {
            Some(_) => {
                self.prepare().await?;
                Ok(self
                    .cache_file_path()
                    .is_some_and(|path| path.exists()))
            }
            None => Ok(self.target_path.exists()),
        }
    }

    /// Install the resolved version through the dependency installer.
    pub async fn install(&mut self) -> Result<()> {
        self.prepare().await?;
        let version = self.pinned_version()?;

        self.run_installer(&version)
            .await
            .map_err(|e| ScaffoldError::Install {
                package: self.name.clone(),
                version,
                message: e.to_string(),
            })
    }

    /// Move to the registry's latest version, installing it only if it is
    /// not cached yet. A registry that lags behind the resolved version
    /// leaves the package where it is.
    pub async fn update(&mut self) -> Result<()> {
        self.prepare().await?;

        let latest = resolve_latest(&self.registry, &self.name, None)
            .await?
            .ok_or_else(|| ScaffoldError::NoVersionAvailable(self.name.clone()))?;

        let current = self.resolved_version.as_deref().and_then(parse_version);
        if let (Some(current), Some(candidate)) = (current, parse_version(&latest)) {
            if candidate < current {
                debug!(
                    "{}: registry latest {} is older than {}, keeping it",
                    self.name, latest, current
                );
                return Ok(());
            }
        }

        let already_cached = self
            .store_dir
            .as_ref()
            .is_some_and(|store_dir| cache_path(store_dir, &self.name, &latest).exists());

        if !already_cached {
            self.run_installer(&latest)
                .await
                .map_err(|e| ScaffoldError::Update {
                    package: self.name.clone(),
                    version: latest.clone(),
                    message: e.to_string(),
                })?;
        } else {
            debug!("{}@{} already cached", self.name, latest);
        }

        self.resolved_version = Some(latest);
        Ok(())
    }

    /// Entry file declared by the package manifest. Never touches the network.
    pub fn entry_file_path(&self) -> Result<Option<PathBuf>> {
        if self.store_dir.is_some() {
            match self.cache_file_path() {
                Some(path) => entry_file_path(&path),
                None => Ok(None),
            }
        } else {
            entry_file_path(&self.target_path)
        }
    }

    fn pinned_version(&self) -> Result<String> {
        self.resolved_version
            .clone()
            .ok_or_else(|| ScaffoldError::NoVersionAvailable(self.name.clone()))
    }

    async fn run_installer(&self, version: &str) -> Result<()> {
        if let Some(store_dir) = &self.store_dir {
            ensure_dir(store_dir).await?;
        }

        let request = InstallRequest {
            root: self.target_path.clone(),
            store_dir: self.store_dir.clone(),
            registry: self.registry.registry_url().to_string(),
            packages: vec![PackageSpec {
                name: self.name.clone(),
                version: version.to_string(),
            }],
        };
        self.installer.install(&request).await
    }
}

async fn ensure_dir(path: &Path) -> Result<()> {
    tokio::fs::create_dir_all(path).await?;
    Ok(())
}
