//! Dependency installation into the package cache

use async_trait::async_trait;
use base64::{engine::general_purpose::STANDARD as BASE64, Engine};
use flate2::read::GzDecoder;
use sha1::Sha1;
use sha2::{Digest, Sha256, Sha384, Sha512};
use std::path::{Component, Path, PathBuf};
use tar::Archive;
use tracing::{debug, info, instrument, warn};

use super::cache::cache_path;
use crate::error::{Result, ScaffoldError};
use crate::registry::RegistryClient;

/// One package to install.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PackageSpec {
    pub name: String,
    pub version: String,
}

/// Everything an installer needs for one non-interactive install.
#[derive(Debug, Clone)]
pub struct InstallRequest {
    /// Consuming project root (direct-mode packages land in `root/node_modules`)
    pub root: PathBuf,
    /// Shared cache root; packages land in their version-qualified directory
    pub store_dir: Option<PathBuf>,
    pub registry: String,
    pub packages: Vec<PackageSpec>,
}

impl InstallRequest {
    /// Where `spec` ends up on disk for this request.
    pub fn destination(&self, spec: &PackageSpec) -> PathBuf {
        match &self.store_dir {
            Some(store_dir) => cache_path(store_dir, &spec.name, &spec.version),
            None => self.root.join("node_modules").join(&spec.name),
        }
    }
}

/// Performs a non-interactive install; resolves or fails as a whole.
#[async_trait]
pub trait DependencyInstaller: Send + Sync {
    async fn install(&self, request: &InstallRequest) -> Result<()>;
}

/// Downloads registry tarballs and unpacks them into the cache.
///
/// Only the requested packages are fetched, not their dependency trees.
pub struct TarballInstaller {
    registry: RegistryClient,
}

impl TarballInstaller {
    pub fn new(registry: RegistryClient) -> Self {
        Self { registry }
    }

    #[instrument(skip(self, request))]
    async fn install_one(&self, request: &InstallRequest, spec: &PackageSpec) -> Result<()> {
        let dest = request.destination(spec);
        if dest.exists() {
            debug!("{}@{} already present at {}", spec.name, spec.version, dest.display());
            return Ok(());
        }

        let metadata = self
            .registry
            .fetch_metadata(&spec.name, Some(&request.registry))
            .await?
            .ok_or_else(|| {
                ScaffoldError::RegistryResponse(format!("Package not found: {}", spec.name))
            })?;

        let manifest = metadata.versions.get(&spec.version).ok_or_else(|| {
            ScaffoldError::RegistryResponse(format!(
                "Version {} not found for package {}",
                spec.version, spec.name
            ))
        })?;
        let dist = manifest.dist.as_ref().ok_or_else(|| {
            ScaffoldError::RegistryResponse(format!(
                "{}@{} has no tarball",
                spec.name, spec.version
            ))
        })?;

        let bytes = self.registry.download_tarball(&dist.tarball).await?;

        match &dist.integrity {
            Some(integrity) => {
                if !verify_integrity(&bytes, integrity) {
                    return Err(ScaffoldError::IntegrityMismatch {
                        package: format!("{}@{}", spec.name, spec.version),
                        expected: integrity.clone(),
                        actual: compute_integrity(&bytes),
                    });
                }
                debug!("Integrity verified for {}", spec.name);
            }
            None => match &dist.shasum {
                Some(shasum) => {
                    if !verify_shasum(&bytes, shasum) {
                        return Err(ScaffoldError::IntegrityMismatch {
                            package: format!("{}@{}", spec.name, spec.version),
                            expected: shasum.clone(),
                            actual: compute_shasum(&bytes),
                        });
                    }
                    debug!("SHA-1 verified for {}", spec.name);
                }
                None => warn!("No integrity hash for {}, skipping verification", spec.name),
            },
        }

        let dest_for_task = dest.clone();
        tokio::task::spawn_blocking(move || unpack_atomically(&bytes, &dest_for_task))
            .await
            .map_err(|e| ScaffoldError::Io(std::io::Error::other(e)))??;

        info!("Installed {}@{} into {}", spec.name, spec.version, dest.display());
        Ok(())
    }
}

#[async_trait]
impl DependencyInstaller for TarballInstaller {
    async fn install(&self, request: &InstallRequest) -> Result<()> {
        for spec in &request.packages {
            self.install_one(request, spec).await?;
        }
        Ok(())
    }
}

/// Unpack into a staging directory next to `dest`, then rename it into
/// place. `dest` either holds the whole package or does not exist.
fn unpack_atomically(tarball: &[u8], dest: &Path) -> Result<()> {
    let parent = dest
        .parent()
        .ok_or_else(|| ScaffoldError::config(format!("invalid cache path {}", dest.display())))?;
    std::fs::create_dir_all(parent)?;

    let staging = tempfile::Builder::new()
        .prefix(".staging-")
        .tempdir_in(parent)?;
    extract_tarball(tarball, staging.path())?;
    std::fs::rename(staging.path(), dest)?;
    Ok(())
}

/// Extract an npm tarball, dropping its leading `package/` directory.
fn extract_tarball(tarball: &[u8], dest: &Path) -> Result<()> {
    let mut archive = Archive::new(GzDecoder::new(tarball));

    for entry in archive.entries()? {
        let mut entry = entry?;
        let path = entry.path()?.into_owned();

        let stripped: PathBuf = path.components().skip(1).collect();
        if stripped.as_os_str().is_empty() {
            continue;
        }
        if stripped
            .components()
            .any(|c| !matches!(c, Component::Normal(_)))
        {
            warn!("Skipping suspicious tarball entry {}", path.display());
            continue;
        }

        let dest_file = dest.join(&stripped);
        if let Some(parent) = dest_file.parent() {
            std::fs::create_dir_all(parent)?;
        }
        entry.unpack(&dest_file)?;
    }

    Ok(())
}

/// Verify an SRI integrity string (`sha512-BASE64 ...`).
fn verify_integrity(data: &[u8], integrity: &str) -> bool {
    integrity.split_whitespace().any(|hash_str| {
        let Some((algo, expected)) = hash_str.split_once('-') else {
            return false;
        };
        let computed = match algo {
            "sha256" => BASE64.encode(Sha256::digest(data)),
            "sha384" => BASE64.encode(Sha384::digest(data)),
            "sha512" => BASE64.encode(Sha512::digest(data)),
            _ => return false,
        };
        computed == expected
    })
}

fn compute_integrity(data: &[u8]) -> String {
    format!("sha512-{}", BASE64.encode(Sha512::digest(data)))
}

/// Verify the legacy hex SHA-1 `shasum`.
fn verify_shasum(data: &[u8], expected: &str) -> bool {
    compute_shasum(data).eq_ignore_ascii_case(expected)
}

fn compute_shasum(data: &[u8]) -> String {
    hex::encode(Sha1::digest(data))
}
