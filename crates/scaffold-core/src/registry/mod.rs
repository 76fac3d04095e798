//! npm-compatible registry access
//!
//! This module provides:
//! - Package metadata lookup against a registry or mirror
//! - Version list extraction and tarball download
//! - Version resolution (caret-compatible and latest)
//! - The CLI's own update check

pub mod client;
pub mod version;

pub use client::{
    default_registry, Dist, PackageMetadata, RegistryClient, VersionManifest, MIRROR_REGISTRY,
    NPM_REGISTRY,
};
pub use version::{check_for_update, latest_of, resolve_compatible, resolve_latest};
