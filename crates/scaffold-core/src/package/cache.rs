//! Version-qualified local package cache layout

use serde::Deserialize;
use std::path::{Component, Path, PathBuf};

use crate::error::Result;

/// Manifest file that marks a package root.
pub const MANIFEST_FILE: &str = "package.json";

/// Directory that holds `name@version` inside `store_dir`:
/// `{store_dir}/_{sanitized}@{version}@{name}`.
pub fn cache_path(store_dir: &Path, name: &str, version: &str) -> PathBuf {
    store_dir.join(format!("_{}@{}@{}", sanitize(name), version, name))
}

/// Replace the first scope separator so the prefix is a single path segment.
fn sanitize(name: &str) -> String {
    name.replacen('/', "_", 1)
}

#[derive(Debug, Deserialize)]
struct Manifest {
    #[serde(default)]
    main: Option<String>,
}

/// Nearest ancestor-or-self of `start` containing a manifest file.
pub fn find_package_root(start: &Path) -> Option<PathBuf> {
    start
        .ancestors()
        .find(|dir| dir.join(MANIFEST_FILE).is_file())
        .map(Path::to_path_buf)
}

/// Resolve the entry file declared by the package containing `root_dir`.
///
/// Returns `None` when `root_dir` does not exist, when no manifest is found
/// walking up from it, or when the manifest has no `main` field.
pub fn entry_file_path(root_dir: &Path) -> Result<Option<PathBuf>> {
    if !root_dir.exists() {
        return Ok(None);
    }

    let root_dir = std::path::absolute(root_dir)?;
    let Some(package_dir) = find_package_root(&root_dir) else {
        return Ok(None);
    };

    let content = std::fs::read_to_string(package_dir.join(MANIFEST_FILE))?;
    let manifest: Manifest = serde_json::from_str(&content)?;

    Ok(manifest
        .main
        .filter(|main| !main.trim().is_empty())
        .map(|main| to_forward_slashes(&normalize(&package_dir.join(main)))))
}

/// Fold `.` and `..` components without touching the filesystem.
fn normalize(path: &Path) -> PathBuf {
    let mut out = PathBuf::new();
    for component in path.components() {
        match component {
            Component::CurDir => {}
            Component::ParentDir => {
                out.pop();
            }
            other => out.push(other.as_os_str()),
        }
    }
    out
}

fn to_forward_slashes(path: &Path) -> PathBuf {
    if std::path::MAIN_SEPARATOR == '/' {
        path.to_path_buf()
    } else {
        PathBuf::from(path.to_string_lossy().replace('\\', "/"))
    }
}
