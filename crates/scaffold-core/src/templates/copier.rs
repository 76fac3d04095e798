//! Template file copying and target directory housekeeping

use crate::error::Result;
use std::path::{Path, PathBuf};
use tokio::fs;
use walkdir::WalkDir;

/// Dependency folder that never counts as project content.
pub const DEPENDENCY_DIR: &str = "node_modules";

/// Copy the whole tree under `source` into `target_dir`, creating both if
/// missing. Existing files are overwritten. Returns the copied paths
/// relative to `target_dir`.
pub async fn copy_template(source: &Path, target_dir: &Path) -> Result<Vec<PathBuf>> {
    fs::create_dir_all(source).await?;
    fs::create_dir_all(target_dir).await?;

    let mut copied_files = Vec::new();

    for entry in WalkDir::new(source).min_depth(1) {
        let entry = entry.map_err(std::io::Error::from)?;
        let relative = entry
            .path()
            .strip_prefix(source)
            .map_err(std::io::Error::other)?
            .to_path_buf();
        let target_path = target_dir.join(&relative);

        if entry.file_type().is_dir() {
            fs::create_dir_all(&target_path).await?;
            continue;
        }

        // Ensure parent directories exist
        if let Some(parent) = target_path.parent() {
            fs::create_dir_all(parent).await?;
        }
        fs::copy(entry.path(), &target_path).await?;
        copied_files.push(relative);
    }

    Ok(copied_files)
}

/// A directory is empty when it holds nothing but dotfiles and the
/// dependency folder.
pub fn is_dir_empty(dir: &Path) -> Result<bool> {
    if !dir.exists() {
        return Ok(true);
    }

    for entry in std::fs::read_dir(dir)? {
        let name = entry?.file_name();
        let name = name.to_string_lossy();
        if !name.starts_with('.') && name != DEPENDENCY_DIR {
            return Ok(false);
        }
    }
    Ok(true)
}

/// Remove every entry of `dir` (dotfiles included), keeping `dir` itself.
pub async fn empty_dir(dir: &Path) -> Result<()> {
    if !dir.exists() {
        fs::create_dir_all(dir).await?;
        return Ok(());
    }

    let mut entries = fs::read_dir(dir).await?;
    while let Some(entry) = entries.next_entry().await? {
        let path = entry.path();
        if entry.file_type().await?.is_dir() {
            fs::remove_dir_all(&path).await?;
        } else {
            fs::remove_file(&path).await?;
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_support::write_files;
    use tempfile::TempDir;

    #[test]
    fn test_dotfiles_and_dependency_dir_count_as_empty() {
        let dir = TempDir::new().unwrap();
        std::fs::create_dir(dir.path().join(".git")).unwrap();
        std::fs::create_dir(dir.path().join("node_modules")).unwrap();
        write_files(dir.path(), &[(".env", "A=1")]);
        assert!(is_dir_empty(dir.path()).unwrap());

        write_files(dir.path(), &[("README.md", "hi")]);
        assert!(!is_dir_empty(dir.path()).unwrap());
    }

    #[test]
    fn test_missing_dir_is_empty() {
        let dir = TempDir::new().unwrap();
        assert!(is_dir_empty(&dir.path().join("nope")).unwrap());
    }

    #[tokio::test]
    async fn test_copy_preserves_structure() {
        let src = TempDir::new().unwrap();
        let dest = TempDir::new().unwrap();
        write_files(
            src.path(),
            &[
                ("package.json", "{}"),
                ("src/main.js", "console.log(1)"),
                ("public/img/logo.svg", "<svg/>"),
            ],
        );

        let mut copied = copy_template(src.path(), dest.path()).await.unwrap();
        copied.sort();

        assert_eq!(copied.len(), 3);
        assert_eq!(
            std::fs::read_to_string(dest.path().join("src/main.js")).unwrap(),
            "console.log(1)"
        );
        assert!(dest.path().join("public/img/logo.svg").is_file());
    }

    #[tokio::test]
    async fn test_copy_creates_missing_source_and_target() {
        let root = TempDir::new().unwrap();
        let src = root.path().join("pkg/template");
        let dest = root.path().join("out");

        let copied = copy_template(&src, &dest).await.unwrap();

        assert!(copied.is_empty());
        assert!(src.is_dir());
        assert!(dest.is_dir());
    }

    #[tokio::test]
    async fn test_empty_dir_removes_everything() {
        let dir = TempDir::new().unwrap();
        write_files(dir.path(), &[(".git/HEAD", "ref"), ("a/b.txt", "x"), ("c.txt", "y")]);

        empty_dir(dir.path()).await.unwrap();

        assert!(dir.path().is_dir());
        assert_eq!(std::fs::read_dir(dir.path()).unwrap().count(), 0);
    }
}
