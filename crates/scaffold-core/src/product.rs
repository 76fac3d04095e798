//! Product configuration trait for CLI binaries
//!
//! Each binary built on this library implements this trait to configure
//! identity, environment variable names and defaults.

use std::path::Path;

use crate::project::ProjectInfo;

/// Configuration trait for CLI products
///
/// Each product implements this trait to define:
/// - Product identity (name, display name)
/// - Environment variable names for overrides
/// - Default catalog URL and CLI home directory
/// - Commands served by registry packages
/// - Post-scaffold instructions
pub trait ProductConfig: Clone + Send + Sync + 'static {
    /// Internal product name (used for the CLI command)
    fn name(&self) -> &'static str;

    /// Human-readable display name
    fn display_name(&self) -> &'static str;

    /// Default base URL of the template catalog service
    fn default_catalog_url(&self) -> &'static str;

    /// Environment variable overriding the catalog base URL
    fn catalog_url_env(&self) -> &'static str;

    /// Environment variable overriding the package registry
    fn registry_env(&self) -> &'static str;

    /// Environment variable naming the CLI home directory, relative to `$HOME`
    fn home_env(&self) -> &'static str;

    /// CLI home directory name under `$HOME` when the env var is unset
    fn default_home_dir(&self) -> &'static str;

    /// Command name -> registry package for commands not built in
    fn default_commands(&self) -> Vec<(&'static str, &'static str)> {
        Vec::new()
    }

    /// CLI description shown in help text
    fn cli_description(&self) -> &'static str;

    /// Instructions shown after a project has been scaffolded
    fn next_steps(&self, dir: &Path, project: &ProjectInfo) -> Vec<String>;

    /// Registry package this CLI is published as
    fn package_name(&self) -> &'static str {
        self.name()
    }

    /// Running CLI version; `None` disables the update notice
    fn current_version(&self) -> Option<&'static str> {
        None
    }

    /// User agent string for HTTP requests
    fn user_agent(&self) -> &'static str {
        self.name()
    }
}
