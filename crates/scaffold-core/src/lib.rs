//! Scaffold Core - Registry-backed project scaffolding
//!
//! This library resolves template and command packages against an
//! npm-compatible registry, caches them per version under the CLI home and
//! materializes templates into a project directory. Binaries supply their
//! identity through [`ProductConfig`] and drive everything through
//! [`commands::dispatch`].
//!
//! # Architecture
//!
//! The library is organized into layers:
//!
//! - **Layer 1: Core Operations** - Registry access, version resolution, the package cache,
//!   template copying and rendering, allow-listed subprocesses
//! - **Layer 2: Workflow Orchestration** - [`Package`], [`TemplateInstaller`],
//!   [`ScaffoldWorkflow`] and the command table
//! - **Layer 3: CLI/TUI Interface** - Optional cliclack-based prompts (feature-gated)
//!
//! # Feature Flags
//!
//! - `tui` (default): Enables the cliclack-based TUI prompts module
//!
//! # Example Usage (without TUI)
//!
//! ```ignore
//! use scaffold_core::{Package, PackageOptions, RegistryClient, TarballInstaller};
//! use std::sync::Arc;
//!
//! let registry = RegistryClient::new(None, "my-cli");
//! let installer = Arc::new(TarballInstaller::new(registry.clone()));
//! let mut package = Package::new(
//!     PackageOptions {
//!         target_path: home.join("dependencies"),
//!         store_dir: Some(home.join("dependencies/node_modules")),
//!         package_name: "@scope/init".into(),
//!         package_version: "latest".into(),
//!     },
//!     registry,
//!     installer,
//! )?;
//! if package.exists().await? { package.update().await? } else { package.install().await? }
//! let entry = package.entry_file_path()?;
//! ```

pub mod commands;
pub mod config;
pub mod error;
pub mod package;
pub mod product;
pub mod project;
pub mod registry;
pub mod runtime;
pub mod templates;
pub mod workflow;

#[cfg(feature = "tui")]
pub mod tui;

#[cfg(test)]
mod test_support;

// Re-export main types for convenience
pub use config::{CliConfig, ConfigOverrides};
pub use error::{Result, ScaffoldError};
pub use package::{DependencyInstaller, Package, PackageOptions, TarballInstaller};
pub use product::ProductConfig;
pub use project::{ProjectInfo, ScaffoldType};
pub use registry::RegistryClient;
pub use templates::{TemplateDescriptor, TemplateInstaller};
pub use workflow::{Outcome, Prompter, ScaffoldWorkflow};

#[cfg(feature = "tui")]
pub use tui::run;
