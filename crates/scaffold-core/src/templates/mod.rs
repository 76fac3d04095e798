//! Template catalog, copying, rendering and installation
//!
//! This module provides:
//! - Template descriptor types (TemplateDescriptor, TemplateKind)
//! - Catalog loading from a remote service or a local file
//! - Template copying and target directory housekeeping
//! - Placeholder rendering
//! - Normal and custom template installation

pub mod catalog;
pub mod copier;
pub mod descriptor;
pub mod installer;
pub mod render;

pub use catalog::{CatalogSource, TemplateCatalog};
pub use copier::{copy_template, empty_dir, is_dir_empty};
pub use descriptor::{templates_for, TemplateDescriptor, TemplateKind};
pub use installer::{TemplateInstaller, TEMPLATE_DIR};
pub use render::{render_dir, PlaceholderRenderer, Renderer};
