//! Template installation into the target directory
//!
//! Normal templates ship their project files under `template/` and are
//! copied, rendered, then bootstrapped with the descriptor's install and
//! start commands. Custom templates export a function from their entry file
//! that does all of that itself.

use serde_json::json;
use std::path::{Path, PathBuf};
use tracing::{debug, info, instrument};

use super::copier::copy_template;
use super::descriptor::{TemplateDescriptor, TemplateKind};
use super::render::{render_dir, PlaceholderRenderer, Renderer};
use crate::error::{Result, ScaffoldError};
use crate::package::Package;
use crate::project::ProjectInfo;
use crate::runtime::{run_command, run_entry};

/// Directory inside a template package holding the project files
pub const TEMPLATE_DIR: &str = "template";

/// Installs one template package into `target_dir`.
pub struct TemplateInstaller {
    target_dir: PathBuf,
    renderer: Box<dyn Renderer>,
}

impl TemplateInstaller {
    pub fn new(target_dir: impl Into<PathBuf>) -> Self {
        Self::with_renderer(target_dir, Box::new(PlaceholderRenderer))
    }

    pub fn with_renderer(target_dir: impl Into<PathBuf>, renderer: Box<dyn Renderer>) -> Self {
        Self {
            target_dir: target_dir.into(),
            renderer,
        }
    }

    pub fn target_dir(&self) -> &Path {
        &self.target_dir
    }

    /// Dispatch on the descriptor's kind.
    #[instrument(skip_all, fields(template = %descriptor.npm_name, kind = %descriptor.kind))]
    pub async fn install(
        &self,
        descriptor: &TemplateDescriptor,
        project: &ProjectInfo,
        package: &mut Package,
    ) -> Result<()> {
        match &descriptor.kind {
            TemplateKind::Normal => self.install_normal(descriptor, project, package).await,
            TemplateKind::Custom => self.install_custom(descriptor, project, package).await,
            TemplateKind::Other(kind) => Err(ScaffoldError::UnrecognizedTemplateType(kind.clone())),
        }
    }

    async fn install_normal(
        &self,
        descriptor: &TemplateDescriptor,
        project: &ProjectInfo,
        package: &mut Package,
    ) -> Result<()> {
        package.prepare().await?;
        let source = package.package_dir().join(TEMPLATE_DIR);

        let copied = copy_template(&source, &self.target_dir).await?;
        info!("Copied {} template files", copied.len());

        let rendered = render_dir(
            &self.target_dir,
            &descriptor.ignore,
            &project.to_value(),
            self.renderer.as_ref(),
        )?;
        debug!("Rendered {} files", rendered);

        if let Some(command) = &descriptor.install_command {
            run_command(command, &self.target_dir, "Dependency installation failed").await?;
        }
        if let Some(command) = &descriptor.start_command {
            run_command(command, &self.target_dir, "Start command failed").await?;
        }
        Ok(())
    }

    async fn install_custom(
        &self,
        descriptor: &TemplateDescriptor,
        project: &ProjectInfo,
        package: &mut Package,
    ) -> Result<()> {
        let missing = || ScaffoldError::MissingEntryPoint(package_label(descriptor));

        if !package.exists().await? {
            return Err(missing());
        }
        let entry = package.entry_file_path()?.ok_or_else(missing)?;

        let payload = json!({
            "templateInfo": descriptor,
            "projectInfo": project,
            "sourcePath": package.package_dir().join(TEMPLATE_DIR).to_string_lossy(),
            "targetPath": self.target_dir.to_string_lossy(),
        });
        run_entry(
            &entry,
            &payload,
            &self.target_dir,
            "Custom template installation failed",
        )
        .await
    }
}

fn package_label(descriptor: &TemplateDescriptor) -> String {
    format!("{}@{}", descriptor.npm_name, descriptor.version)
}
