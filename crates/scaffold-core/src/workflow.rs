//! The `init` flow: catalog, directory check, metadata, download, install
//!
//! User interaction goes through [`Prompter`] so the flow runs the same under
//! the cliclack TUI and under test doubles.

use std::path::{Path, PathBuf};
use std::sync::Arc;
use tracing::{debug, error, info, instrument};

use crate::error::{Result, ScaffoldError};
use crate::package::{DependencyInstaller, Package, PackageOptions};
use crate::project::ProjectInfo;
use crate::registry::RegistryClient;
use crate::templates::{empty_dir, is_dir_empty, TemplateCatalog, TemplateDescriptor, TemplateInstaller};

/// Answers already known before any prompt is shown.
#[derive(Debug, Clone, Default)]
pub struct CollectRequest {
    pub project_name: Option<String>,
    /// Preselected template npm name
    pub template: Option<String>,
    /// Accept defaults instead of asking
    pub assume_yes: bool,
}

/// Interactive collaborator of the workflow.
pub trait Prompter {
    fn confirm(&mut self, message: &str, default: bool) -> Result<bool>;

    /// Ask for type, name, version, description and template. Templates are
    /// filtered by the chosen type; none left is [`ScaffoldError::NoTemplates`].
    fn collect_project_info(
        &mut self,
        request: &CollectRequest,
        templates: &[TemplateDescriptor],
    ) -> Result<ProjectInfo>;

    fn info(&mut self, message: &str) -> Result<()>;

    fn start_progress(&mut self, message: &str);

    fn stop_progress(&mut self, message: &str);

    /// Called once the project is in place.
    fn completed(&mut self, _target_dir: &Path, _project: &ProjectInfo) -> Result<()> {
        Ok(())
    }

    /// Called when the user declined a directory gate.
    fn cancelled(&mut self) -> Result<()> {
        Ok(())
    }
}

/// How a run ended without error.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Outcome {
    Completed(ProjectInfo),
    /// The user declined a directory gate; nothing was touched
    Cancelled,
}

/// Inputs of one `init` run.
#[derive(Debug, Clone)]
pub struct WorkflowOptions {
    /// Directory the project is created in
    pub target_dir: PathBuf,
    /// Skip the "continue?" gate for a non-empty directory
    pub force: bool,
    /// Root of template package installs; packages cache under `node_modules`
    pub template_home: PathBuf,
    pub request: CollectRequest,
}

pub struct ScaffoldWorkflow {
    catalog: TemplateCatalog,
    registry: RegistryClient,
    installer: Arc<dyn DependencyInstaller>,
    options: WorkflowOptions,
}

impl ScaffoldWorkflow {
    pub fn new(
        catalog: TemplateCatalog,
        registry: RegistryClient,
        installer: Arc<dyn DependencyInstaller>,
        options: WorkflowOptions,
    ) -> Self {
        Self {
            catalog,
            registry,
            installer,
            options,
        }
    }

    #[instrument(skip_all, fields(target = %self.options.target_dir.display()))]
    pub async fn run(&self, prompter: &mut dyn Prompter) -> Result<Outcome> {
        let templates = self.load_catalog(prompter).await?;

        if !self.check_directory(prompter).await? {
            return Ok(Outcome::Cancelled);
        }

        let project = prompter.collect_project_info(&self.options.request, &templates)?;
        let descriptor = templates
            .iter()
            .find(|t| t.npm_name == project.project_template())
            .ok_or_else(|| {
                ScaffoldError::NoTemplates(format!(" named {}", project.project_template()))
            })?;
        debug!("Selected template {}@{}", descriptor.npm_name, descriptor.version);

        let mut package = self.download_template(prompter, descriptor).await?;

        prompter.info("Installing template...")?;
        TemplateInstaller::new(&self.options.target_dir)
            .install(descriptor, &project, &mut package)
            .await?;
        info!("Template installed into {}", self.options.target_dir.display());

        Ok(Outcome::Completed(project))
    }

    async fn load_catalog(&self, prompter: &mut dyn Prompter) -> Result<Vec<TemplateDescriptor>> {
        prompter.start_progress("Loading templates...");
        let templates = match self.catalog.fetch().await {
            Ok(templates) => templates,
            Err(e) => {
                prompter.stop_progress("Failed to load templates");
                return Err(e);
            }
        };

        if templates.is_empty() {
            prompter.stop_progress("No templates found");
            return Err(ScaffoldError::NoTemplates(String::new()));
        }
        prompter.stop_progress(&format!("Loaded {} templates", templates.len()));
        Ok(templates)
    }

    /// `false` when the user declined to continue or to clear the directory.
    async fn check_directory(&self, prompter: &mut dyn Prompter) -> Result<bool> {
        let target = &self.options.target_dir;
        if is_dir_empty(target)? {
            return Ok(true);
        }

        let skip_gate = self.options.force || self.options.request.assume_yes;
        if !skip_gate
            && !prompter.confirm("The current directory is not empty. Continue creating the project?", false)?
        {
            return Ok(false);
        }

        // Deleting files always needs an explicit answer
        if !prompter.confirm(
            &format!("Clear all files in {}?", target.display()),
            false,
        )? {
            return Ok(false);
        }

        empty_dir(target).await?;
        debug!("Cleared {}", target.display());
        Ok(true)
    }

    async fn download_template(
        &self,
        prompter: &mut dyn Prompter,
        descriptor: &TemplateDescriptor,
    ) -> Result<Package> {
        let home = &self.options.template_home;
        let mut package = Package::new(
            PackageOptions {
                target_path: home.clone(),
                store_dir: Some(home.join("node_modules")),
                package_name: descriptor.npm_name.clone(),
                package_version: descriptor.version.clone(),
            },
            self.registry.clone(),
            self.installer.clone(),
        )?;

        prompter.start_progress("Downloading template...");
        let result = async {
            if package.exists().await? {
                package.update().await
            } else {
                package.install().await
            }
        }
        .await;

        match result {
            Ok(()) => {
                prompter.stop_progress(&format!(
                    "Template {}@{} ready",
                    descriptor.npm_name,
                    package.resolved_version().unwrap_or(&descriptor.version)
                ));
                Ok(package)
            }
            Err(e) => {
                error!("Template download failed: {}", e);
                prompter.stop_progress("Template download failed");
                Err(ScaffoldError::TemplateDownload(Box::new(e)))
            }
        }
    }
}
