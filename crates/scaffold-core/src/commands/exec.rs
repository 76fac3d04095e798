//! Commands served by registry packages
//!
//! The package is installed lazily into the CLI home's dependency cache and
//! kept at the registry's latest version. With `--target-path` the package at
//! that path runs as-is.

use async_trait::async_trait;
use serde_json::{json, Map, Value};
use tracing::{debug, instrument};

use super::{CliContext, Command, CommandArgs};
use crate::config::CliConfig;
use crate::error::{Result, ScaffoldError};
use crate::package::{Package, PackageOptions, LATEST};
use crate::runtime::run_entry;

pub struct PackageCommand {
    package: String,
    command: String,
    args: Vec<String>,
    options: Map<String, Value>,
}

impl PackageCommand {
    pub fn new(package: impl Into<String>) -> Self {
        Self {
            package: package.into(),
            command: String::new(),
            args: Vec::new(),
            options: Map::new(),
        }
    }

    /// Argument handed to the package's exported function.
    fn payload(&self) -> Value {
        json!({
            "command": self.command,
            "args": self.args,
            "options": self.options,
        })
    }

    fn package_ref(&self, ctx: &CliContext) -> Result<Package> {
        let config: &CliConfig = &ctx.config;
        let options = match &config.target_path {
            Some(path) => PackageOptions {
                target_path: path.clone(),
                store_dir: None,
                package_name: self.package.clone(),
                package_version: LATEST.to_string(),
            },
            None => PackageOptions {
                target_path: config.dependencies_dir(),
                store_dir: Some(config.dependencies_store_dir()),
                package_name: self.package.clone(),
                package_version: LATEST.to_string(),
            },
        };
        Package::new(options, config.registry_client(), ctx.installer.clone())
    }
}

#[async_trait(?Send)]
impl Command for PackageCommand {
    fn initialize(&mut self, args: &CommandArgs) -> Result<()> {
        self.command = args.name.clone();
        self.args = args.positional.clone();
        self.options = args.options.clone();
        Ok(())
    }

    #[instrument(skip_all, fields(command = %self.command, package = %self.package))]
    async fn execute(&mut self, ctx: &mut CliContext) -> Result<()> {
        let mut package = self.package_ref(ctx)?;

        if package.is_cached() {
            ctx.prompter.start_progress(&format!("Preparing {}...", self.package));
            let result = async {
                if package.exists().await? {
                    package.update().await
                } else {
                    package.install().await
                }
            }
            .await;
            match &result {
                Ok(()) => ctx.prompter.stop_progress(&format!(
                    "{}@{}",
                    self.package,
                    package.resolved_version().unwrap_or(LATEST)
                )),
                Err(_) => ctx.prompter.stop_progress(&format!("Failed to prepare {}", self.package)),
            }
            result?;
        }

        let entry = package
            .entry_file_path()?
            .ok_or_else(|| ScaffoldError::MissingEntryPoint(self.package.clone()))?;
        debug!("Entry file {}", entry.display());

        run_entry(
            &entry,
            &self.payload(),
            &ctx.config.working_dir,
            &format!("Command {} failed", self.command),
        )
        .await
    }
}
