//! `init [projectName] [--force] [--yes] [--template <npmName>]`

use async_trait::async_trait;
use tracing::debug;

use super::{CliContext, Command, CommandArgs};
use crate::error::Result;
use crate::runtime::check_package_managers;
use crate::workflow::{CollectRequest, Outcome, ScaffoldWorkflow, WorkflowOptions};

#[derive(Debug, Clone, Default)]
pub struct InitCommand {
    project_name: Option<String>,
    force: bool,
    yes: bool,
    template: Option<String>,
}

#[async_trait(?Send)]
impl Command for InitCommand {
    fn initialize(&mut self, args: &CommandArgs) -> Result<()> {
        self.project_name = args.positional.first().cloned();
        self.force = args.flag("force");
        self.yes = args.flag("yes");
        self.template = args.option("template").map(str::to_string);
        Ok(())
    }

    async fn execute(&mut self, ctx: &mut CliContext) -> Result<()> {
        let config = &ctx.config;
        let managers: Vec<&str> = check_package_managers().iter().map(|m| m.name).collect();
        debug!("Package managers in PATH: {:?}", managers);

        let workflow = ScaffoldWorkflow::new(
            config.template_catalog(),
            config.registry_client(),
            ctx.installer.clone(),
            WorkflowOptions {
                target_dir: config.working_dir.clone(),
                force: self.force,
                template_home: config.template_dir(),
                request: CollectRequest {
                    project_name: self.project_name.clone(),
                    template: self.template.clone(),
                    assume_yes: self.yes,
                },
            },
        );

        match workflow.run(ctx.prompter.as_mut()).await? {
            Outcome::Completed(project) => ctx.prompter.completed(&config.working_dir, &project),
            Outcome::Cancelled => ctx.prompter.cancelled(),
        }
    }
}
