//! Charm-style CLI prompts using cliclack

use cliclack::ProgressBar;
use std::path::Path;
use tracing::debug;

use crate::commands::{dispatch, CliContext, CommandArgs};
use crate::config::{CliConfig, ConfigOverrides};
use crate::error::{Result, ScaffoldError};
use crate::product::ProductConfig;
use crate::project::{clean_version, is_valid_project_name, ProjectInfo, ScaffoldType};
use crate::registry::check_for_update;
use crate::templates::{templates_for, TemplateDescriptor};
use crate::workflow::{CollectRequest, Prompter};

const DEFAULT_VERSION: &str = "1.0.0";

/// Resolve configuration and run one command with interactive prompts
pub async fn run<C: ProductConfig>(
    product: &C,
    overrides: ConfigOverrides,
    args: CommandArgs,
) -> Result<()> {
    cliclack::intro(product.display_name())?;

    let config = CliConfig::load(product, overrides)?;
    if config.debug {
        cliclack::log::remark(format!("CLI home: {}", config.cli_home.display()))?;
        cliclack::log::remark(format!("Registry: {}", config.registry))?;
    }

    notify_update(product, &config).await?;

    let prompter = CliclackPrompter::new(product.clone());
    let mut ctx = CliContext::new(config, Box::new(prompter));
    dispatch(args, &mut ctx).await
}

/// Warn when the registry has a newer compatible release of the CLI.
/// Registry failures are only logged.
async fn notify_update<C: ProductConfig>(product: &C, config: &CliConfig) -> Result<()> {
    let Some(current) = product.current_version() else {
        return Ok(());
    };

    match check_for_update(&config.registry_client(), product.package_name(), current).await {
        Ok(Some(latest)) => cliclack::log::warning(format!(
            "{} {} is available (current {}). Update with: npm install -g {}",
            product.package_name(),
            latest,
            current,
            product.package_name()
        ))?,
        Ok(None) => {}
        Err(e) => debug!("Update check failed: {}", e),
    }
    Ok(())
}

/// [`Prompter`] backed by cliclack widgets.
pub struct CliclackPrompter<C: ProductConfig> {
    product: C,
    spinner: Option<ProgressBar>,
}

impl<C: ProductConfig> CliclackPrompter<C> {
    pub fn new(product: C) -> Self {
        Self {
            product,
            spinner: None,
        }
    }
}

fn select_type(request: &CollectRequest) -> Result<ScaffoldType> {
    if request.assume_yes {
        return Ok(ScaffoldType::Project);
    }
    Ok(cliclack::select("What do you want to create?")
        .item(ScaffoldType::Project, ScaffoldType::Project.display_name(), "")
        .item(ScaffoldType::Component, ScaffoldType::Component.display_name(), "")
        .interact()?)
}

fn select_name(request: &CollectRequest, scaffold_type: ScaffoldType) -> Result<String> {
    if let Some(name) = request.project_name.as_deref() {
        if is_valid_project_name(name) {
            cliclack::log::info(format!("{} name: {}", scaffold_type, name))?;
            return Ok(name.to_string());
        }
        if request.assume_yes {
            return Err(ScaffoldError::InvalidProjectName(name.to_string()));
        }
        cliclack::log::warning(format!("'{}' is not a valid name", name))?;
    } else if request.assume_yes {
        return Err(ScaffoldError::InvalidProjectName(String::new()));
    }

    Ok(cliclack::input(format!("{} name", scaffold_type))
        .placeholder("my-app")
        .validate(|input: &String| {
            if is_valid_project_name(input) {
                Ok(())
            } else {
                Err("Start with a letter, end with a letter or digit; only '-' or '_' as separators")
            }
        })
        .interact()?)
}

fn select_version(request: &CollectRequest, scaffold_type: ScaffoldType) -> Result<String> {
    if request.assume_yes {
        return Ok(DEFAULT_VERSION.to_string());
    }
    let input: String = cliclack::input(format!("{} version", scaffold_type))
        .default_input(DEFAULT_VERSION)
        .validate(|input: &String| match clean_version(input) {
            Some(_) => Ok(()),
            None => Err("Enter a valid version, e.g. 1.0.0"),
        })
        .interact()?;
    clean_version(&input).ok_or_else(|| ScaffoldError::config(format!("Invalid version {}", input)))
}

fn select_description(request: &CollectRequest) -> Result<Option<String>> {
    if request.assume_yes {
        return Ok(None);
    }
    let input: String = cliclack::input("Component description")
        .validate(|input: &String| {
            if input.trim().is_empty() {
                Err("Description is required")
            } else {
                Ok(())
            }
        })
        .interact()?;
    Ok(Some(input.trim().to_string()))
}

fn select_template<'a>(
    request: &CollectRequest,
    scaffold_type: ScaffoldType,
    templates: &[&'a TemplateDescriptor],
) -> Result<&'a TemplateDescriptor> {
    if let Some(wanted) = request.template.as_deref() {
        return templates
            .iter()
            .copied()
            .find(|t| t.npm_name == wanted)
            .ok_or_else(|| {
                ScaffoldError::NoTemplates(format!(" named {} for {}", wanted, scaffold_type.tag()))
            });
    }

    if request.assume_yes || templates.len() == 1 {
        let template = templates[0];
        cliclack::log::info(format!("Using template: {}", template.name))?;
        return Ok(template);
    }

    let mut select = cliclack::select("Select a template");
    for (idx, template) in templates.iter().enumerate() {
        select = select.item(idx, &template.name, &template.npm_name);
    }
    let selected: usize = select.interact()?;
    Ok(templates[selected])
}

impl<C: ProductConfig> Prompter for CliclackPrompter<C> {
    fn confirm(&mut self, message: &str, default: bool) -> Result<bool> {
        Ok(cliclack::confirm(message).initial_value(default).interact()?)
    }

    fn collect_project_info(
        &mut self,
        request: &CollectRequest,
        templates: &[TemplateDescriptor],
    ) -> Result<ProjectInfo> {
        let scaffold_type = select_type(request)?;

        let available = templates_for(templates, scaffold_type);
        if available.is_empty() {
            return Err(ScaffoldError::NoTemplates(format!(" for {}", scaffold_type.tag())));
        }

        let name = select_name(request, scaffold_type)?;
        let version = select_version(request, scaffold_type)?;
        let description = match scaffold_type {
            ScaffoldType::Component => select_description(request)?,
            ScaffoldType::Project => None,
        };
        let template = select_template(request, scaffold_type, &available)?;

        ProjectInfo::new(scaffold_type, &name, &version, description, &template.npm_name)
    }

    fn info(&mut self, message: &str) -> Result<()> {
        Ok(cliclack::log::info(message)?)
    }

    fn start_progress(&mut self, message: &str) {
        if let Some(previous) = self.spinner.take() {
            previous.stop("");
        }
        let spinner = cliclack::spinner();
        spinner.start(message);
        self.spinner = Some(spinner);
    }

    fn stop_progress(&mut self, message: &str) {
        if let Some(spinner) = self.spinner.take() {
            spinner.stop(message);
        }
    }

    fn completed(&mut self, target_dir: &Path, project: &ProjectInfo) -> Result<()> {
        cliclack::log::success(format!(
            "Created {} {} in {}",
            project.scaffold_type().tag(),
            project.project_name(),
            target_dir.display()
        ))?;

        let steps = self.product.next_steps(target_dir, project);
        if !steps.is_empty() {
            println!();
            println!("  Next steps");
            println!();
            for (i, step) in steps.iter().enumerate() {
                println!("  {}.  {}", i + 1, step);
            }
        }

        cliclack::outro("Happy coding!")?;
        Ok(())
    }

    fn cancelled(&mut self) -> Result<()> {
        cliclack::outro_cancel("Project creation cancelled")?;
        Ok(())
    }
}
