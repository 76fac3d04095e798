//! scaffold CLI - Project scaffolding from registry-hosted templates

use anyhow::Result;
use clap::{Args as ClapArgs, Parser, Subcommand};
use colored::Colorize;
use scaffold_core::commands::CommandArgs;
use scaffold_core::config::ConfigOverrides;
use scaffold_core::{ProductConfig, ProjectInfo};
use std::path::{Path, PathBuf};
use tracing_subscriber::EnvFilter;

/// scaffold product configuration
#[derive(Clone)]
pub struct ScaffoldConfig;

impl ProductConfig for ScaffoldConfig {
    fn name(&self) -> &'static str {
        "scaffold"
    }

    fn display_name(&self) -> &'static str {
        "scaffold"
    }

    fn default_catalog_url(&self) -> &'static str {
        "http://localhost:7001"
    }

    fn catalog_url_env(&self) -> &'static str {
        "SCAFFOLD_CLI_BASE_URL"
    }

    fn registry_env(&self) -> &'static str {
        "SCAFFOLD_CLI_REGISTRY"
    }

    fn home_env(&self) -> &'static str {
        "SCAFFOLD_CLI_HOME"
    }

    fn default_home_dir(&self) -> &'static str {
        ".scaffold-cli"
    }

    fn cli_description(&self) -> &'static str {
        "CLI for scaffolding projects from registry-hosted templates"
    }

    fn next_steps(&self, dir: &Path, project: &ProjectInfo) -> Vec<String> {
        let mut steps = Vec::new();
        let current = std::env::current_dir().ok();

        if current.as_deref() != Some(dir) {
            steps.push(format!("cd {}", dir.display()));
        }
        steps.push(format!(
            "Open README.md to get started with {}",
            project.project_name()
        ));

        steps
    }

    fn package_name(&self) -> &'static str {
        env!("CARGO_PKG_NAME")
    }

    fn current_version(&self) -> Option<&'static str> {
        Some(env!("CARGO_PKG_VERSION"))
    }

    fn user_agent(&self) -> &'static str {
        concat!("scaffold-cli/", env!("CARGO_PKG_VERSION"))
    }
}

#[derive(Parser, Debug)]
#[command(name = "scaffold")]
#[command(about = "CLI for scaffolding projects from registry-hosted templates")]
#[command(version)]
pub struct Args {
    /// Enable debug output
    #[arg(short, long, global = true)]
    pub debug: bool,

    /// Run command packages from this local directory (for development use)
    #[arg(short = 't', long = "target-path", global = true)]
    pub target_path: Option<PathBuf>,

    /// Package registry to download templates and commands from
    #[arg(long, global = true)]
    pub registry: Option<String>,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Subcommand, Debug)]
pub enum Command {
    /// Create a new project or component in the current directory
    Init(InitArgs),

    /// Run a command served by a registry package
    #[command(external_subcommand)]
    External(Vec<String>),
}

#[derive(ClapArgs, Debug)]
pub struct InitArgs {
    /// Project name
    pub project_name: Option<String>,

    /// Skip the non-empty directory confirmation
    #[arg(short, long)]
    pub force: bool,

    /// Accept defaults for every question except clearing the directory
    #[arg(short, long)]
    pub yes: bool,

    /// Template npm name to use
    #[arg(long)]
    pub template: Option<String>,

    /// Local catalog file to use instead of the catalog service (for development use)
    #[arg(long)]
    pub catalog: Option<PathBuf>,
}

impl From<InitArgs> for CommandArgs {
    fn from(args: InitArgs) -> Self {
        let mut command = CommandArgs::new("init");
        command.positional.extend(args.project_name);
        command.options.insert("force".into(), args.force.into());
        command.options.insert("yes".into(), args.yes.into());
        if let Some(template) = args.template {
            command.options.insert("template".into(), template.into());
        }
        command
    }
}

fn init_tracing(debug: bool) {
    let default_level = if debug { "debug" } else { "warn" };
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_writer(std::io::stderr)
        .init();
}

async fn run(args: Args) -> Result<()> {
    let product = ScaffoldConfig;
    let mut overrides = ConfigOverrides {
        registry: args.registry,
        target_path: args.target_path,
        debug: args.debug,
        ..Default::default()
    };

    let command = match args.command {
        Command::Init(init) => {
            overrides.catalog = init.catalog.clone();
            CommandArgs::from(init)
        }
        Command::External(raw) => {
            let (name, rest) = raw
                .split_first()
                .ok_or_else(|| anyhow::anyhow!("Missing command name"))?;
            CommandArgs::parse(name.as_str(), rest)
        }
    };

    scaffold_core::run(&product, overrides, command).await?;
    Ok(())
}

#[tokio::main]
async fn main() {
    // Ensure terminal cursor is restored on panic
    let default_panic = std::panic::take_hook();
    std::panic::set_hook(Box::new(move |info| {
        let _ = console::Term::stderr().show_cursor();
        default_panic(info);
    }));

    // Handle Ctrl+C gracefully
    ctrlc::set_handler(move || {
        let _ = console::Term::stderr().show_cursor();
        std::process::exit(130);
    })
    .ok();

    let args = Args::parse();
    init_tracing(args.debug);

    let result = run(args).await;

    // Ensure cursor is visible on normal exit
    let _ = console::Term::stderr().show_cursor();

    if let Err(e) = result {
        eprintln!("{}", format!("{:#}", e).red());
        std::process::exit(1);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_init_args_become_command_args() {
        let args = Args::parse_from(["scaffold", "init", "demo", "--force", "--template", "vue"]);
        let Command::Init(init) = args.command else {
            panic!("expected init");
        };
        let command = CommandArgs::from(init);

        assert_eq!(command.name, "init");
        assert_eq!(command.positional, vec!["demo"]);
        assert!(command.flag("force"));
        assert!(!command.flag("yes"));
        assert_eq!(command.option("template"), Some("vue"));
    }

    #[test]
    fn test_unknown_subcommand_is_external() {
        let args = Args::parse_from(["scaffold", "--debug", "lint", "src", "--fix"]);
        assert!(args.debug);
        match args.command {
            Command::External(raw) => assert_eq!(raw, vec!["lint", "src", "--fix"]),
            other => panic!("unexpected command: {:?}", other),
        }
    }

    #[test]
    fn test_global_target_path() {
        let args = Args::parse_from(["scaffold", "init", "--target-path", "/tmp/init-pkg"]);
        assert_eq!(args.target_path, Some(PathBuf::from("/tmp/init-pkg")));
    }
}
