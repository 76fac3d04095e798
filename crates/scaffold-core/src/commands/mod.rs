//! Command dispatch
//!
//! Built-in commands are looked up by name in [`BUILTIN_COMMANDS`]. Any other
//! name is served by a registry package when the configuration maps it to
//! one, or by the local package under `--target-path`.

pub mod exec;
pub mod init;

use async_trait::async_trait;
use serde_json::{Map, Value};
use std::sync::Arc;
use tracing::debug;

use crate::config::CliConfig;
use crate::error::{Result, ScaffoldError};
use crate::package::{DependencyInstaller, TarballInstaller};
use crate::workflow::Prompter;

pub use exec::PackageCommand;
pub use init::InitCommand;

/// Parsed invocation of one command.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct CommandArgs {
    pub name: String,
    pub positional: Vec<String>,
    /// `--flag` is `true`, `--key value` and `--key=value` are strings
    pub options: Map<String, Value>,
}

impl CommandArgs {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            ..Default::default()
        }
    }

    /// Parse raw arguments following the command name.
    pub fn parse(name: impl Into<String>, raw: &[String]) -> Self {
        let mut args = Self::new(name);
        let mut iter = raw.iter().peekable();

        while let Some(arg) = iter.next() {
            let Some(key) = arg.strip_prefix("--").filter(|k| !k.is_empty()) else {
                args.positional.push(arg.clone());
                continue;
            };

            if let Some((key, value)) = key.split_once('=') {
                args.options.insert(key.to_string(), Value::String(value.to_string()));
            } else if let Some(value) = iter.next_if(|next| !next.starts_with("--")) {
                args.options.insert(key.to_string(), Value::String(value.clone()));
            } else {
                args.options.insert(key.to_string(), Value::Bool(true));
            }
        }
        args
    }

    pub fn flag(&self, key: &str) -> bool {
        match self.options.get(key) {
            Some(Value::Bool(b)) => *b,
            Some(Value::String(s)) => s == "true",
            _ => false,
        }
    }

    pub fn option(&self, key: &str) -> Option<&str> {
        self.options.get(key).and_then(Value::as_str)
    }
}

/// Shared state handed to every command.
pub struct CliContext {
    pub config: CliConfig,
    pub prompter: Box<dyn Prompter>,
    pub installer: Arc<dyn DependencyInstaller>,
}

impl CliContext {
    /// Context with the registry tarball installer.
    pub fn new(config: CliConfig, prompter: Box<dyn Prompter>) -> Self {
        let installer = Arc::new(TarballInstaller::new(config.registry_client()));
        Self::with_installer(config, prompter, installer)
    }

    pub fn with_installer(
        config: CliConfig,
        prompter: Box<dyn Prompter>,
        installer: Arc<dyn DependencyInstaller>,
    ) -> Self {
        Self {
            config,
            prompter,
            installer,
        }
    }
}

/// A CLI command: argument intake, then execution.
#[async_trait(?Send)]
pub trait Command {
    fn initialize(&mut self, args: &CommandArgs) -> Result<()>;

    async fn execute(&mut self, ctx: &mut CliContext) -> Result<()>;
}

type CommandFactory = fn() -> Box<dyn Command>;

fn init_command() -> Box<dyn Command> {
    Box::new(InitCommand::default())
}

/// Commands implemented by this crate
pub const BUILTIN_COMMANDS: &[(&str, CommandFactory)] = &[("init", init_command)];

/// Resolve `name` to a command.
///
/// A mapped package wins over a built-in only when `--target-path` is set,
/// so command packages can be developed locally.
pub fn lookup(name: &str, config: &CliConfig) -> Result<Box<dyn Command>> {
    let builtin = BUILTIN_COMMANDS
        .iter()
        .find(|(builtin, _)| *builtin == name)
        .map(|(_, factory)| factory);
    let mapped = config.command_package(name);

    match (builtin, mapped, &config.target_path) {
        (Some(_), Some(package), Some(_)) => Ok(Box::new(PackageCommand::new(package))),
        (Some(factory), _, _) => Ok(factory()),
        (None, Some(package), _) => Ok(Box::new(PackageCommand::new(package))),
        (None, None, Some(_)) => Ok(Box::new(PackageCommand::new(name))),
        (None, None, None) => Err(ScaffoldError::UnknownCommand {
            name: name.to_string(),
            available: available_commands(config).join(", "),
        }),
    }
}

/// Built-in names followed by mapped package commands.
pub fn available_commands(config: &CliConfig) -> Vec<String> {
    let mut names: Vec<String> = BUILTIN_COMMANDS
        .iter()
        .map(|(name, _)| name.to_string())
        .collect();
    for name in config.commands.keys() {
        if !names.contains(name) {
            names.push(name.clone());
        }
    }
    names
}

/// Look up, initialize and execute one command.
pub async fn dispatch(args: CommandArgs, ctx: &mut CliContext) -> Result<()> {
    debug!("Dispatching {} {:?}", args.name, args.positional);
    let mut command = lookup(&args.name, &ctx.config)?;
    command.initialize(&args)?;
    command.execute(ctx).await
}
