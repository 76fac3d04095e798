//! Allow-listed package manager commands
//!
//! Template descriptors carry free-form `installCommand`/`startCommand`
//! strings. Only the leading token is trusted, and only if it names one of
//! [`ALLOWED_COMMANDS`]; everything after it is passed through as arguments
//! without shell interpretation. Windows runs the package manager shims
//! through `cmd /c`, so arguments carrying [`SHELL_METACHARACTERS`] are
//! refused on every platform.

use std::path::Path;
use std::process::{ExitStatus, Stdio};
use tokio::process::Command as TokioCommand;
use tracing::{debug, instrument};

use crate::error::{Result, ScaffoldError};

/// Programs a template is allowed to run
pub const ALLOWED_COMMANDS: &[&str] = &["npm", "cnpm", "yarn", "pnpm"];

/// Characters `cmd.exe` gives meaning to after `/c`
pub const SHELL_METACHARACTERS: &[char] = &['&', '|', '<', '>', '%', '"', '\n', '\r'];

/// A command line split into program and arguments.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ParsedCommand {
    pub program: String,
    pub args: Vec<String>,
}

impl ParsedCommand {
    pub fn is_allowed(&self) -> bool {
        ALLOWED_COMMANDS.contains(&self.program.as_str())
            && !self
                .args
                .iter()
                .any(|arg| arg.contains(SHELL_METACHARACTERS))
    }
}

/// Split on whitespace. A blank command means "nothing to run".
pub fn parse_command(raw: &str) -> Option<ParsedCommand> {
    let mut tokens = raw.split_whitespace().map(str::to_string);
    let program = tokens.next()?;
    Some(ParsedCommand {
        program,
        args: tokens.collect(),
    })
}

/// Run `raw` in `cwd` with inherited stdio and wait for it.
///
/// Rejected commands spawn nothing. A non-zero exit becomes
/// [`ScaffoldError::CommandExecution`] carrying `error_message`.
#[instrument(skip(error_message))]
pub async fn run_command(raw: &str, cwd: &Path, error_message: &str) -> Result<()> {
    let Some(command) = parse_command(raw) else {
        return Ok(());
    };
    if !command.is_allowed() {
        return Err(ScaffoldError::CommandNotAllowed(raw.trim().to_string()));
    }

    let status = spawn_inherited(&command.program, &command.args, cwd).await?;
    check_status(status, raw, error_message)
}

/// Spawn with inherited stdio. On Windows package managers are `.cmd` shims
/// and go through `cmd /c`.
pub(crate) async fn spawn_inherited(
    program: &str,
    args: &[String],
    cwd: &Path,
) -> Result<ExitStatus> {
    let mut cmd = if cfg!(windows) && ALLOWED_COMMANDS.contains(&program) {
        let mut cmd = TokioCommand::new("cmd");
        cmd.arg("/c").arg(program);
        cmd
    } else {
        TokioCommand::new(program)
    };

    debug!("Running {} {:?} in {}", program, args, cwd.display());
    cmd.args(args)
        .current_dir(cwd)
        .stdin(Stdio::inherit())
        .stdout(Stdio::inherit())
        .stderr(Stdio::inherit());

    let mut child = cmd.spawn().map_err(|source| ScaffoldError::Spawn {
        program: program.to_string(),
        source,
    })?;
    Ok(child.wait().await?)
}

pub(crate) fn check_status(status: ExitStatus, command: &str, error_message: &str) -> Result<()> {
    if status.success() {
        return Ok(());
    }
    Err(ScaffoldError::CommandExecution {
        command: command.trim().to_string(),
        message: error_message.to_string(),
        code: status.code().unwrap_or(-1),
    })
}
