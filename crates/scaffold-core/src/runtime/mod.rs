//! External process plumbing
//!
//! This module provides:
//! - Runtime and package manager detection
//! - Allow-listed package manager command execution
//! - Node.js entry script invocation for third-party packages

pub mod check;
pub mod command;
pub mod node;

pub use check::{check_node, check_package_managers, require_node, RuntimeInfo};
pub use command::{parse_command, run_command, ParsedCommand, ALLOWED_COMMANDS};
pub use node::{entry_script, run_entry};
