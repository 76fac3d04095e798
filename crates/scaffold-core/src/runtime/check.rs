//! Runtime detection for Node.js and package managers

use std::process::Command;

use crate::error::{Result, ScaffoldError};

/// Package managers probed by [`check_package_managers`], in preference order
const PACKAGE_MANAGERS: &[(&str, &str)] = &[
    ("pnpm", "pnpm"),
    ("yarn", "Yarn"),
    ("npm", "npm"),
    ("cnpm", "cnpm"),
];

/// Runtime detection result
#[derive(Debug, Clone)]
pub struct RuntimeInfo {
    pub name: &'static str,
    pub version: Option<String>,
    pub available: bool,
}

/// Run `{program} --version`; on Windows package managers are `.cmd` shims.
fn probe(program: &str, name: &'static str) -> RuntimeInfo {
    let output = if cfg!(windows) {
        Command::new("cmd")
            .args(["/c", program, "--version"])
            .output()
    } else {
        Command::new(program).arg("--version").output()
    };

    match output {
        Ok(out) if out.status.success() => {
            let version = String::from_utf8_lossy(&out.stdout).trim().to_string();
            RuntimeInfo {
                name,
                version: Some(version),
                available: true,
            }
        }
        _ => RuntimeInfo {
            name,
            version: None,
            available: false,
        },
    }
}

/// Check if Node.js is available
pub fn check_node() -> RuntimeInfo {
    probe("node", "Node.js")
}

/// Node.js must be present before any third-party script is run.
pub fn require_node() -> Result<RuntimeInfo> {
    let node = check_node();
    if node.available {
        Ok(node)
    } else {
        Err(ScaffoldError::RuntimeMissing("Node.js"))
    }
}

/// Every allow-listed package manager found in PATH.
pub fn check_package_managers() -> Vec<RuntimeInfo> {
    PACKAGE_MANAGERS
        .iter()
        .map(|(program, name)| probe(program, name))
        .filter(|info| info.available)
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_missing_program_is_unavailable() {
        let info = probe("scaffold-definitely-not-installed", "Nothing");
        assert!(!info.available);
        assert!(info.version.is_none());
    }

    #[test]
    fn test_require_node_matches_check() {
        let available = check_node().available;
        assert_eq!(require_node().is_ok(), available);
    }

    #[test]
    fn test_package_managers_are_allow_listed() {
        for info in check_package_managers() {
            assert!(info.available);
            assert!(PACKAGE_MANAGERS.iter().any(|(_, name)| *name == info.name));
        }
    }
}
