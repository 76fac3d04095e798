//! Node.js invocation of third-party package entry files

use serde_json::Value;
use std::path::Path;
use tracing::info;

use super::check::require_node;
use super::command::{check_status, spawn_inherited};
use crate::error::Result;

/// Inline script that requires `entry` and calls its export with `payload`.
/// Both are JSON-encoded, so paths and values need no shell quoting.
pub fn entry_script(entry: &Path, payload: &Value) -> Result<String> {
    let entry = serde_json::to_string(&entry.to_string_lossy())?;
    let payload = serde_json::to_string(payload)?;
    Ok(format!("require({}).call(null, {})", entry, payload))
}

/// Run `entry`'s exported function in a Node.js subprocess and wait for it.
pub async fn run_entry(entry: &Path, payload: &Value, cwd: &Path, error_message: &str) -> Result<()> {
    require_node()?;

    info!("Executing {}", entry.display());
    let script = entry_script(entry, payload)?;
    let args = vec!["-e".to_string(), script];
    let status = spawn_inherited("node", &args, cwd).await?;
    check_status(status, &format!("node {}", entry.display()), error_message)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::runtime::check_node;
    use crate::test_support::write_files;
    use serde_json::json;
    use tempfile::TempDir;

    #[test]
    fn test_entry_script_escapes_values() {
        let script = entry_script(
            Path::new("/tmp/it's \"here\"/index.js"),
            &json!({ "name": "a'b" }),
        )
        .unwrap();
        assert_eq!(
            script,
            r#"require("/tmp/it's \"here\"/index.js").call(null, {"name":"a'b"})"#
        );
    }

    #[tokio::test]
    async fn test_run_entry_passes_payload() {
        if !check_node().available {
            return;
        }
        let dir = TempDir::new().unwrap();
        write_files(
            dir.path(),
            &[(
                "entry.js",
                "module.exports = function (o) { require('fs').writeFileSync('out.txt', o.targetPath) }",
            )],
        );

        run_entry(
            &dir.path().join("entry.js"),
            &json!({ "targetPath": "demo" }),
            dir.path(),
            "Template installation failed",
        )
        .await
        .unwrap();

        assert_eq!(
            std::fs::read_to_string(dir.path().join("out.txt")).unwrap(),
            "demo"
        );
    }

    #[tokio::test]
    async fn test_run_entry_failure() {
        if !check_node().available {
            return;
        }
        let dir = TempDir::new().unwrap();
        write_files(
            dir.path(),
            &[("entry.js", "module.exports = function () { process.exit(3) }")],
        );

        let err = run_entry(
            &dir.path().join("entry.js"),
            &json!({}),
            dir.path(),
            "Template installation failed",
        )
        .await
        .unwrap_err();
        assert!(matches!(
            err,
            crate::error::ScaffoldError::CommandExecution { code: 3, .. }
        ));
    }
}
