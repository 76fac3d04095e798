//! Placeholder rendering for copied template files
//!
//! Supports the EJS output tags templates typically use:
//! `<%= key %>` (HTML-escaped), `<%- key %>` (raw), `<%# comment %>` and the
//! `<%%` literal. Keys are dotted paths into the JSON data. Scriptlets
//! (`<% ... %>`) are not supported and fail the render.

use glob::Pattern;
use serde_json::Value;
use std::path::Path;
use tracing::debug;
use walkdir::WalkDir;

use super::copier::DEPENDENCY_DIR;
use crate::error::{Result, ScaffoldError};

/// Renders one template string against data.
pub trait Renderer: Send + Sync {
    fn render(&self, template: &str, data: &Value) -> std::result::Result<String, String>;
}

/// EJS-compatible placeholder renderer.
#[derive(Debug, Clone, Copy, Default)]
pub struct PlaceholderRenderer;

impl Renderer for PlaceholderRenderer {
    fn render(&self, template: &str, data: &Value) -> std::result::Result<String, String> {
        let mut out = String::with_capacity(template.len());
        let mut rest = template;

        while let Some(start) = rest.find("<%") {
            out.push_str(&rest[..start]);
            let after_open = &rest[start + 2..];

            if let Some(literal) = after_open.strip_prefix('%') {
                out.push_str("<%");
                rest = literal;
                continue;
            }

            let end = after_open
                .find("%>")
                .ok_or_else(|| format!("unclosed tag near '{}'", snippet(&rest[start..])))?;
            let tag = &after_open[..end];
            rest = &after_open[end + 2..];

            match tag.chars().next() {
                Some('#') => {}
                Some('=') => out.push_str(&escape_html(&lookup(data, tag[1..].trim())?)),
                Some('-') => out.push_str(&lookup(data, tag[1..].trim())?),
                _ => return Err(format!("unsupported tag '<%{}%>'", tag)),
            }
        }

        out.push_str(rest);
        Ok(out)
    }
}

fn snippet(s: &str) -> String {
    s.chars().take(20).collect()
}

fn lookup(data: &Value, key: &str) -> std::result::Result<String, String> {
    let key = key.trim_end_matches('-').trim();
    let mut current = data;
    for part in key.split('.') {
        current = current
            .get(part)
            .ok_or_else(|| format!("{} is not defined", key))?;
    }
    Ok(match current {
        Value::String(s) => s.clone(),
        Value::Null => String::new(),
        other => other.to_string(),
    })
}

fn escape_html(s: &str) -> String {
    let mut out = String::with_capacity(s.len());
    for ch in s.chars() {
        match ch {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&#34;"),
            '\'' => out.push_str("&#39;"),
            c => out.push(c),
        }
    }
    out
}

/// Compile ignore globs; an invalid glob is a configuration error.
pub fn compile_ignore(patterns: &[String]) -> Result<Vec<Pattern>> {
    patterns
        .iter()
        .map(|p| {
            Pattern::new(p)
                .map_err(|e| ScaffoldError::config(format!("Invalid ignore pattern '{}': {}", p, e)))
        })
        .collect()
}

/// Render every file under `root` in place, skipping the dependency folder,
/// hidden entries and files matching `ignore`. Files that are not UTF-8 are
/// left as-is.
///
/// Not transactional: a failure leaves earlier files already rewritten.
pub fn render_dir(
    root: &Path,
    ignore: &[String],
    data: &Value,
    renderer: &dyn Renderer,
) -> Result<usize> {
    let ignore = compile_ignore(ignore)?;
    let mut rendered = 0;

    let walker = WalkDir::new(root)
        .min_depth(1)
        .into_iter()
        .filter_entry(|e| {
            !is_hidden(e) && !(e.file_type().is_dir() && e.file_name() == DEPENDENCY_DIR)
        });

    for entry in walker {
        let entry = entry.map_err(std::io::Error::from)?;
        if !entry.file_type().is_file() {
            continue;
        }

        let relative = entry
            .path()
            .strip_prefix(root)
            .map_err(std::io::Error::other)?;
        if ignore.iter().any(|p| p.matches_path(relative)) {
            debug!("Skipping ignored file {}", relative.display());
            continue;
        }

        let bytes = std::fs::read(entry.path())?;
        let Ok(content) = String::from_utf8(bytes) else {
            debug!("Skipping non UTF-8 file {}", relative.display());
            continue;
        };

        let output = renderer
            .render(&content, data)
            .map_err(|message| ScaffoldError::Render {
                path: relative.to_path_buf(),
                message,
            })?;
        if output != content {
            std::fs::write(entry.path(), output)?;
        }
        rendered += 1;
    }

    Ok(rendered)
}

fn is_hidden(entry: &walkdir::DirEntry) -> bool {
    entry
        .file_name()
        .to_str()
        .is_some_and(|name| name.starts_with('.'))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_support::write_files;
    use serde_json::json;
    use tempfile::TempDir;

    fn data() -> Value {
        json!({ "projectName": "demo", "className": "demo", "version": "1.0.0", "meta": { "port": 8080 } })
    }

    #[test]
    fn test_render_output_tags() {
        let r = PlaceholderRenderer;
        assert_eq!(
            r.render("name: <%= projectName %>@<%= version %>", &data()).unwrap(),
            "name: demo@1.0.0"
        );
        assert_eq!(r.render("<%- meta.port %>", &data()).unwrap(), "8080");
        assert_eq!(r.render("a<%# note %>b", &data()).unwrap(), "ab");
        assert_eq!(r.render("<%% literal %>", &data()).unwrap(), "<% literal %>");
    }

    #[test]
    fn test_render_escapes_html() {
        let r = PlaceholderRenderer;
        let data = json!({ "title": "<b>\"x\" & 'y'</b>" });
        assert_eq!(
            r.render("<%= title %>", &data).unwrap(),
            "&lt;b&gt;&#34;x&#34; &amp; &#39;y&#39;&lt;/b&gt;"
        );
        assert_eq!(r.render("<%- title %>", &data).unwrap(), "<b>\"x\" & 'y'</b>");
    }

    #[test]
    fn test_render_errors() {
        let r = PlaceholderRenderer;
        assert!(r.render("<%= projectName", &data()).is_err());
        assert!(r.render("<%= missing %>", &data()).is_err());
        assert!(r.render("<% if (x) { %>", &data()).is_err());
    }

    #[test]
    fn test_render_dir_skips_dependencies_and_ignored() {
        let dir = TempDir::new().unwrap();
        write_files(
            dir.path(),
            &[
                ("package.json", r#"{"name":"<%= className %>"}"#),
                ("src/App.vue", "<h1><%= projectName %></h1>"),
                ("node_modules/x/index.js", "<%= projectName"),
                ("public/index.html", "<%= BASE_URL %>"),
            ],
        );

        let count = render_dir(
            dir.path(),
            &["**/public/**".to_string()],
            &data(),
            &PlaceholderRenderer,
        )
        .unwrap();

        assert_eq!(count, 2);
        assert_eq!(
            std::fs::read_to_string(dir.path().join("package.json")).unwrap(),
            r#"{"name":"demo"}"#
        );
        assert_eq!(
            std::fs::read_to_string(dir.path().join("public/index.html")).unwrap(),
            "<%= BASE_URL %>"
        );
    }

    #[test]
    fn test_render_dir_skips_hidden_entries() {
        let dir = TempDir::new().unwrap();
        write_files(
            dir.path(),
            &[
                (".git/COMMIT_EDITMSG", "wip <%= projectName"),
                (".env", "NAME=<%= projectName %>"),
                ("README.md", "# <%= projectName %>"),
            ],
        );

        let count = render_dir(dir.path(), &[], &data(), &PlaceholderRenderer).unwrap();

        assert_eq!(count, 1);
        assert_eq!(
            std::fs::read_to_string(dir.path().join(".git/COMMIT_EDITMSG")).unwrap(),
            "wip <%= projectName"
        );
        assert_eq!(
            std::fs::read_to_string(dir.path().join(".env")).unwrap(),
            "NAME=<%= projectName %>"
        );
    }

    #[test]
    fn test_render_dir_leaves_binary_files() {
        let dir = TempDir::new().unwrap();
        std::fs::write(dir.path().join("logo.png"), [0x89, 0x50, 0xff, 0xfe]).unwrap();

        let count = render_dir(dir.path(), &[], &data(), &PlaceholderRenderer).unwrap();

        assert_eq!(count, 0);
        assert_eq!(
            std::fs::read(dir.path().join("logo.png")).unwrap(),
            vec![0x89, 0x50, 0xff, 0xfe]
        );
    }

    #[test]
    fn test_render_dir_failure_reports_path() {
        let dir = TempDir::new().unwrap();
        write_files(dir.path(), &[("broken.txt", "<%= nope %>")]);

        let err = render_dir(dir.path(), &[], &data(), &PlaceholderRenderer).unwrap_err();
        match err {
            ScaffoldError::Render { path, .. } => assert_eq!(path, Path::new("broken.txt")),
            other => panic!("unexpected error: {}", other),
        }
    }
}
