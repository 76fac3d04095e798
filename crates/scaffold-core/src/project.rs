//! Project metadata collected before scaffolding

use regex::Regex;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::sync::OnceLock;

use crate::error::{Result, ScaffoldError};
use crate::registry::version::parse_version;

/// What is being scaffolded.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ScaffoldType {
    Project,
    Component,
}

impl ScaffoldType {
    pub fn display_name(&self) -> &'static str {
        match self {
            ScaffoldType::Project => "Project",
            ScaffoldType::Component => "Component",
        }
    }

    pub fn tag(&self) -> &'static str {
        match self {
            ScaffoldType::Project => "project",
            ScaffoldType::Component => "component",
        }
    }
}

impl fmt::Display for ScaffoldType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.display_name())
    }
}

/// Validated scaffold metadata. Derived fields are computed once in
/// [`ProjectInfo::new`]; the struct is read-only afterwards.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ProjectInfo {
    #[serde(rename = "type")]
    scaffold_type: ScaffoldType,
    project_name: String,
    /// Alias of `project_name` for templates
    name: String,
    class_name: String,
    version: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    description: Option<String>,
    project_template: String,
}

impl ProjectInfo {
    pub fn new(
        scaffold_type: ScaffoldType,
        project_name: &str,
        version: &str,
        description: Option<String>,
        project_template: &str,
    ) -> Result<Self> {
        validate_project_name(project_name)?;
        validate_version(version)?;

        let description = match scaffold_type {
            ScaffoldType::Component => description,
            ScaffoldType::Project => None,
        };

        Ok(Self {
            scaffold_type,
            project_name: project_name.to_string(),
            name: project_name.to_string(),
            class_name: class_name(project_name),
            version: version.to_string(),
            description,
            project_template: project_template.to_string(),
        })
    }

    pub fn scaffold_type(&self) -> ScaffoldType {
        self.scaffold_type
    }

    pub fn project_name(&self) -> &str {
        &self.project_name
    }

    pub fn class_name(&self) -> &str {
        &self.class_name
    }

    pub fn version(&self) -> &str {
        &self.version
    }

    pub fn description(&self) -> Option<&str> {
        self.description.as_deref()
    }

    pub fn project_template(&self) -> &str {
        &self.project_template
    }

    /// JSON form handed to the renderer and to custom templates.
    pub fn to_value(&self) -> serde_json::Value {
        serde_json::to_value(self).unwrap_or(serde_json::Value::Null)
    }
}

fn name_pattern() -> &'static Regex {
    static PATTERN: OnceLock<Regex> = OnceLock::new();
    PATTERN.get_or_init(|| {
        Regex::new(r"^[a-zA-Z]+([-][a-zA-Z][a-zA-Z0-9]*|[_][a-zA-Z][a-zA-Z0-9]*|[a-zA-Z0-9])*$")
            .expect("project name pattern is valid")
    })
}

/// Name starts with a letter, ends with a letter or digit, and only uses
/// single `-` or `_` separators each followed by a letter.
pub fn is_valid_project_name(name: &str) -> bool {
    name_pattern().is_match(name)
}

pub fn validate_project_name(name: &str) -> Result<()> {
    if is_valid_project_name(name) {
        Ok(())
    } else {
        Err(ScaffoldError::InvalidProjectName(name.to_string()))
    }
}

pub fn validate_version(version: &str) -> Result<()> {
    match semver::Version::parse(version) {
        Ok(_) => Ok(()),
        Err(source) => Err(ScaffoldError::InvalidVersion {
            version: version.to_string(),
            source,
        }),
    }
}

/// Normalize a user-typed version (`v1.0.0` -> `1.0.0`), if it is valid.
pub fn clean_version(version: &str) -> Option<String> {
    parse_version(version.trim()).map(|v| v.to_string())
}

/// Kebab-case slug of a project name with any leading `-` removed:
/// `MyApp_demo` -> `my-app-demo`.
pub fn class_name(project_name: &str) -> String {
    let mut out = String::with_capacity(project_name.len() + 4);
    for ch in project_name.chars() {
        if ch.is_ascii_uppercase() {
            out.push('-');
            out.push(ch.to_ascii_lowercase());
        } else if ch == '_' || ch == ' ' {
            out.push('-');
        } else {
            out.push(ch);
        }
    }

    let mut collapsed = String::with_capacity(out.len());
    for ch in out.chars() {
        if ch == '-' && collapsed.ends_with('-') {
            continue;
        }
        collapsed.push(ch);
    }
    collapsed.trim_start_matches('-').to_string()
}
