//! Template descriptor types and parsing

use serde::{Deserialize, Serialize};
use std::fmt;

use crate::project::ScaffoldType;

/// How a template is installed.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum TemplateKind {
    /// Copy `template/`, render placeholders, run install/start commands
    #[default]
    Normal,
    /// Hand off to the package's own entry script
    Custom,
    /// Anything else; rejected at install time
    Other(String),
}

impl From<String> for TemplateKind {
    fn from(value: String) -> Self {
        match value.as_str() {
            "" | "normal" => TemplateKind::Normal,
            "custom" => TemplateKind::Custom,
            _ => TemplateKind::Other(value),
        }
    }
}

impl fmt::Display for TemplateKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            TemplateKind::Normal => write!(f, "normal"),
            TemplateKind::Custom => write!(f, "custom"),
            TemplateKind::Other(other) => write!(f, "{}", other),
        }
    }
}

impl Serialize for TemplateKind {
    fn serialize<S: serde::Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&self.to_string())
    }
}

// A missing or null `type` means normal
impl<'de> Deserialize<'de> for TemplateKind {
    fn deserialize<D: serde::Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        Option::<String>::deserialize(deserializer).map(|v| v.unwrap_or_default().into())
    }
}

/// One entry of the template catalog.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TemplateDescriptor {
    /// Human-readable label
    pub name: String,

    /// Registry package id
    pub npm_name: String,

    /// Explicit semver or `latest`
    pub version: String,

    /// Scaffold types this template applies to
    #[serde(default)]
    pub tag: Vec<ScaffoldType>,

    /// Globs excluded from placeholder rendering
    #[serde(default)]
    pub ignore: Vec<String>,

    #[serde(default)]
    pub install_command: Option<String>,

    #[serde(default)]
    pub start_command: Option<String>,

    #[serde(rename = "type", default)]
    pub kind: TemplateKind,
}

impl TemplateDescriptor {
    /// Check if this template can scaffold the given type
    pub fn supports(&self, scaffold_type: ScaffoldType) -> bool {
        self.tag.contains(&scaffold_type)
    }
}

/// Templates applicable to `scaffold_type`, in catalog order.
pub fn templates_for(
    templates: &[TemplateDescriptor],
    scaffold_type: ScaffoldType,
) -> Vec<&TemplateDescriptor> {
    templates
        .iter()
        .filter(|t| t.supports(scaffold_type))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_remote_catalog_entry() {
        let json = r#"{
            "name": "Vue admin",
            "npmName": "@scaffold/template-vue-admin",
            "version": "1.0.0",
            "type": "normal",
            "tag": ["project"],
            "ignore": ["**/public/**"],
            "installCommand": "npm install",
            "startCommand": "npm run serve"
        }"#;
        let descriptor: TemplateDescriptor = serde_json::from_str(json).unwrap();

        assert_eq!(descriptor.npm_name, "@scaffold/template-vue-admin");
        assert_eq!(descriptor.kind, TemplateKind::Normal);
        assert!(descriptor.supports(ScaffoldType::Project));
        assert!(!descriptor.supports(ScaffoldType::Component));
        assert_eq!(descriptor.install_command.as_deref(), Some("npm install"));
    }

    #[test]
    fn test_kind_defaults_to_normal() {
        let json = r#"{"name":"x","npmName":"x","version":"1.0.0"}"#;
        let descriptor: TemplateDescriptor = serde_json::from_str(json).unwrap();
        assert_eq!(descriptor.kind, TemplateKind::Normal);
        assert!(descriptor.tag.is_empty());

        let json = r#"{"name":"x","npmName":"x","version":"1.0.0","type":null}"#;
        let descriptor: TemplateDescriptor = serde_json::from_str(json).unwrap();
        assert_eq!(descriptor.kind, TemplateKind::Normal);
    }

    #[test]
    fn test_unknown_kind_is_preserved() {
        let json = r#"{"name":"x","npmName":"x","version":"1.0.0","type":"remote"}"#;
        let descriptor: TemplateDescriptor = serde_json::from_str(json).unwrap();
        assert_eq!(descriptor.kind, TemplateKind::Other("remote".to_string()));
    }

    #[test]
    fn test_templates_for_filters_by_tag() {
        let yaml = r#"
- name: App
  npmName: app-template
  version: 1.0.0
  tag: [project]
- name: Widget
  npmName: widget-template
  version: 1.0.0
  type: custom
  tag: [component, project]
"#;
        let templates: Vec<TemplateDescriptor> = serde_yaml::from_str(yaml).unwrap();

        let projects = templates_for(&templates, ScaffoldType::Project);
        assert_eq!(projects.len(), 2);

        let components = templates_for(&templates, ScaffoldType::Component);
        assert_eq!(components.len(), 1);
        assert_eq!(components[0].kind, TemplateKind::Custom);
    }
}
