//! Error types for scaffolding operations

use std::path::PathBuf;
use thiserror::Error;

/// Result type for scaffolding operations.
pub type Result<T> = std::result::Result<T, ScaffoldError>;

/// Every failure a scaffolding run can surface.
#[derive(Error, Debug)]
pub enum ScaffoldError {
    /// Invalid construction input or unusable environment
    #[error("Configuration error: {0}")]
    Config(String),

    /// Transport-level failure talking to the registry
    #[error("Registry request to {url} failed: {source}")]
    Registry {
        url: String,
        #[source]
        source: reqwest::Error,
    },

    /// The registry answered, but with something we cannot use
    #[error("Registry error: {0}")]
    RegistryResponse(String),

    /// Package has no published version to resolve against
    #[error("No published version available for {0}")]
    NoVersionAvailable(String),

    /// Dependency installer failed during install()
    #[error("Failed to install {package}@{version}: {message}")]
    Install {
        package: String,
        version: String,
        message: String,
    },

    /// Dependency installer failed during update()
    #[error("Failed to update {package} to {version}: {message}")]
    Update {
        package: String,
        version: String,
        message: String,
    },

    /// Tarball contents did not match the published integrity hash
    #[error("Integrity check failed for {package}: expected {expected}, got {actual}")]
    IntegrityMismatch {
        package: String,
        expected: String,
        actual: String,
    },

    /// Package is missing locally or its manifest names no entry file
    #[error("Entry file not found for package {0}")]
    MissingEntryPoint(String),

    /// Template descriptor carries a type we cannot install
    #[error("Unrecognized template type: {0}")]
    UnrecognizedTemplateType(String),

    /// Command's leading token is not an allow-listed package manager
    #[error("Command not allowed: {0}")]
    CommandNotAllowed(String),

    /// Allow-listed command ran and exited non-zero
    /// Exit code is -1 when the process was terminated by a signal
    #[error("{message} (command: {command}, exit code: {code})")]
    CommandExecution {
        command: String,
        message: String,
        code: i32,
    },

    /// Subprocess could not be started at all
    #[error("Failed to start {program}: {source}")]
    Spawn {
        program: String,
        #[source]
        source: std::io::Error,
    },

    /// A required runtime (e.g. Node.js) is not installed
    #[error("{0} is required but was not found in PATH")]
    RuntimeMissing(&'static str),

    /// The catalog (or the catalog filtered by scaffold type) is empty
    #[error("No project templates available{0}")]
    NoTemplates(String),

    /// Template package could not be downloaded or updated
    #[error("Template download failed: {0}")]
    TemplateDownload(#[source] Box<ScaffoldError>),

    /// A file could not be rendered as a template
    #[error("Failed to render {path}: {message}")]
    Render { path: PathBuf, message: String },

    /// Project name rejected by validation
    #[error("Invalid project name: {0}")]
    InvalidProjectName(String),

    /// Version string rejected by validation
    #[error("Invalid version '{version}': {source}")]
    InvalidVersion {
        version: String,
        #[source]
        source: semver::Error,
    },

    /// Command name is neither built in nor mapped to a package
    #[error("Unknown command: {name}. Available commands: {available}")]
    UnknownCommand { name: String, available: String },

    /// IO error
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// JSON parsing error
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// YAML parsing error
    #[error("YAML error: {0}")]
    Yaml(#[from] serde_yaml::Error),
}

impl ScaffoldError {
    pub(crate) fn config(message: impl Into<String>) -> Self {
        ScaffoldError::Config(message.into())
    }
}
