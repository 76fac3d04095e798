//! CLI configuration resolved once at startup
//!
//! Precedence, lowest to highest: product defaults, `{cliHome}/config.yaml`,
//! environment variables, command line flags.

use serde::Deserialize;
use std::collections::BTreeMap;
use std::path::{Path, PathBuf};
use tracing::debug;

use crate::error::{Result, ScaffoldError};
use crate::product::ProductConfig;
use crate::registry::{default_registry, RegistryClient};
use crate::templates::{CatalogSource, TemplateCatalog};

/// Optional config file inside the CLI home
pub const CONFIG_FILE: &str = "config.yaml";

const TEMPLATE_DIR: &str = "template";
const DEPENDENCIES_DIR: &str = "dependencies";
const STORE_DIR: &str = "node_modules";

/// Values that come from command line flags.
#[derive(Debug, Clone, Default)]
pub struct ConfigOverrides {
    pub registry: Option<String>,
    /// Local catalog file used instead of the catalog service
    pub catalog: Option<PathBuf>,
    /// Run command packages from this directory instead of the registry
    pub target_path: Option<PathBuf>,
    pub debug: bool,
    /// Defaults to the process working directory
    pub working_dir: Option<PathBuf>,
}

/// `{cliHome}/config.yaml`
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase", default)]
struct ConfigFile {
    registry: Option<String>,
    catalog_url: Option<String>,
    commands: BTreeMap<String, String>,
}

impl ConfigFile {
    fn read(path: &Path) -> Result<Self> {
        if !path.exists() {
            return Ok(Self::default());
        }
        debug!("Loading config from {}", path.display());
        let content = std::fs::read_to_string(path)?;
        if content.trim().is_empty() {
            return Ok(Self::default());
        }
        Ok(serde_yaml::from_str(&content)?)
    }
}

/// Resolved configuration, passed by reference to every command.
#[derive(Debug, Clone)]
pub struct CliConfig {
    pub home_dir: PathBuf,
    pub cli_home: PathBuf,
    pub registry: String,
    pub catalog: CatalogSource,
    pub target_path: Option<PathBuf>,
    pub working_dir: PathBuf,
    pub debug: bool,
    /// Command name -> registry package
    pub commands: BTreeMap<String, String>,
    pub user_agent: String,
}

impl CliConfig {
    /// Resolve from the real environment.
    pub fn load<C: ProductConfig>(product: &C, overrides: ConfigOverrides) -> Result<Self> {
        Self::resolve(product, overrides, dirs::home_dir(), &|key| std::env::var(key).ok())
    }

    /// Resolve against an explicit home directory and environment lookup.
    pub fn resolve<C: ProductConfig>(
        product: &C,
        overrides: ConfigOverrides,
        home_dir: Option<PathBuf>,
        env: &dyn Fn(&str) -> Option<String>,
    ) -> Result<Self> {
        let home_dir = home_dir
            .filter(|home| home.is_dir())
            .ok_or_else(|| ScaffoldError::config("Current user home directory does not exist"))?;

        let cli_home = home_dir.join(
            non_blank(env(product.home_env())).unwrap_or_else(|| product.default_home_dir().to_string()),
        );
        let file = ConfigFile::read(&cli_home.join(CONFIG_FILE))?;

        let registry = overrides
            .registry
            .or_else(|| non_blank(env(product.registry_env())))
            .or(file.registry)
            .unwrap_or_else(|| default_registry(false).to_string());

        let catalog = match overrides.catalog {
            Some(path) => CatalogSource::local(path),
            None => {
                let base = non_blank(env(product.catalog_url_env()))
                    .or(file.catalog_url)
                    .unwrap_or_else(|| product.default_catalog_url().to_string());
                CatalogSource::remote(&base)?
            }
        };

        let working_dir = match overrides.working_dir {
            Some(dir) => dir,
            None => std::env::current_dir()?,
        };
        let target_path = overrides.target_path.map(|path| {
            if path.is_absolute() {
                path
            } else {
                working_dir.join(path)
            }
        });

        let mut commands: BTreeMap<String, String> = product
            .default_commands()
            .into_iter()
            .map(|(name, package)| (name.to_string(), package.to_string()))
            .collect();
        commands.extend(file.commands);

        Ok(Self {
            home_dir,
            cli_home,
            registry,
            catalog,
            target_path,
            working_dir,
            debug: overrides.debug,
            commands,
            user_agent: product.user_agent().to_string(),
        })
    }

    /// Cache root of template packages' installs
    pub fn template_dir(&self) -> PathBuf {
        self.cli_home.join(TEMPLATE_DIR)
    }

    pub fn template_store_dir(&self) -> PathBuf {
        self.template_dir().join(STORE_DIR)
    }

    /// Cache root of command packages' installs
    pub fn dependencies_dir(&self) -> PathBuf {
        self.cli_home.join(DEPENDENCIES_DIR)
    }

    pub fn dependencies_store_dir(&self) -> PathBuf {
        self.dependencies_dir().join(STORE_DIR)
    }

    pub fn registry_client(&self) -> RegistryClient {
        RegistryClient::new(Some(&self.registry), &self.user_agent)
    }

    pub fn template_catalog(&self) -> TemplateCatalog {
        TemplateCatalog::new(self.catalog.clone(), &self.user_agent)
    }

    /// Package serving `command`, if any.
    pub fn command_package(&self, command: &str) -> Option<&str> {
        self.commands.get(command).map(String::as_str)
    }
}

fn non_blank(value: Option<String>) -> Option<String> {
    value.filter(|v| !v.trim().is_empty())
}
