//! Configuration loading and root folder resolution
//!
//! Every value resolves in this order:
//! 1. Command-line argument (highest priority)
//! 2. Environment variable (`LUMICAT_*`)
//! 3. TOML config file
//! 4. Compiled default (fallback)
//!
//! Steps 1 and 2 are handled by the binary's argument parser; this module
//! covers the TOML file and the compiled defaults.

use crate::{Error, Result};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use tracing::{info, warn};

/// Environment variable naming the root folder
pub const ROOT_FOLDER_ENV: &str = "LUMICAT_ROOT";

/// Database file name inside the root folder
pub const DATABASE_FILE: &str = "lumicat.db";

/// How the import pipeline treats a missing or implausible year
///
/// Older import endpoints substituted the current year while the canonical
/// one left the value empty. The policy is chosen explicitly here rather than
/// inferred per endpoint.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum YearPolicy {
    /// Leave the year empty (canonical behavior)
    #[default]
    Absent,
    /// Substitute the current calendar year
    CurrentYear,
}

/// `[catalog]` section
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct CatalogConfig {
    pub default_page_size: i64,
    pub max_page_size: i64,
}

impl Default for CatalogConfig {
    fn default() -> Self {
        Self {
            default_page_size: 20,
            max_page_size: 100,
        }
    }
}

/// `[import]` section
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ImportConfig {
    pub year_policy: YearPolicy,
}

/// `[similarity]` section: external photo-similarity service
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SimilarityConfig {
    pub endpoint: Option<String>,
    pub api_key: Option<String>,
    pub timeout_secs: u64,
}

impl Default for SimilarityConfig {
    fn default() -> Self {
        Self {
            endpoint: None,
            api_key: None,
            timeout_secs: 30,
        }
    }
}

/// `[server]` section
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ServerLimits {
    /// Largest accepted request body (uploads, imports)
    pub max_upload_bytes: usize,
}

impl Default for ServerLimits {
    fn default() -> Self {
        Self {
            max_upload_bytes: 50 * 1024 * 1024,
        }
    }
}

/// Contents of `config.toml`
///
/// Every field is optional; a missing file behaves like an empty one.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct TomlConfig {
    pub root_folder: Option<PathBuf>,
    pub host: Option<String>,
    pub port: Option<u16>,
    pub catalog: CatalogConfig,
    pub import: ImportConfig,
    pub similarity: SimilarityConfig,
    pub server: ServerLimits,
}

impl TomlConfig {
    /// Parse a TOML document
    pub fn from_toml_str(content: &str) -> Result<Self> {
        let config: TomlConfig =
            toml::from_str(content).map_err(|e| Error::Config(e.to_string()))?;
        config.validate()?;
        Ok(config)
    }

    fn validate(&self) -> Result<()> {
        if self.catalog.max_page_size < 1 {
            return Err(Error::Config("catalog.max_page_size must be at least 1".to_string()));
        }
        if self.catalog.default_page_size < 1
            || self.catalog.default_page_size > self.catalog.max_page_size
        {
            return Err(Error::Config(format!(
                "catalog.default_page_size must be between 1 and {}",
                self.catalog.max_page_size
            )));
        }
        Ok(())
    }
}

/// Read and parse a TOML config file
pub fn load_toml_config(path: &Path) -> Result<TomlConfig> {
    let content = std::fs::read_to_string(path)
        .map_err(|e| Error::Config(format!("Cannot read {}: {}", path.display(), e)))?;
    TomlConfig::from_toml_str(&content)
}

/// Locate the default config file for the platform, if one exists
///
/// Checks `<config dir>/lumicat/config.toml`, then (Unix) `/etc/lumicat/config.toml`.
pub fn default_config_path() -> Option<PathBuf> {
    let user_config = dirs::config_dir().map(|d| d.join("lumicat").join("config.toml"));
    if let Some(path) = user_config {
        if path.exists() {
            return Some(path);
        }
    }

    if cfg!(unix) {
        let system_config = PathBuf::from("/etc/lumicat/config.toml");
        if system_config.exists() {
            return Some(system_config);
        }
    }

    None
}

/// Load the config file named on the command line, or the platform default
///
/// An explicitly named file must load. A missing default file is not an
/// error: the compiled defaults apply. A broken default file logs a warning
/// and is ignored.
pub fn load_config(explicit: Option<&Path>) -> Result<TomlConfig> {
    if let Some(path) = explicit {
        let config = load_toml_config(path)?;
        info!("Loaded configuration from {}", path.display());
        return Ok(config);
    }

    match default_config_path() {
        Some(path) => match load_toml_config(&path) {
            Ok(config) => {
                info!("Loaded configuration from {}", path.display());
                Ok(config)
            }
            Err(e) => {
                warn!("Ignoring config file {}: {}", path.display(), e);
                Ok(TomlConfig::default())
            }
        },
        None => {
            info!("No config file found, using compiled defaults");
            Ok(TomlConfig::default())
        }
    }
}

/// Get OS-dependent default root folder path
pub fn default_root_folder() -> PathBuf {
    dirs::data_local_dir()
        .map(|d| d.join("lumicat"))
        .unwrap_or_else(|| PathBuf::from("./lumicat_data"))
}

/// Resolves the root folder holding the database
pub struct RootFolderResolver {
    module_name: String,
}

impl RootFolderResolver {
    pub fn new(module_name: &str) -> Self {
        Self {
            module_name: module_name.to_string(),
        }
    }

    /// `explicit` is the CLI/environment value, already merged by the
    /// argument parser
    pub fn resolve(&self, explicit: Option<&Path>, toml: &TomlConfig) -> PathBuf {
        if let Some(path) = explicit {
            info!("[{}] Root folder from command line/environment", self.module_name);
            return path.to_path_buf();
        }

        if let Some(path) = &toml.root_folder {
            info!("[{}] Root folder from config file", self.module_name);
            return path.clone();
        }

        info!("[{}] Root folder from compiled default", self.module_name);
        default_root_folder()
    }
}

/// Creates the root folder and names the files inside it
pub struct RootFolderInitializer {
    root_folder: PathBuf,
}

impl RootFolderInitializer {
    pub fn new(root_folder: PathBuf) -> Self {
        Self { root_folder }
    }

    pub fn ensure_directory_exists(&self) -> Result<()> {
        if !self.root_folder.exists() {
            std::fs::create_dir_all(&self.root_folder)?;
            info!("Created root folder: {}", self.root_folder.display());
        }
        Ok(())
    }

    pub fn database_path(&self) -> PathBuf {
        self.root_folder.join(DATABASE_FILE)
    }
}
