//! Configuration loading and root folder resolution
//!
//! The root folder holds the service database (`pomod.db`). Resolution
//! follows a fixed priority order:
//! 1. Command-line argument (highest priority)
//! 2. `POMOD_ROOT_FOLDER` environment variable
//! 3. TOML config file (`root_folder` key)
//! 4. OS-dependent compiled default (fallback)
//!
//! Missing config files never abort startup; resolution degrades to the
//! compiled default.

use serde::Deserialize;
use std::path::{Path, PathBuf};
use tracing::{info, warn};

use crate::{Error, Result};

/// Environment variable naming the root folder
pub const ROOT_FOLDER_ENV: &str = "POMOD_ROOT_FOLDER";

/// Compiled platform defaults
#[derive(Debug, Clone)]
pub struct CompiledDefaults {
    pub root_folder: PathBuf,
}

impl CompiledDefaults {
    /// Defaults for the platform this binary was compiled for
    pub fn for_current_platform() -> Self {
        let root_folder = if cfg!(target_os = "linux") {
            dirs::data_local_dir()
                .map(|d| d.join("pomod"))
                .unwrap_or_else(|| PathBuf::from("/var/lib/pomod"))
        } else if cfg!(target_os = "macos") {
            dirs::data_dir()
                .map(|d| d.join("pomod"))
                .unwrap_or_else(|| PathBuf::from("/Library/Application Support/pomod"))
        } else if cfg!(target_os = "windows") {
            dirs::data_local_dir()
                .map(|d| d.join("pomod"))
                .unwrap_or_else(|| PathBuf::from("C:\\ProgramData\\pomod"))
        } else {
            PathBuf::from("./pomod_data")
        };

        Self { root_folder }
    }
}

/// Optional TOML config file contents
#[derive(Debug, Clone, Default, Deserialize)]
pub struct TomlConfig {
    #[serde(default)]
    pub root_folder: Option<PathBuf>,
}

impl TomlConfig {
    /// Load the config file from the platform config directory, if present
    ///
    /// Looks for `~/.config/pomod/config.toml` (or the platform
    /// equivalent), then `/etc/pomod/config.toml` on Linux.
    pub fn load() -> Option<Self> {
        for path in Self::candidate_paths() {
            if !path.exists() {
                continue;
            }
            match std::fs::read_to_string(&path) {
                Ok(contents) => match toml::from_str::<TomlConfig>(&contents) {
                    Ok(config) => {
                        info!("Loaded config file: {}", path.display());
                        return Some(config);
                    }
                    Err(e) => {
                        warn!("Ignoring malformed config file {}: {}", path.display(), e);
                    }
                },
                Err(e) => {
                    warn!("Ignoring unreadable config file {}: {}", path.display(), e);
                }
            }
        }
        None
    }

    fn candidate_paths() -> Vec<PathBuf> {
        let mut paths = Vec::new();
        if let Some(dir) = dirs::config_dir() {
            paths.push(dir.join("pomod").join("config.toml"));
        }
        if cfg!(target_os = "linux") {
            paths.push(PathBuf::from("/etc/pomod/config.toml"));
        }
        paths
    }
}

/// Resolves the root folder for a service module
pub struct RootFolderResolver {
    module_name: String,
    cli_override: Option<PathBuf>,
}

impl RootFolderResolver {
    /// Create a resolver for the named module (used only for logging)
    pub fn new(module_name: &str) -> Self {
        Self {
            module_name: module_name.to_string(),
            cli_override: None,
        }
    }

    /// Supply a command-line override (priority 1)
    pub fn with_cli_override(mut self, path: Option<PathBuf>) -> Self {
        self.cli_override = path;
        self
    }

    /// Resolve the root folder following the priority order
    pub fn resolve(&self) -> PathBuf {
        // Priority 1: command-line argument
        if let Some(path) = &self.cli_override {
            info!("{}: root folder from command line: {}", self.module_name, path.display());
            return path.clone();
        }

        // Priority 2: environment variable
        if let Ok(path) = std::env::var(ROOT_FOLDER_ENV) {
            if !path.is_empty() {
                info!("{}: root folder from {}: {}", self.module_name, ROOT_FOLDER_ENV, path);
                return PathBuf::from(path);
            }
        }

        // Priority 3: TOML config file
        if let Some(config) = TomlConfig::load() {
            if let Some(path) = config.root_folder {
                info!("{}: root folder from config file: {}", self.module_name, path.display());
                return path;
            }
        }

        // Priority 4: compiled default
        let defaults = CompiledDefaults::for_current_platform();
        info!(
            "{}: root folder from compiled default: {}",
            self.module_name,
            defaults.root_folder.display()
        );
        defaults.root_folder
    }
}

/// Prepares a resolved root folder for use
pub struct RootFolderInitializer {
    root_folder: PathBuf,
}

impl RootFolderInitializer {
    pub fn new(root_folder: PathBuf) -> Self {
        Self { root_folder }
    }

    /// Create the root folder if it does not exist
    pub fn ensure_directory_exists(&self) -> Result<()> {
        if !self.root_folder.exists() {
            std::fs::create_dir_all(&self.root_folder).map_err(|e| {
                Error::Config(format!(
                    "Cannot create root folder {}: {}",
                    self.root_folder.display(),
                    e
                ))
            })?;
            info!("Created root folder: {}", self.root_folder.display());
        }
        Ok(())
    }

    /// Path of the service database inside the root folder
    pub fn database_path(&self) -> PathBuf {
        self.root_folder.join("pomod.db")
    }

    pub fn root_folder(&self) -> &Path {
        &self.root_folder
    }
}
