//! Configuration loading and root folder resolution
//!
//! Root folder priority order:
//! 1. Command-line argument (highest priority)
//! 2. Environment variable `LEARNING_ROOT_FOLDER`
//! 3. TOML config file `root_folder`
//! 4. OS-dependent compiled default (fallback)
//!
//! API keys resolve environment first, then TOML. A missing key is not fatal;
//! the routes that need it report the problem per request.

use crate::{Error, Result};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use tracing::{info, warn};

/// Environment variable overriding the root folder
pub const ROOT_FOLDER_ENV: &str = "LEARNING_ROOT_FOLDER";

/// Environment variable holding the Anthropic API key
pub const ANTHROPIC_API_KEY_ENV: &str = "ANTHROPIC_API_KEY";

/// Environment variable holding the TranscriptAPI key
pub const TRANSCRIPT_API_KEY_ENV: &str = "TRANSCRIPT_API_KEY";

/// Database file name inside the root folder
pub const DATABASE_FILE: &str = "learning.db";

/// Model used for every LLM task unless overridden
pub const DEFAULT_MODEL: &str = "claude-haiku-4-5-20251001";

/// Compiled defaults used when nothing else is configured
#[derive(Debug, Clone)]
pub struct CompiledDefaults {
    pub root_folder: PathBuf,
    pub log_level: String,
}

impl CompiledDefaults {
    pub fn for_current_platform() -> Self {
        Self {
            root_folder: default_root_folder(),
            log_level: "info".to_string(),
        }
    }
}

/// Logging section of the TOML file
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LoggingConfig {
    #[serde(default = "default_log_level")]
    pub level: String,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: default_log_level(),
        }
    }
}

fn default_log_level() -> String {
    CompiledDefaults::for_current_platform().log_level
}

/// Model name and output budget for one LLM task
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TaskModel {
    pub model: String,
    pub max_tokens: u32,
}

impl TaskModel {
    fn with_budget(max_tokens: u32) -> Self {
        Self {
            model: DEFAULT_MODEL.to_string(),
            max_tokens,
        }
    }
}

/// Per-task model overrides (`[models.*]` tables)
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ModelConfig {
    #[serde(default = "default_breakpoint_model")]
    pub breakpoints: TaskModel,
    #[serde(default = "default_challenge_model")]
    pub challenge: TaskModel,
    #[serde(default = "default_evaluation_model")]
    pub evaluation: TaskModel,
}

fn default_breakpoint_model() -> TaskModel {
    TaskModel::with_budget(2000)
}

fn default_challenge_model() -> TaskModel {
    TaskModel::with_budget(2048)
}

fn default_evaluation_model() -> TaskModel {
    TaskModel::with_budget(1024)
}

impl Default for ModelConfig {
    fn default() -> Self {
        Self {
            breakpoints: default_breakpoint_model(),
            challenge: default_challenge_model(),
            evaluation: default_evaluation_model(),
        }
    }
}

/// On-disk TOML configuration
///
/// Every field is optional so that a partial file still loads.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct TomlConfig {
    #[serde(default)]
    pub root_folder: Option<PathBuf>,
    #[serde(default)]
    pub logging: LoggingConfig,
    #[serde(default)]
    pub anthropic_api_key: Option<String>,
    #[serde(default)]
    pub transcript_api_key: Option<String>,
    #[serde(default)]
    pub anthropic_base_url: Option<String>,
    #[serde(default)]
    pub transcript_base_url: Option<String>,
    #[serde(default)]
    pub models: ModelConfig,
}

/// Default config file location (`~/.config/learning-app/config.toml` on Linux)
pub fn default_config_path() -> Option<PathBuf> {
    dirs::config_dir().map(|d| d.join("learning-app").join("config.toml"))
}

/// Load and parse a TOML config file
pub fn load_toml_config(path: &Path) -> Result<TomlConfig> {
    let content = std::fs::read_to_string(path)
        .map_err(|e| Error::Config(format!("Read {} failed: {}", path.display(), e)))?;
    toml::from_str(&content)
        .map_err(|e| Error::Config(format!("Parse {} failed: {}", path.display(), e)))
}

/// Config file to read: the explicit path, else the default path if it exists
pub fn locate_config(explicit: Option<&Path>) -> Option<PathBuf> {
    match explicit {
        Some(path) => Some(path.to_path_buf()),
        None => default_config_path().filter(|path| path.exists()),
    }
}

/// Validate API key (non-empty, non-whitespace)
pub fn is_valid_key(key: &str) -> bool {
    !key.trim().is_empty()
}

/// Resolve an API key: environment variable first, then the TOML value
pub fn resolve_api_key(env_var: &str, toml_value: Option<&str>) -> Option<String> {
    if let Ok(key) = std::env::var(env_var) {
        if is_valid_key(&key) {
            info!("{} loaded from environment", env_var);
            return Some(key.trim().to_string());
        }
    }

    if let Some(key) = toml_value {
        if is_valid_key(key) {
            info!("{} loaded from TOML config", env_var);
            return Some(key.trim().to_string());
        }
    }

    warn!("{} not configured", env_var);
    None
}

/// Resolves the root folder from CLI, environment, TOML and compiled defaults
#[derive(Debug, Clone)]
pub struct RootFolderResolver {
    module_name: String,
    cli_arg: Option<PathBuf>,
    toml_root: Option<PathBuf>,
}

impl RootFolderResolver {
    pub fn new(module_name: &str) -> Self {
        Self {
            module_name: module_name.to_string(),
            cli_arg: None,
            toml_root: None,
        }
    }

    pub fn with_cli_arg(mut self, path: Option<PathBuf>) -> Self {
        self.cli_arg = path;
        self
    }

    pub fn with_toml(mut self, config: &TomlConfig) -> Self {
        self.toml_root = config.root_folder.clone();
        self
    }

    pub fn resolve(&self) -> PathBuf {
        if let Some(path) = &self.cli_arg {
            info!("[{}] Root folder from command line: {}", self.module_name, path.display());
            return path.clone();
        }

        if let Ok(path) = std::env::var(ROOT_FOLDER_ENV) {
            if !path.trim().is_empty() {
                info!("[{}] Root folder from {}: {}", self.module_name, ROOT_FOLDER_ENV, path);
                return PathBuf::from(path);
            }
        }

        if let Some(path) = &self.toml_root {
            info!("[{}] Root folder from TOML config: {}", self.module_name, path.display());
            return path.clone();
        }

        let path = CompiledDefaults::for_current_platform().root_folder;
        info!("[{}] Root folder from compiled default: {}", self.module_name, path.display());
        path
    }
}

/// Creates the root folder and locates files inside it
#[derive(Debug, Clone)]
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

/// Get OS-dependent default root folder path
fn default_root_folder() -> PathBuf {
    dirs::data_local_dir()
        .map(|d| d.join("learning-app"))
        .unwrap_or_else(|| PathBuf::from("./learning_data"))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_model_defaults() {
        let models = ModelConfig::default();
        assert_eq!(models.breakpoints.max_tokens, 2000);
        assert_eq!(models.challenge.max_tokens, 2048);
        assert_eq!(models.evaluation.max_tokens, 1024);
        assert_eq!(models.evaluation.model, DEFAULT_MODEL);
    }

    #[test]
    fn test_is_valid_key() {
        assert!(is_valid_key("sk-ant-123"));
        assert!(!is_valid_key(""));
        assert!(!is_valid_key("   \t"));
    }

    #[test]
    fn test_database_path_inside_root() {
        let init = RootFolderInitializer::new(PathBuf::from("/tmp/learning-root"));
        assert_eq!(init.database_path(), PathBuf::from("/tmp/learning-root/learning.db"));
    }
}
