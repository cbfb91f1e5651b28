//! Configuration for the code indexing engine.
//!
//! Layered config: defaults, then a TOML file, then environment variables.
//!
//! # Environment Variables
//!
//! Environment variables must be prefixed with `CI_` and use double
//! underscores to separate nested levels:
//! - `CI_INDEXING__PARALLEL=false`
//! - `CI_INDEXING__MAX_FILE_SIZE_BYTES=2000000`

use figment::providers::{Env, Format, Serialized, Toml};
use figment::Figment;
use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};
use std::path::{Path, PathBuf};

#[derive(Debug, Deserialize, Serialize, Clone)]
pub struct Settings {
    #[serde(default = "default_version")]
    pub version: u32,

    #[serde(default = "default_index_path")]
    pub index_path: PathBuf,

    #[serde(default)]
    pub indexing: IndexingConfig,

    #[serde(default)]
    pub logging: LoggingConfig,
}

#[derive(Debug, Deserialize, Serialize, Clone)]
pub struct IndexingConfig {
    /// Directory basenames always excluded, at every nesting level.
    #[serde(default = "default_excludes")]
    pub default_excludes: Vec<String>,

    /// User-supplied additional directory basenames to exclude.
    #[serde(default)]
    pub additional_excludes: Vec<String>,

    /// Files larger than this are skipped, not parsed.
    #[serde(default = "default_max_file_size")]
    pub max_file_size_bytes: u64,

    /// Parse independent files concurrently.
    #[serde(default = "default_true")]
    pub parallel: bool,
}

#[derive(Debug, Deserialize, Serialize, Clone, Default)]
pub struct LoggingConfig {
    #[serde(default = "default_log_level")]
    pub default: String,

    #[serde(default)]
    pub modules: std::collections::HashMap<String, String>,
}

fn default_version() -> u32 {
    1
}
fn default_index_path() -> PathBuf {
    PathBuf::from(".code-index/index")
}
fn default_max_file_size() -> u64 {
    5 * 1024 * 1024
}
fn default_true() -> bool {
    true
}
fn default_log_level() -> String {
    "warn".to_string()
}
fn default_excludes() -> Vec<String> {
    [
        ".git", ".hg", ".svn", "node_modules", "target", "dist", "build", "out", ".venv", "venv",
        "__pycache__", ".idea", ".vscode", "vendor", ".tox", ".mypy_cache", ".pytest_cache",
    ]
    .into_iter()
    .map(str::to_string)
    .collect()
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            version: default_version(),
            index_path: default_index_path(),
            indexing: IndexingConfig::default(),
            logging: LoggingConfig::default(),
        }
    }
}

impl Default for IndexingConfig {
    fn default() -> Self {
        Self {
            default_excludes: default_excludes(),
            additional_excludes: Vec::new(),
            max_file_size_bytes: default_max_file_size(),
            parallel: true,
        }
    }
}

impl Settings {
    /// Load configuration from all sources: defaults, TOML file, env vars.
    pub fn load() -> Result<Self, figment::Error> {
        let config_path = Self::find_workspace_config()
            .unwrap_or_else(|| PathBuf::from(".code-index/settings.toml"));
        Self::load_from(config_path)
    }

    pub fn load_from(path: impl AsRef<Path>) -> Result<Self, figment::Error> {
        Figment::new()
            .merge(Serialized::defaults(Settings::default()))
            .merge(Toml::file(path.as_ref()))
            .merge(Env::prefixed("CI_").map(|key| {
                key.as_str().to_lowercase().replace("__", ".").into()
            }))
            .extract()
    }

    fn find_workspace_config() -> Option<PathBuf> {
        let current = std::env::current_dir().ok()?;
        for ancestor in current.ancestors() {
            let config_dir = ancestor.join(".code-index");
            if config_dir.is_dir() {
                return Some(config_dir.join("settings.toml"));
            }
        }
        None
    }

    pub fn check_init() -> Result<(), String> {
        let config_path = Self::find_workspace_config()
            .unwrap_or_else(|| PathBuf::from(".code-index/settings.toml"));
        if !config_path.exists() {
            return Err(
                "No .code-index/settings.toml found.\nRun 'codeindex init' to create one."
                    .to_string(),
            );
        }
        let content = std::fs::read_to_string(&config_path)
            .map_err(|e| format!("Cannot read configuration file: {e}"))?;
        toml::from_str::<Settings>(&content)
            .map_err(|e| format!("Configuration file is corrupted: {e}"))?;
        Ok(())
    }

    pub fn save(&self, path: impl AsRef<Path>) -> Result<(), Box<dyn std::error::Error>> {
        if let Some(parent) = path.as_ref().parent() {
            std::fs::create_dir_all(parent)?;
        }
        let toml_string = toml::to_string_pretty(self)?;
        std::fs::write(path, toml_string)?;
        Ok(())
    }

    pub fn init_config_file(force: bool) -> Result<PathBuf, Box<dyn std::error::Error>> {
        let config_path = PathBuf::from(".code-index/settings.toml");
        if config_path.exists() && !force {
            return Err("Configuration file already exists. Use --force to overwrite".into());
        }
        Settings::default().save(&config_path)?;
        Ok(config_path)
    }

    /// Per-project temp directory, keyed by a stable hash of the absolute
    /// project path. Used by both the shallow and deep index managers to
    /// scope their persisted artifacts per project.
    pub fn temp_dir_for(project_path: &Path) -> PathBuf {
        let absolute = project_path
            .canonicalize()
            .unwrap_or_else(|_| project_path.to_path_buf());
        let mut hasher = Sha256::new();
        hasher.update(absolute.to_string_lossy().as_bytes());
        let digest = hasher.finalize();
        let hex: String = digest.iter().take(6).map(|b| format!("{b:02x}")).collect();
        std::env::temp_dir().join("code-index").join(hex)
    }
}
