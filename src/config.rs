//! Configuration module for pdfqa.
//!
//! This module provides a layered configuration system that supports:
//! - Default values
//! - TOML configuration file (`.pdfqa/settings.toml`)
//! - Environment variable overrides
//! - CLI argument overrides (applied by the commands)
//!
//! # Environment Variables
//!
//! Environment variables must be prefixed with `PDFQA_` and use double
//! underscores to separate nested levels:
//! - `PDFQA_RETRIEVAL__TOP_K=6` sets `retrieval.top_k`
//! - `PDFQA_LLM__MODEL=llama-3.1-8b-instant` sets `llm.model`
//! - `PDFQA_WORKING_DIR=/data/pdfqa` sets `working_dir`

use figment::{
    Figment,
    providers::{Env, Format, Serialized, Toml},
};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::path::{Path, PathBuf};

use crate::documents::ChunkingConfig;
use crate::qa::{LlmConfig, PromptConfig, RetrievalConfig};
use crate::store::{EMBEDDING_BATCH_SIZE, VECTOR_STORE_DIR};

/// Directory holding the settings file, found by walking up from the
/// current directory.
pub const CONFIG_DIR: &str = ".pdfqa";
pub const CONFIG_FILE: &str = "settings.toml";
const ENV_PREFIX: &str = "PDFQA_";

#[derive(Debug, Deserialize, Serialize, Clone, PartialEq)]
pub struct Settings {
    /// Version of the configuration schema
    #[serde(default = "default_version")]
    pub version: u32,

    /// Directory that holds `doc_vectorstore`. Relative paths resolve
    /// against the workspace root.
    #[serde(default = "default_working_dir")]
    pub working_dir: PathBuf,

    /// Workspace root directory (where .pdfqa is located)
    #[serde(skip_serializing_if = "Option::is_none")]
    pub workspace_root: Option<PathBuf>,

    #[serde(default)]
    pub chunking: ChunkingConfig,

    #[serde(default)]
    pub embedding: EmbeddingConfig,

    #[serde(default)]
    pub retrieval: RetrievalConfig,

    #[serde(default)]
    pub llm: LlmConfig,

    #[serde(default)]
    pub prompt: PromptConfig,

    #[serde(default)]
    pub logging: LoggingConfig,
}

#[derive(Debug, Deserialize, Serialize, Clone, PartialEq, Eq)]
pub struct EmbeddingConfig {
    /// fastembed model name
    #[serde(default = "default_embedding_model")]
    pub model: String,

    /// Chunks per embedding call during indexing
    #[serde(default = "default_batch_size")]
    pub batch_size: usize,

    /// Where model files are cached (defaults to the platform cache dir)
    #[serde(skip_serializing_if = "Option::is_none")]
    pub cache_dir: Option<PathBuf>,

    #[serde(default = "default_true")]
    pub show_download_progress: bool,
}

#[derive(Debug, Deserialize, Serialize, Clone, PartialEq, Eq)]
pub struct LoggingConfig {
    /// Default level: error, warn, info, debug, trace
    #[serde(default = "default_log_level")]
    pub default: String,

    /// Per-target overrides, e.g. `store = "debug"`
    #[serde(default)]
    pub modules: HashMap<String, String>,
}

// Default value functions
fn default_version() -> u32 {
    1
}
fn default_working_dir() -> PathBuf {
    PathBuf::from(".")
}
fn default_true() -> bool {
    true
}
fn default_embedding_model() -> String {
    "AllMiniLML6V2".to_string()
}
fn default_batch_size() -> usize {
    EMBEDDING_BATCH_SIZE
}
fn default_log_level() -> String {
    "warn".to_string()
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            version: default_version(),
            working_dir: default_working_dir(),
            workspace_root: None,
            chunking: ChunkingConfig::default(),
            embedding: EmbeddingConfig::default(),
            retrieval: RetrievalConfig::default(),
            llm: LlmConfig::default(),
            prompt: PromptConfig::default(),
            logging: LoggingConfig::default(),
        }
    }
}

impl Default for EmbeddingConfig {
    fn default() -> Self {
        Self {
            model: default_embedding_model(),
            batch_size: default_batch_size(),
            cache_dir: None,
            show_download_progress: true,
        }
    }
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            default: default_log_level(),
            modules: HashMap::new(),
        }
    }
}

impl Settings {
    /// Load configuration from all sources
    pub fn load() -> Result<Self, Box<figment::Error>> {
        // Try to find the workspace root by looking for .pdfqa directory
        let config_path = Self::find_workspace_config()
            .unwrap_or_else(|| PathBuf::from(CONFIG_DIR).join(CONFIG_FILE));

        Self::figment(&config_path)
            .extract()
            .map_err(Box::new)
            .map(|mut settings: Settings| {
                // If workspace_root is not set in config, detect it
                if settings.workspace_root.is_none() {
                    settings.workspace_root = Self::find_workspace_root();
                }
                settings
            })
    }

    /// Load configuration from a specific file
    pub fn load_from(path: impl AsRef<Path>) -> Result<Self, Box<figment::Error>> {
        let path = path.as_ref();
        Self::figment(path)
            .extract()
            .map_err(Box::new)
            .map(|mut settings: Settings| {
                if settings.workspace_root.is_none() {
                    settings.workspace_root = Self::root_of_config(path);
                }
                settings
            })
    }

    fn figment(config_path: &Path) -> Figment {
        Figment::new()
            // Start with defaults
            .merge(Serialized::defaults(Settings::default()))
            // Layer in config file if it exists
            .merge(Toml::file(config_path))
            // Double underscore separates nested levels; single underscores
            // stay inside field names
            .merge(Env::prefixed(ENV_PREFIX).map(|key| {
                key.as_str()
                    .to_lowercase()
                    .replace("__", ".")
                    .into()
            }))
    }

    /// Find the settings file by looking for a .pdfqa directory
    /// from the current directory up to the filesystem root
    fn find_workspace_config() -> Option<PathBuf> {
        Self::find_workspace_root().map(|root| root.join(CONFIG_DIR).join(CONFIG_FILE))
    }

    /// Get the workspace root directory (where .pdfqa is located)
    pub fn find_workspace_root() -> Option<PathBuf> {
        let current = std::env::current_dir().ok()?;

        current
            .ancestors()
            .find(|ancestor| ancestor.join(CONFIG_DIR).is_dir())
            .map(Path::to_path_buf)
    }

    /// `<root>/.pdfqa/settings.toml` belongs to `<root>`; any other file to
    /// its own directory.
    fn root_of_config(path: &Path) -> Option<PathBuf> {
        let parent = path.parent()?;
        let root = if parent.file_name().is_some_and(|name| name == CONFIG_DIR) {
            parent.parent()?
        } else {
            parent
        };
        if root.as_os_str().is_empty() {
            return std::env::current_dir().ok();
        }
        Some(root.to_path_buf())
    }

    /// Save current configuration to file
    pub fn save(&self, path: impl AsRef<Path>) -> Result<(), Box<dyn std::error::Error>> {
        let path = path.as_ref();
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }

        let mut to_save = self.clone();
        to_save.workspace_root = None;
        let toml_string = toml::to_string_pretty(&to_save)?;
        std::fs::write(path, toml_string)?;

        Ok(())
    }

    /// Create a default settings file in the current directory
    pub fn init_config_file(force: bool) -> Result<PathBuf, Box<dyn std::error::Error>> {
        let config_path = PathBuf::from(CONFIG_DIR).join(CONFIG_FILE);

        if !force && config_path.exists() {
            return Err("Configuration file already exists. Use --force to overwrite".into());
        }

        Settings::default().save(&config_path)?;
        Ok(config_path)
    }

    /// Check value ranges across all sections.
    pub fn validate(&self) -> Result<(), String> {
        self.chunking
            .validate()
            .map_err(|e| format!("chunking: {e}"))?;
        if self.embedding.batch_size == 0 {
            return Err("embedding.batch_size must be at least 1".to_string());
        }
        self.retrieval.validate()?;
        self.llm.validate()?;
        self.prompt.template()?;
        Ok(())
    }

    /// Working directory with relative paths resolved against the workspace root.
    pub fn resolved_working_dir(&self) -> PathBuf {
        if self.working_dir.is_absolute() {
            return self.working_dir.clone();
        }
        match &self.workspace_root {
            Some(root) => root.join(&self.working_dir),
            None => self.working_dir.clone(),
        }
    }

    /// Location of the vector store.
    pub fn store_root(&self) -> PathBuf {
        self.resolved_working_dir().join(VECTOR_STORE_DIR)
    }
}
