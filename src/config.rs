//! Service configuration

use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

use crate::error::CheckinError;

/// Hugging Face hosted inference base, used when only a token is configured
const HF_INFERENCE_BASE: &str = "https://api-inference.huggingface.co/models";

/// Default data directory
pub fn default_data_dir() -> PathBuf {
    dirs::data_local_dir()
        .unwrap_or_else(|| PathBuf::from("."))
        .join("wellshift")
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Config {
    #[serde(default)]
    pub server: ServerConfig,
    #[serde(default)]
    pub storage: StorageConfig,
    #[serde(default)]
    pub scorer: ScorerConfig,
    #[serde(default)]
    pub detection: DetectionConfig,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ServerConfig {
    /// Bind host
    #[serde(default = "default_host")]
    pub host: String,

    /// HTTP API port
    #[serde(default = "default_http_port")]
    pub http_port: u16,

    /// Browser origins allowed by CORS
    #[serde(default = "default_cors_origins")]
    pub cors_origins: Vec<String>,

    /// Longest accepted check-in text, in characters
    #[serde(default = "default_max_text_chars")]
    pub max_text_chars: usize,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StorageConfig {
    /// Directory holding the database
    #[serde(default = "default_data_dir")]
    pub data_dir: PathBuf,

    /// SQLite file name inside `data_dir`
    #[serde(default = "default_database_file")]
    pub database_file: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ScorerConfig {
    /// Text-classification endpoint. When unset and a token is present,
    /// the hosted inference URL for `model` is used.
    #[serde(default)]
    pub endpoint: Option<String>,

    /// Model identifier
    #[serde(default = "default_model")]
    pub model: String,

    /// Bearer token for the endpoint
    #[serde(default)]
    pub api_token: Option<String>,

    /// Per-request timeout
    #[serde(default = "default_timeout_secs")]
    pub timeout_secs: u64,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DetectionConfig {
    /// Number of most recent entries forming the baseline
    #[serde(default = "default_baseline_window")]
    pub baseline_window: usize,
}

// Defaults
fn default_host() -> String { "0.0.0.0".to_string() }
fn default_http_port() -> u16 { 8000 }
fn default_cors_origins() -> Vec<String> {
    vec![
        "http://localhost:5173".to_string(),
        "http://localhost:3000".to_string(),
    ]
}
fn default_max_text_chars() -> usize { 5000 }
fn default_database_file() -> String { "checkins.db".to_string() }
fn default_model() -> String { "cardiffnlp/twitter-roberta-base-sentiment-latest".to_string() }
fn default_timeout_secs() -> u64 { 30 }
fn default_baseline_window() -> usize { 90 }

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: default_host(),
            http_port: default_http_port(),
            cors_origins: default_cors_origins(),
            max_text_chars: default_max_text_chars(),
        }
    }
}

impl Default for StorageConfig {
    fn default() -> Self {
        Self {
            data_dir: default_data_dir(),
            database_file: default_database_file(),
        }
    }
}

impl Default for ScorerConfig {
    fn default() -> Self {
        Self {
            endpoint: None,
            model: default_model(),
            api_token: None,
            timeout_secs: default_timeout_secs(),
        }
    }
}

impl Default for DetectionConfig {
    fn default() -> Self {
        Self {
            baseline_window: default_baseline_window(),
        }
    }
}

impl Config {
    /// Load config from file
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self, CheckinError> {
        let content = std::fs::read_to_string(path)?;
        toml::from_str(&content).map_err(|e| CheckinError::Config(e.to_string()))
    }

    /// Save config to file
    pub fn save<P: AsRef<Path>>(&self, path: P) -> Result<(), CheckinError> {
        let content =
            toml::to_string_pretty(self).map_err(|e| CheckinError::Config(e.to_string()))?;
        std::fs::write(path, content)?;
        Ok(())
    }

    /// Resolve the startup config.
    ///
    /// An explicit `path` is always read. Otherwise `config.toml` inside the
    /// data directory is read when present, falling back to defaults. A
    /// `data_dir` override picks that directory and also wins over whatever
    /// the loaded file says.
    pub fn resolve(path: Option<&Path>, data_dir: Option<&Path>) -> Result<Self, CheckinError> {
        let mut config = match path {
            Some(path) => Self::load(path)?,
            None => {
                let dir = data_dir.map(Path::to_path_buf).unwrap_or_else(default_data_dir);
                let path = dir.join("config.toml");
                if path.exists() {
                    Self::load(&path)?
                } else {
                    Self::default()
                }
            }
        };

        if let Some(dir) = data_dir {
            config.storage.data_dir = dir.to_path_buf();
        }
        Ok(config)
    }

    /// Get database path
    pub fn database_path(&self) -> PathBuf {
        self.storage.data_dir.join(&self.storage.database_file)
    }

    /// Get the config path used when none was given on the command line
    pub fn config_path(&self) -> PathBuf {
        self.storage.data_dir.join("config.toml")
    }
}

impl ScorerConfig {
    /// Endpoint the scorer should call, if any
    pub fn resolved_endpoint(&self) -> Option<String> {
        match (&self.endpoint, &self.api_token) {
            (Some(endpoint), _) if !endpoint.trim().is_empty() => Some(endpoint.trim().to_string()),
            (_, Some(_)) => Some(format!("{}/{}", HF_INFERENCE_BASE, self.model)),
            _ => None,
        }
    }
}
