use anyhow::Result;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::PathBuf;

use crate::search_history::DEFAULT_MAX_HISTORY_ITEMS;

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    pub history: HistoryConfig,
    pub storage: StorageConfig,
    pub search: SearchConfig,
    pub logging: LoggingConfig,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct HistoryConfig {
    /// Number of recent searches to keep
    pub max_items: usize,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct StorageConfig {
    /// Store file location (defaults to the platform data directory)
    #[serde(skip_serializing_if = "Option::is_none")]
    pub path: Option<PathBuf>,

    /// Reject writes once the store holds more than this many bytes
    #[serde(skip_serializing_if = "Option::is_none")]
    pub quota_bytes: Option<usize>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct SearchConfig {
    /// Fewest listings a mock search returns
    pub min_results: usize,

    /// Most listings a mock search returns
    pub max_results: usize,

    /// Pause before showing results, to feel like a network call
    pub simulated_latency_ms: u64,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct LoggingConfig {
    /// Filter directive, e.g. "warn" or "jobscout=debug". RUST_LOG wins if set.
    pub level: String,
}

impl Default for HistoryConfig {
    fn default() -> Self {
        Self {
            max_items: DEFAULT_MAX_HISTORY_ITEMS,
        }
    }
}

impl Default for SearchConfig {
    fn default() -> Self {
        Self {
            min_results: 5,
            max_results: 12,
            simulated_latency_ms: 1000,
        }
    }
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: "warn".to_string(),
        }
    }
}

impl Config {
    /// Load config from the default location
    pub fn load() -> Result<Self> {
        let config_path = Self::get_config_path()?;

        if !config_path.exists() {
            // Create default config if it doesn't exist
            let default_config = Self::default();
            default_config.save()?;
            return Ok(default_config);
        }

        let contents = fs::read_to_string(&config_path)?;
        Self::from_toml(&contents)
    }

    pub fn from_toml(contents: &str) -> Result<Self> {
        let config: Config = toml::from_str(contents)?;
        Ok(config)
    }

    /// Save config to the default location
    pub fn save(&self) -> Result<()> {
        let config_path = Self::get_config_path()?;

        // Ensure parent directory exists
        if let Some(parent) = config_path.parent() {
            fs::create_dir_all(parent)?;
        }

        let contents = toml::to_string_pretty(self)?;
        fs::write(&config_path, contents)?;

        Ok(())
    }

    /// Get the default config file path
    pub fn get_config_path() -> Result<PathBuf> {
        let config_dir = dirs::config_dir()
            .ok_or_else(|| anyhow::anyhow!("Could not determine config directory"))?;

        Ok(config_dir.join("jobscout").join("config.toml"))
    }

    /// Create a default config file with comments
    pub fn create_default_with_comments() -> String {
        r#"# Jobscout Configuration File
# Location: ~/.config/jobscout/config.toml (Linux)
#           ~/Library/Application Support/jobscout/config.toml (macOS)
#           %APPDATA%\jobscout\config.toml (Windows)

[history]
# Number of recent searches to remember
max_items = 5

[storage]
# Store file (leave commented to use the platform data directory)
# path = "/path/to/store.json"

# Refuse writes once the store would exceed this many bytes
# quota_bytes = 5242880

[search]
# Range of listings a mock search returns
min_results = 5
max_results = 12

# Artificial delay before results are shown
simulated_latency_ms = 1000

[logging]
# Log filter, e.g. "warn", "info", "jobscout=debug"
# The RUST_LOG environment variable takes precedence
level = "warn"
"#
        .to_string()
    }
}
