//! TOML-based configuration for tablesim.
//!
//! Every section is optional; anything left out keeps its default.
//!
//! Example configuration:
//! ```toml
//! [thresholds]
//! column = 0.8
//! pruning = 0.8
//! final = 0.6
//!
//! [engine]
//! use_embeddings = true
//!
//! [weights.column]
//! name = 0.4
//! description = 0.2
//! datatype = 0.2
//! values = 0.1
//! embedding = 0.3
//! infotype = 0.1
//!
//! [driver]
//! embedding_batch_size = 128
//! threads = 8
//! ```
//!
//! A `[weights.*]` table replaces the defaults of its family as a whole, so
//! it must list every signal of that family.

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::env;
use std::fs;
use std::path::{Path, PathBuf};

use crate::error::ConfigError;
use crate::similarity::{
    default_column_weights, default_pruning_weights, SimilarityConfig, Thresholds,
};

/// Environment variable naming a config file.
pub const CONFIG_ENV_VAR: &str = "TABLESIM_CONFIG";

/// Error type for settings.
#[derive(Debug, thiserror::Error)]
pub enum SettingsError {
    #[error("Config file not found: {0}")]
    FileNotFound(PathBuf),

    #[error("Failed to read config file: {0}")]
    ReadError(#[from] std::io::Error),

    #[error("Failed to parse config file: {0}")]
    ParseError(#[from] toml::de::Error),

    #[error("Invalid configuration: {0}")]
    Invalid(#[from] ConfigError),
}

/// Root configuration structure.
#[derive(Debug, Clone, Default, PartialEq, Deserialize, Serialize)]
#[serde(default)]
pub struct Settings {
    pub thresholds: Thresholds,
    pub engine: EngineSettings,
    pub weights: WeightSettings,
    pub driver: DriverSettings,
}

/// Default switches for `check_similarity`.
#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
#[serde(default)]
pub struct EngineSettings {
    /// Run the pruning pass only when called directly.
    pub pruning_mode: bool,

    /// Consult column embeddings in the detailed pass.
    pub use_embeddings: bool,
}

impl Default for EngineSettings {
    fn default() -> Self {
        Self {
            pruning_mode: true,
            use_embeddings: false,
        }
    }
}

/// Signal weights per family.
#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
#[serde(default)]
pub struct WeightSettings {
    pub column: BTreeMap<String, f64>,
    pub pruning: BTreeMap<String, f64>,
}

impl Default for WeightSettings {
    fn default() -> Self {
        Self {
            column: default_column_weights(),
            pruning: default_pruning_weights(),
        }
    }
}

/// Batch driver settings.
#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
#[serde(default)]
pub struct DriverSettings {
    /// Columns per embedding provider call.
    pub embedding_batch_size: usize,

    /// Worker threads for the pair sweeps; 0 uses one per core.
    pub threads: usize,
}

impl Default for DriverSettings {
    fn default() -> Self {
        Self {
            embedding_batch_size: 64,
            threads: 0,
        }
    }
}

impl Settings {
    /// Load settings from a TOML file.
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self, SettingsError> {
        let path = path.as_ref();
        if !path.exists() {
            return Err(SettingsError::FileNotFound(path.to_path_buf()));
        }

        let content = fs::read_to_string(path)?;
        let settings: Settings = toml::from_str(&content)?;
        Ok(settings)
    }

    /// Load settings from the default config file locations.
    ///
    /// Searches in order:
    /// 1. Environment variable `TABLESIM_CONFIG`
    /// 2. `./tablesim.toml`
    /// 3. `~/.config/tablesim/config.toml`
    pub fn load() -> Result<Self, SettingsError> {
        if let Ok(path) = env::var(CONFIG_ENV_VAR) {
            return Self::from_file(&path);
        }

        let local_config = PathBuf::from("tablesim.toml");
        if local_config.exists() {
            return Self::from_file(&local_config);
        }

        if let Some(config_dir) = dirs::config_dir() {
            let user_config = config_dir.join("tablesim").join("config.toml");
            if user_config.exists() {
                return Self::from_file(&user_config);
            }
        }

        Ok(Settings::default())
    }

    /// Engine configuration described by these settings.
    pub fn to_config(&self) -> Result<SimilarityConfig, SettingsError> {
        let config = SimilarityConfig {
            thresholds: self.thresholds,
            pruning_mode: self.engine.pruning_mode,
            use_embeddings: self.engine.use_embeddings,
            column_weights: self.weights.column.clone(),
            pruning_weights: self.weights.pruning.clone(),
        };
        config.validate()?;
        Ok(config)
    }

    /// Check every section, failing on the first problem.
    pub fn validate(&self) -> Result<(), SettingsError> {
        self.to_config()?;
        if self.driver.embedding_batch_size == 0 {
            return Err(ConfigError::InvalidBatchSize.into());
        }
        Ok(())
    }
}
