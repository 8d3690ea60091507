//! Configuration module for tablesim.
//!
//! Handles the TOML settings file and fingerprinting of the effective
//! engine configuration.

mod fingerprint;
mod settings;

pub use fingerprint::{compute_hash, config_fingerprint};
pub use settings::{
    DriverSettings, EngineSettings, Settings, SettingsError, WeightSettings, CONFIG_ENV_VAR,
};
