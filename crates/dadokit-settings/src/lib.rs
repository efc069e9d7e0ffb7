//! # DadoKit Settings
//!
//! Job configuration for DadoKit: the joint dimensions to cut and the
//! working unit context, loaded from and saved to TOML or JSON files.

pub mod config;
pub mod error;

pub use config::{default_config_path, ContextSettings, DimensionSetting, JobConfig, JointSettings};
pub use error::{ConfigError, SettingsError, SettingsResult};
