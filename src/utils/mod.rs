//! Configuration utilities

/// TOML configuration with environment overrides.
pub mod config;

pub use config::{LogFormat, LoggingConfig, ResearcherConfig, DEFAULT_CONFIG_FILE};
