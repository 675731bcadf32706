//! Utility modules

pub mod config;

pub use config::{load_config, ConfigError, PipelineConfig};
