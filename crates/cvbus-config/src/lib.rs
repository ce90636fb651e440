//! Engine settings for cvbus.
//!
//! This crate holds the one file format of the project: the engine settings
//! TOML (sample rate, block size, streaming buffer mode, queue capacity).
//! Routing graphs are built at runtime and never persisted.
//!
//! # Example
//!
//! ```rust,no_run
//! use cvbus_config::EngineConfig;
//!
//! let config = EngineConfig::load("engine.toml").unwrap();
//! config.validate().unwrap();
//!
//! let router = config.build_router();
//! assert_eq!(router.block_size(), config.block_size);
//! ```

mod engine_config;
mod error;

/// Engine settings validation.
pub mod validation;

pub use engine_config::{EngineConfig, StreamBufferMode};
pub use error::ConfigError;
pub use validation::{
    MAX_BLOCK_SIZE, SAMPLE_RATE_RANGE, ValidationError, ValidationResult, validate_config,
};
