//! Engine settings file format and operations.

use serde::{Deserialize, Serialize};
use std::path::Path;

use cvbus_core::{BufferMode, PortFlow, PortKind, Router, StreamPort};

use crate::error::ConfigError;
use crate::validation::{ValidationResult, validate_config};

/// Storage strategy for streaming ports, as written in settings files.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum StreamBufferMode {
    /// Two-block ring with dual-latency reads.
    #[default]
    Ring,
    /// One-block sliding window.
    Window,
}

impl From<StreamBufferMode> for BufferMode {
    fn from(mode: StreamBufferMode) -> Self {
        match mode {
            StreamBufferMode::Ring => BufferMode::Ring,
            StreamBufferMode::Window => BufferMode::Window,
        }
    }
}

impl From<BufferMode> for StreamBufferMode {
    fn from(mode: BufferMode) -> Self {
        match mode {
            BufferMode::Ring => StreamBufferMode::Ring,
            BufferMode::Window => StreamBufferMode::Window,
        }
    }
}

/// Engine settings.
///
/// Every field is optional in the file and falls back to its default.
///
/// # TOML Format
///
/// ```toml
/// sample_rate = 48000
/// block_size = 256
/// buffer_mode = "ring"
/// queue_capacity = 256
/// ```
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct EngineConfig {
    /// Sample rate in Hz.
    pub sample_rate: u32,

    /// Largest block rendered per call, in samples.
    pub block_size: usize,

    /// Storage strategy for streaming ports.
    pub buffer_mode: StreamBufferMode,

    /// Capacity of the routing command and event queues.
    pub queue_capacity: usize,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            sample_rate: 48000,
            block_size: 256,
            buffer_mode: StreamBufferMode::Ring,
            queue_capacity: 256,
        }
    }
}

impl EngineConfig {
    /// Load settings from a TOML file.
    ///
    /// The file is parsed but not validated; call [`validate`](Self::validate).
    pub fn load(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        let content =
            std::fs::read_to_string(path).map_err(|e| ConfigError::read_file(path, e))?;
        Self::from_toml_str(&content)
    }

    /// Load settings from a TOML file and validate them.
    pub fn load_validated(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let config = Self::load(path)?;
        config.validate()?;
        Ok(config)
    }

    /// Save settings to a TOML file, creating parent directories if needed.
    pub fn save(&self, path: impl AsRef<Path>) -> Result<(), ConfigError> {
        let path = path.as_ref();
        if let Some(parent) = path.parent()
            && !parent.as_os_str().is_empty()
        {
            std::fs::create_dir_all(parent).map_err(|e| ConfigError::write_file(parent, e))?;
        }
        let content = self.to_toml_string()?;
        std::fs::write(path, content).map_err(|e| ConfigError::write_file(path, e))
    }

    /// Parse settings from a TOML string.
    pub fn from_toml_str(s: &str) -> Result<Self, ConfigError> {
        Ok(toml::from_str(s)?)
    }

    /// Serialize settings to a TOML string.
    pub fn to_toml_string(&self) -> Result<String, ConfigError> {
        Ok(toml::to_string_pretty(self)?)
    }

    /// Check every rule; see [`validation`](crate::validation).
    pub fn validate(&self) -> ValidationResult<()> {
        validate_config(self)
    }

    /// Returns the core buffer mode.
    pub fn buffer_mode(&self) -> BufferMode {
        self.buffer_mode.into()
    }

    /// Returns the duration of one full block, in seconds.
    pub fn block_duration(&self) -> f64 {
        self.block_size as f64 / f64::from(self.sample_rate)
    }

    /// Creates an empty router sized for the configured block.
    pub fn build_router(&self) -> Router {
        Router::new(self.block_size)
    }

    /// Creates a streaming port with the configured mode and block size.
    ///
    /// # Panics
    ///
    /// Panics in ring mode if the block size is not a power of two; validate
    /// first.
    pub fn stream_port(&self, flow: PortFlow, kind: PortKind) -> StreamPort {
        StreamPort::new(flow, kind, self.buffer_mode(), self.block_size)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_file_is_all_defaults() {
        let config = EngineConfig::from_toml_str("").unwrap();
        assert_eq!(config, EngineConfig::default());
    }

    #[test]
    fn partial_file_keeps_other_defaults() {
        let config =
            EngineConfig::from_toml_str("block_size = 64\nbuffer_mode = \"window\"").unwrap();
        assert_eq!(config.block_size, 64);
        assert_eq!(config.buffer_mode, StreamBufferMode::Window);
        assert_eq!(config.sample_rate, 48000);
        assert_eq!(config.queue_capacity, 256);
    }

    #[test]
    fn unknown_buffer_mode_is_a_parse_error() {
        let err = EngineConfig::from_toml_str("buffer_mode = \"tape\"").unwrap_err();
        assert!(matches!(err, ConfigError::TomlParse(_)));
    }

    #[test]
    fn toml_string_round_trip() {
        let config = EngineConfig {
            sample_rate: 96000,
            block_size: 512,
            buffer_mode: StreamBufferMode::Window,
            queue_capacity: 32,
        };
        let toml = config.to_toml_string().unwrap();
        assert!(toml.contains("buffer_mode = \"window\""));
        assert_eq!(EngineConfig::from_toml_str(&toml).unwrap(), config);
    }

    #[test]
    fn buffer_mode_maps_to_core() {
        assert_eq!(BufferMode::from(StreamBufferMode::Ring), BufferMode::Ring);
        assert_eq!(
            StreamBufferMode::from(BufferMode::Window),
            StreamBufferMode::Window
        );
    }

    #[test]
    fn builds_router_and_ports() {
        let config = EngineConfig {
            block_size: 64,
            ..EngineConfig::default()
        };
        assert_eq!(config.build_router().block_size(), 64);
        let port = config.stream_port(PortFlow::Input, PortKind::Cv);
        assert_eq!(port.buffer().mode(), BufferMode::Ring);
        assert_eq!(port.buffer().block_size(), 64);
        assert!((config.block_duration() - 64.0 / 48000.0).abs() < 1e-12);
    }
}
