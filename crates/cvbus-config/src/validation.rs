//! Engine settings validation.
//!
//! Every rule is checked, and all failures are reported together.
//!
//! # Example
//!
//! ```rust
//! use cvbus_config::{EngineConfig, ValidationError};
//!
//! let config = EngineConfig {
//!     block_size: 100,
//!     ..EngineConfig::default()
//! };
//! assert_eq!(
//!     config.validate(),
//!     Err(ValidationError::BlockSizeNotPowerOfTwo(100))
//! );
//! ```

use thiserror::Error;

use crate::{EngineConfig, StreamBufferMode};

/// Largest accepted block size, in samples.
pub const MAX_BLOCK_SIZE: usize = 8192;

/// Accepted sample rates, in Hz.
pub const SAMPLE_RATE_RANGE: core::ops::RangeInclusive<u32> = 8_000..=384_000;

/// Validation error types.
#[derive(Debug, Error, Clone, PartialEq)]
pub enum ValidationError {
    /// Block size is zero.
    #[error("block size must be non-zero")]
    ZeroBlockSize,

    /// Ring buffers need a power-of-two block size.
    #[error("block size {0} is not a power of two (required by ring buffer mode)")]
    BlockSizeNotPowerOfTwo(usize),

    /// Block size above [`MAX_BLOCK_SIZE`].
    #[error("block size {size} exceeds maximum {max}")]
    BlockSizeTooLarge {
        /// Configured block size.
        size: usize,
        /// Largest accepted block size.
        max: usize,
    },

    /// Sample rate outside [`SAMPLE_RATE_RANGE`].
    #[error("sample rate {0} Hz out of range [8000, 384000]")]
    SampleRateOutOfRange(u32),

    /// Command queue capacity is zero.
    #[error("queue capacity must be non-zero")]
    ZeroQueueCapacity,

    /// Multiple validation errors.
    #[error("multiple validation errors: {}", .0.iter().map(|e| e.to_string()).collect::<Vec<_>>().join("; "))]
    Multiple(Vec<ValidationError>),
}

/// Result type for validation operations.
pub type ValidationResult<T> = Result<T, ValidationError>;

/// Checks every rule against `config`.
///
/// # Errors
///
/// The single failing rule, or [`ValidationError::Multiple`] if several fail.
pub fn validate_config(config: &EngineConfig) -> ValidationResult<()> {
    let mut errors = Vec::new();

    if config.block_size == 0 {
        errors.push(ValidationError::ZeroBlockSize);
    } else {
        if config.buffer_mode == StreamBufferMode::Ring && !config.block_size.is_power_of_two() {
            errors.push(ValidationError::BlockSizeNotPowerOfTwo(config.block_size));
        }
        if config.block_size > MAX_BLOCK_SIZE {
            errors.push(ValidationError::BlockSizeTooLarge {
                size: config.block_size,
                max: MAX_BLOCK_SIZE,
            });
        }
    }
    if !SAMPLE_RATE_RANGE.contains(&config.sample_rate) {
        errors.push(ValidationError::SampleRateOutOfRange(config.sample_rate));
    }
    if config.queue_capacity == 0 {
        errors.push(ValidationError::ZeroQueueCapacity);
    }

    match errors.len() {
        0 => Ok(()),
        1 => Err(errors.remove(0)),
        _ => Err(ValidationError::Multiple(errors)),
    }
}
