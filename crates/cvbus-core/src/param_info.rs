//! Parameter-info capability for the legacy parameter path.
//!
//! Plugins that predate typed CV ports expose their parameters as raw integers
//! in a declared range. A [`ParamDescriptor`] carries that range and converts
//! between the raw integer and the normalized \[0.0, 1.0\] float the routing
//! core accumulates:
//!
//! - [`normalize`](ParamDescriptor::normalize): raw → 0..1, used by sources
//! - [`scale`](ParamDescriptor::scale): 0..1 → raw, used by targets
//!
//! # Example
//!
//! ```rust
//! use cvbus_core::ParamDescriptor;
//!
//! let velocity = ParamDescriptor::new(0, 127, 64);
//! assert_eq!(velocity.normalize(127), 1.0);
//! assert_eq!(velocity.scale(0.5), 64);
//! ```
//!
//! # no_std Support
//!
//! This module is fully `no_std` compatible with no heap allocations required.

/// Scaling curve between the raw range and normalized space.
///
/// # Normalization Formulas
///
/// - **Linear**: `normalized = (value - min) / (max - min)`
/// - **Logarithmic**: `normalized = ln(value/min) / ln(max/min)`
/// - **Power(exp)**: `normalized = ((value - min) / (max - min)).powf(1.0 / exp)`
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub enum ParamScale {
    /// Linear mapping (default). Equal resolution across the range.
    #[default]
    Linear,
    /// Logarithmic mapping. Requires `min > 0`.
    Logarithmic,
    /// Power curve mapping with the given exponent.
    /// exponent < 1.0 → more resolution at low end.
    /// exponent > 1.0 → more resolution at high end.
    Power(f32),
}

/// Range and curve of one raw integer parameter.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ParamDescriptor {
    /// Smallest raw value.
    pub min: i32,
    /// Largest raw value.
    pub max: i32,
    /// Raw value on initialization.
    pub default: i32,
    /// Normalization curve.
    pub scale: ParamScale,
}

impl ParamDescriptor {
    /// Linear descriptor over `min..=max`.
    pub const fn new(min: i32, max: i32, default: i32) -> Self {
        Self {
            min,
            max,
            default,
            scale: ParamScale::Linear,
        }
    }

    /// Replaces the normalization curve.
    pub const fn with_scale(mut self, scale: ParamScale) -> Self {
        self.scale = scale;
        self
    }

    /// Clamps a raw value to `min..=max`.
    #[inline]
    pub fn clamp(&self, value: i32) -> i32 {
        value.clamp(self.min, self.max.max(self.min))
    }

    /// Converts a raw value to normalized range (0.0 to 1.0).
    ///
    /// Out-of-range values are clamped first. A zero-width range normalizes to 0.
    ///
    /// ```rust
    /// use cvbus_core::ParamDescriptor;
    ///
    /// let desc = ParamDescriptor::new(0, 100, 50);
    /// assert_eq!(desc.normalize(0), 0.0);
    /// assert_eq!(desc.normalize(50), 0.5);
    /// assert_eq!(desc.normalize(200), 1.0);
    /// ```
    #[inline]
    pub fn normalize(&self, raw: i32) -> f32 {
        let min = self.min as f32;
        let max = self.max as f32;
        let range = max - min;
        if range <= 0.0 {
            return 0.0;
        }
        let value = self.clamp(raw) as f32;
        match self.scale {
            ParamScale::Linear => (value - min) / range,
            ParamScale::Logarithmic => {
                if min <= 0.0 || value <= 0.0 {
                    return 0.0;
                }
                libm::logf(value / min) / libm::logf(max / min)
            }
            ParamScale::Power(exp) => {
                let linear = (value - min) / range;
                libm::powf(linear, 1.0 / exp)
            }
        }
    }

    /// Converts a normalized value back to the raw range.
    ///
    /// Inverse of [`normalize`](Self::normalize). The input is clamped to
    /// \[0.0, 1.0\] and the result rounded to the nearest integer.
    ///
    /// ```rust
    /// use cvbus_core::ParamDescriptor;
    ///
    /// let desc = ParamDescriptor::new(0, 100, 50);
    /// assert_eq!(desc.scale(0.25), 25);
    /// assert_eq!(desc.scale(2.0), 100);
    /// ```
    #[inline]
    pub fn scale(&self, normalized: f32) -> i32 {
        let min = self.min as f32;
        let max = self.max as f32;
        let n = normalized.clamp(0.0, 1.0);
        let plain = match self.scale {
            ParamScale::Linear => min + n * (max - min),
            ParamScale::Logarithmic => {
                if min <= 0.0 {
                    return self.min;
                }
                min * libm::powf(max / min, n)
            }
            ParamScale::Power(exp) => min + libm::powf(n, exp) * (max - min),
        };
        self.clamp(libm::roundf(plain) as i32)
    }
}

impl Default for ParamDescriptor {
    fn default() -> Self {
        Self::new(0, 127, 0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn linear_round_trip_reproduces_every_raw_value() {
        let desc = ParamDescriptor::new(-64, 63, 0);
        for raw in -64..=63 {
            assert_eq!(desc.scale(desc.normalize(raw)), raw, "raw={raw}");
        }
    }

    #[test]
    fn normalize_clamps_out_of_range() {
        let desc = ParamDescriptor::new(10, 20, 15);
        assert_eq!(desc.normalize(0), 0.0);
        assert_eq!(desc.normalize(99), 1.0);
    }

    #[test]
    fn scale_clamps_out_of_range() {
        let desc = ParamDescriptor::new(10, 20, 15);
        assert_eq!(desc.scale(-1.0), 10);
        assert_eq!(desc.scale(1.5), 20);
    }

    #[test]
    fn zero_range_normalizes_to_zero() {
        let desc = ParamDescriptor::new(5, 5, 5);
        assert_eq!(desc.normalize(5), 0.0);
        assert_eq!(desc.scale(0.7), 5);
    }

    #[test]
    fn logarithmic_endpoints_and_midpoint() {
        let desc = ParamDescriptor::new(20, 20000, 1000).with_scale(ParamScale::Logarithmic);
        assert!(desc.normalize(20).abs() < 1e-6);
        assert!((desc.normalize(20000) - 1.0).abs() < 1e-6);
        // Geometric mean of 20 and 20000 sits at the midpoint.
        assert!((desc.normalize(632) - 0.5).abs() < 1e-3);
        assert_eq!(desc.scale(0.0), 20);
        assert_eq!(desc.scale(1.0), 20000);
    }

    #[test]
    fn power_curve_is_inverse() {
        let desc = ParamDescriptor::new(0, 1000, 0).with_scale(ParamScale::Power(2.0));
        assert!((desc.normalize(250) - 0.5).abs() < 1e-6);
        assert_eq!(desc.scale(0.5), 250);
    }
}
