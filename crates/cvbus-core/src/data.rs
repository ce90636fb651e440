//! Per-target block accumulators.
//!
//! A [`Data`] collects every source's contribution to one target for one
//! block. Its shape follows the target's [`DataType`]:
//!
//! - [`ParamData`]: a single scalar for `LegacyParam` / `PortParam` targets
//! - [`StreamData`]: a one-block rolling window for `AudioStream` /
//!   `PortStream` targets
//!
//! Sources call `add` in insertion order. Addition is commutative, so the
//! result of a block does not depend on that order.
//!
//! Reading through the accessor of the wrong shape ([`Data::get`] on stream
//! data, [`Data::get_block`] on param data) is a programming error and panics.

#[cfg(not(feature = "std"))]
use alloc::vec;
#[cfg(not(feature = "std"))]
use alloc::vec::Vec;

use crate::data_type::DataType;

/// Scalar accumulator.
#[derive(Debug, Clone, PartialEq)]
pub struct ParamData {
    kind: DataType,
    block_size: usize,
    value: f32,
}

impl ParamData {
    /// Creates a zeroed accumulator.
    pub fn new(kind: DataType, block_size: usize) -> Self {
        Self {
            kind,
            block_size,
            value: 0.0,
        }
    }

    /// Zeroes the scalar for a new block.
    #[inline]
    pub fn reset(&mut self) {
        self.value = 0.0;
    }

    /// Sums one scalar contribution.
    #[inline]
    pub fn add(&mut self, value: f32) {
        self.value += value;
    }

    /// Downmixes a block to its mean absolute value and sums that.
    #[inline]
    pub fn add_block(&mut self, block: &[f32]) {
        if block.is_empty() {
            return;
        }
        let sum: f32 = block.iter().map(|s| s.abs()).sum();
        self.value += sum / block.len() as f32;
    }

    /// Returns the accumulated scalar.
    #[inline]
    pub fn get(&self) -> f32 {
        self.value
    }
}

/// One-block rolling window accumulator.
///
/// `reset(n)` keeps the newest `block_size - n` samples as history and opens
/// `n` zeroed samples at the tail. Contributions land in that tail.
#[derive(Debug, Clone, PartialEq)]
pub struct StreamData {
    kind: DataType,
    window: Vec<f32>,
    fresh: usize,
}

impl StreamData {
    /// Creates a zeroed window of `block_size` samples.
    pub fn new(kind: DataType, block_size: usize) -> Self {
        Self {
            kind,
            window: vec![0.0; block_size],
            fresh: 0,
        }
    }

    /// Shifts the window left by `n` and zero-fills the new tail.
    ///
    /// # Panics
    ///
    /// Panics if `n` exceeds the block size.
    #[inline]
    pub fn reset(&mut self, n: usize) {
        let len = self.window.len();
        assert!(n <= len, "block of {n} samples exceeds window of {len}");
        self.window.copy_within(n.., 0);
        self.window[len - n..].fill(0.0);
        self.fresh = n;
    }

    /// Adds a scalar to every sample of the current block.
    #[inline]
    pub fn add(&mut self, value: f32) {
        for s in self.tail_mut() {
            *s += value;
        }
    }

    /// Adds a block elementwise into the current block.
    ///
    /// Samples beyond the current block length are ignored.
    #[inline]
    pub fn add_block(&mut self, block: &[f32]) {
        for (dst, src) in self.tail_mut().iter_mut().zip(block.iter()) {
            *dst += *src;
        }
    }

    /// Returns the newest `n` samples.
    ///
    /// # Panics
    ///
    /// Panics if `n` exceeds the block size.
    #[inline]
    pub fn get_block(&self, n: usize) -> &[f32] {
        &self.window[self.window.len() - n..]
    }

    /// Returns the full window, oldest sample first.
    #[inline]
    pub fn window(&self) -> &[f32] {
        &self.window
    }

    #[inline]
    fn tail_mut(&mut self) -> &mut [f32] {
        let len = self.window.len();
        &mut self.window[len - self.fresh..]
    }
}

/// Accumulator for one target, shaped by its [`DataType`].
#[derive(Debug, Clone, PartialEq)]
pub enum Data {
    /// Scalar shape.
    Param(ParamData),
    /// Rolling-window shape.
    Stream(StreamData),
}

impl Data {
    /// Creates the accumulator matching `kind`.
    pub fn create(kind: DataType, block_size: usize) -> Self {
        if kind.is_stream() {
            Self::Stream(StreamData::new(kind, block_size))
        } else {
            Self::Param(ParamData::new(kind, block_size))
        }
    }

    /// Returns the representation this accumulator was created for.
    pub fn kind(&self) -> DataType {
        match self {
            Self::Param(d) => d.kind,
            Self::Stream(d) => d.kind,
        }
    }

    /// Returns true for the rolling-window shape.
    #[inline]
    pub fn is_stream(&self) -> bool {
        matches!(self, Self::Stream(_))
    }

    /// Returns the block size the accumulator was created with.
    pub fn block_size(&self) -> usize {
        match self {
            Self::Param(d) => d.block_size,
            Self::Stream(d) => d.window.len(),
        }
    }

    /// Prepares for a new block of `n` samples.
    ///
    /// # Panics
    ///
    /// Panics if `n` exceeds the block size.
    #[inline]
    pub fn reset(&mut self, n: usize) {
        match self {
            Self::Param(d) => {
                assert!(
                    n <= d.block_size,
                    "block of {n} samples exceeds block size {}",
                    d.block_size
                );
                d.reset();
            }
            Self::Stream(d) => d.reset(n),
        }
    }

    /// Accumulates one scalar contribution.
    #[inline]
    pub fn add(&mut self, value: f32) {
        match self {
            Self::Param(d) => d.add(value),
            Self::Stream(d) => d.add(value),
        }
    }

    /// Accumulates one block contribution.
    #[inline]
    pub fn add_block(&mut self, block: &[f32]) {
        match self {
            Self::Param(d) => d.add_block(block),
            Self::Stream(d) => d.add_block(block),
        }
    }

    /// Reads the finished scalar.
    ///
    /// # Panics
    ///
    /// Panics on stream-shaped data.
    #[inline]
    pub fn get(&self) -> f32 {
        match self {
            Self::Param(d) => d.get(),
            Self::Stream(d) => panic!("scalar read of stream data ({:?})", d.kind),
        }
    }

    /// Reads the newest `n` samples of the finished block.
    ///
    /// # Panics
    ///
    /// Panics on param-shaped data or if `n` exceeds the block size.
    #[inline]
    pub fn get_block(&self, n: usize) -> &[f32] {
        match self {
            Self::Stream(d) => d.get_block(n),
            Self::Param(d) => panic!("block read of param data ({:?})", d.kind),
        }
    }
}
