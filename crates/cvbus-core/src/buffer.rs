//! Sample storage behind streaming ports.
//!
//! A streaming port is written once per block by its producer and read once
//! per block by its consumer. Whether the consumer runs before or after the
//! producer in the host's schedule is outside our control, so the storage
//! offers two reads:
//!
//! - `delay_frame = false`: the block most recently completed by the writer.
//!   Correct when the reader runs *after* the writer in this block.
//! - `delay_frame = true`: the block before that. One block of extra latency,
//!   required when the reader runs *before* the writer.
//!
//! [`BasicRb`] implements both reads with a two-block ring. [`BasicBuf`] is a
//! one-block sliding window that always represents "now" and ignores the
//! delay flag. [`PortBuffer`] selects between them at construction.
//!
//! Neither type knows anything about plugins.

#[cfg(not(feature = "std"))]
use alloc::vec;
#[cfg(not(feature = "std"))]
use alloc::vec::Vec;

/// Storage strategy for a streaming port.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Default)]
pub enum BufferMode {
    /// Two-block ring with dual-latency reads ([`BasicRb`]).
    #[default]
    Ring,
    /// One-block sliding window ([`BasicBuf`]).
    Window,
}

/// Two-block ring buffer with dual-latency reads.
///
/// Holds `2 × block_size` samples. The size is a power of two so indices wrap
/// with a mask.
#[derive(Debug, Clone)]
pub struct BasicRb {
    data: Vec<f32>,
    mask: usize,
    block_size: usize,
    write_index: usize,
}

impl BasicRb {
    /// Creates a zeroed ring for the given block size.
    ///
    /// # Panics
    ///
    /// Panics if `block_size` is not a power of two.
    pub fn new(block_size: usize) -> Self {
        assert!(
            block_size.is_power_of_two(),
            "ring buffer block size must be a power of two, got {block_size}"
        );
        let size = block_size * 2;
        Self {
            data: vec![0.0; size],
            mask: size - 1,
            block_size,
            write_index: 0,
        }
    }

    /// Returns the block size.
    #[inline]
    pub fn block_size(&self) -> usize {
        self.block_size
    }

    /// Returns the total capacity in samples (`2 × block_size`).
    #[inline]
    pub fn capacity(&self) -> usize {
        self.data.len()
    }

    /// Returns the position the next write starts at.
    #[inline]
    pub fn write_index(&self) -> usize {
        self.write_index
    }

    /// Appends `src` at the write index, wrapping around the end.
    ///
    /// # Panics
    ///
    /// Panics if `src` is longer than the ring.
    pub fn write(&mut self, src: &[f32]) {
        let n = src.len();
        let size = self.data.len();
        assert!(n <= size, "write of {n} samples exceeds ring of {size}");
        let first = n.min(size - self.write_index);
        self.data[self.write_index..self.write_index + first].copy_from_slice(&src[..first]);
        self.data[..n - first].copy_from_slice(&src[first..]);
        self.write_index = (self.write_index + n) & self.mask;
    }

    /// Start index of a read for the given latency mode.
    #[inline]
    pub fn read_index(&self, delay_frame: bool) -> usize {
        let offset = if delay_frame { 0 } else { self.block_size };
        (self.write_index + offset) & self.mask
    }

    /// Copies `dest.len()` samples of the selected block into `dest`.
    ///
    /// The copy is split across the wrap boundary when needed.
    ///
    /// # Panics
    ///
    /// Panics if `dest` is longer than the ring.
    pub fn read(&self, dest: &mut [f32], delay_frame: bool) {
        let n = dest.len();
        let size = self.data.len();
        assert!(n <= size, "read of {n} samples exceeds ring of {size}");
        let start = self.read_index(delay_frame);
        let first = n.min(size - start);
        dest[..first].copy_from_slice(&self.data[start..start + first]);
        dest[first..].copy_from_slice(&self.data[..n - first]);
    }

    /// Returns the most recently written sample.
    #[inline]
    pub fn latest(&self) -> f32 {
        self.data[(self.write_index + self.mask) & self.mask]
    }

    /// Zeroes the ring and rewinds the write index.
    pub fn clear(&mut self) {
        self.data.fill(0.0);
        self.write_index = 0;
    }
}

/// One-block sliding window that always represents the current block.
///
/// Writes shift the window left and append; reads return the newest samples.
/// The delay flag is accepted for interface parity and ignored.
#[derive(Debug, Clone)]
pub struct BasicBuf {
    data: Vec<f32>,
}

impl BasicBuf {
    /// Creates a zeroed window of `block_size` samples.
    pub fn new(block_size: usize) -> Self {
        Self {
            data: vec![0.0; block_size],
        }
    }

    /// Returns the window length.
    #[inline]
    pub fn block_size(&self) -> usize {
        self.data.len()
    }

    /// Shifts the window left by `src.len()` and appends `src`.
    ///
    /// # Panics
    ///
    /// Panics if `src` is longer than the window.
    pub fn write(&mut self, src: &[f32]) {
        let n = src.len();
        let len = self.data.len();
        assert!(n <= len, "write of {n} samples exceeds window of {len}");
        self.data.copy_within(n.., 0);
        self.data[len - n..].copy_from_slice(src);
    }

    /// Copies the newest `dest.len()` samples into `dest`.
    ///
    /// # Panics
    ///
    /// Panics if `dest` is longer than the window.
    pub fn read(&self, dest: &mut [f32], _delay_frame: bool) {
        let n = dest.len();
        let len = self.data.len();
        assert!(n <= len, "read of {n} samples exceeds window of {len}");
        dest.copy_from_slice(&self.data[len - n..]);
    }

    /// Returns the most recently written sample.
    #[inline]
    pub fn latest(&self) -> f32 {
        self.data.last().copied().unwrap_or(0.0)
    }

    /// Zeroes the window.
    pub fn clear(&mut self) {
        self.data.fill(0.0);
    }
}

/// Storage behind one streaming port.
#[derive(Debug, Clone)]
pub enum PortBuffer {
    /// Dual-latency ring.
    Ring(BasicRb),
    /// Sliding window.
    Window(BasicBuf),
}

impl PortBuffer {
    /// Creates storage of the given mode.
    ///
    /// # Panics
    ///
    /// Panics in [`BufferMode::Ring`] if `block_size` is not a power of two.
    pub fn new(mode: BufferMode, block_size: usize) -> Self {
        match mode {
            BufferMode::Ring => Self::Ring(BasicRb::new(block_size)),
            BufferMode::Window => Self::Window(BasicBuf::new(block_size)),
        }
    }

    /// Returns the storage mode.
    pub fn mode(&self) -> BufferMode {
        match self {
            Self::Ring(_) => BufferMode::Ring,
            Self::Window(_) => BufferMode::Window,
        }
    }

    /// Returns the block size.
    #[inline]
    pub fn block_size(&self) -> usize {
        match self {
            Self::Ring(rb) => rb.block_size(),
            Self::Window(buf) => buf.block_size(),
        }
    }

    /// Writes one block (or part of one).
    #[inline]
    pub fn write(&mut self, src: &[f32]) {
        match self {
            Self::Ring(rb) => rb.write(src),
            Self::Window(buf) => buf.write(src),
        }
    }

    /// Reads into `dest`; see the module docs for `delay_frame`.
    #[inline]
    pub fn read(&self, dest: &mut [f32], delay_frame: bool) {
        match self {
            Self::Ring(rb) => rb.read(dest, delay_frame),
            Self::Window(buf) => buf.read(dest, delay_frame),
        }
    }

    /// Returns the most recently written sample.
    #[inline]
    pub fn latest(&self) -> f32 {
        match self {
            Self::Ring(rb) => rb.latest(),
            Self::Window(buf) => buf.latest(),
        }
    }

    /// Zeroes the storage.
    pub fn clear(&mut self) {
        match self {
            Self::Ring(rb) => rb.clear(),
            Self::Window(buf) => buf.clear(),
        }
    }
}
