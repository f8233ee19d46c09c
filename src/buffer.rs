//! Sample Buffers
//!
//! The engine processes the host's multichannel buffer in place. [`AudioBuffer`]
//! is the narrow view it needs; [`ChannelBuffer`] is a planar implementation
//! for hosts, tests and benchmarks that don't bring their own.

use alloc::vec;
use alloc::vec::Vec;

/// Per-sample channel access to a host audio buffer
pub trait AudioBuffer {
    /// Number of channels available
    fn num_channels(&self) -> usize;

    /// Number of samples per channel
    fn num_samples(&self) -> usize;

    /// Read one sample; out-of-range reads return 0.0
    fn sample(&self, channel: usize, index: usize) -> f64;

    /// Write one sample; out-of-range writes are dropped
    fn set_sample(&mut self, channel: usize, index: usize, value: f64);
}

/// Planar multichannel buffer with a fixed capacity
///
/// Storage is allocated once in [`ChannelBuffer::new`]; nothing on the
/// processing path reallocates.
#[derive(Debug, Clone)]
pub struct ChannelBuffer {
    channels: Vec<Vec<f64>>,
    len: usize,
}

impl ChannelBuffer {
    /// Create a zeroed buffer with `channels` channels of `len` samples
    pub fn new(channels: usize, len: usize) -> Self {
        Self {
            channels: vec![vec![0.0; len]; channels],
            len,
        }
    }

    /// Create a buffer from existing channel data
    ///
    /// Channels shorter than the longest one are zero-padded.
    pub fn from_channels(mut channels: Vec<Vec<f64>>) -> Self {
        let len = channels.iter().map(Vec::len).max().unwrap_or(0);
        for channel in &mut channels {
            channel.resize(len, 0.0);
        }
        Self { channels, len }
    }

    /// Borrow one channel
    pub fn channel(&self, channel: usize) -> Option<&[f64]> {
        self.channels.get(channel).map(Vec::as_slice)
    }

    /// Borrow one channel mutably
    pub fn channel_mut(&mut self, channel: usize) -> Option<&mut [f64]> {
        self.channels.get_mut(channel).map(Vec::as_mut_slice)
    }

    /// Fill a whole channel with a constant value
    pub fn fill(&mut self, channel: usize, value: f64) {
        if let Some(samples) = self.channels.get_mut(channel) {
            samples.fill(value);
        }
    }

    /// Zero every channel
    pub fn clear(&mut self) {
        for samples in &mut self.channels {
            samples.fill(0.0);
        }
    }
}

impl AudioBuffer for ChannelBuffer {
    #[inline]
    fn num_channels(&self) -> usize {
        self.channels.len()
    }

    #[inline]
    fn num_samples(&self) -> usize {
        self.len
    }

    #[inline]
    fn sample(&self, channel: usize, index: usize) -> f64 {
        self.channels
            .get(channel)
            .and_then(|samples| samples.get(index))
            .copied()
            .unwrap_or(0.0)
    }

    #[inline]
    fn set_sample(&mut self, channel: usize, index: usize, value: f64) {
        if let Some(slot) = self
            .channels
            .get_mut(channel)
            .and_then(|samples| samples.get_mut(index))
        {
            *slot = value;
        }
    }
}
