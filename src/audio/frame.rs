use crate::common::errors::{MuxError, Result};

/// Frame geometry of a stream: rate, channel count and frame duration.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FrameSpec {
    sample_rate: u32,
    channels: usize,
    duration_ms: u32,
}

impl FrameSpec {
    /// Validate a geometry. The interleaved frame must hold a whole, non-zero
    /// number of samples.
    pub fn new(sample_rate: u32, duration_ms: u32, channels: usize) -> Result<Self> {
        let invalid = MuxError::InvalidFrame {
            sample_rate,
            duration_ms,
            channels,
        };
        let product = (channels as u64) * (duration_ms as u64) * (sample_rate as u64);
        if product == 0 || product % 1000 != 0 {
            return Err(invalid);
        }
        Ok(Self {
            sample_rate,
            channels,
            duration_ms,
        })
    }

    pub fn sample_rate(&self) -> u32 {
        self.sample_rate
    }

    pub fn channels(&self) -> usize {
        self.channels
    }

    pub fn duration_ms(&self) -> u32 {
        self.duration_ms
    }

    /// Interleaved samples in one frame: `channels * duration_ms * sample_rate / 1000`.
    pub fn samples(&self) -> usize {
        (self.channels as u64 * self.duration_ms as u64 * self.sample_rate as u64 / 1000) as usize
    }

    /// Samples per channel in one frame.
    pub fn samples_per_channel(&self) -> usize {
        self.samples() / self.channels
    }

    /// Interleaved frame size of a 16-bit stream, in bytes.
    pub fn bytes(&self) -> usize {
        self.samples() * 2
    }
}
