use serde::{Deserialize, Serialize};

use crate::audio::constants::{
    DEFAULT_CHANNELS, DEFAULT_FRAME_DURATION_MS, DEFAULT_RING_FRAMES, DEFAULT_SAMPLE_RATE,
    MAX_POOL_ENTRIES, POOL_IDLE_CLEAR_SECS, POOL_RETAIN_CEILING,
};

/// Codec used for streams created through `Multiplexer::add_stream`.
#[derive(Debug, Deserialize, Serialize, Clone, Copy, Default, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum CodecKind {
    #[default]
    Opus,
    /// Little-endian signed 16-bit linear PCM.
    L16,
    Alaw,
    Ulaw,
}

/// How a decoding stream holds PCM between decode and mixdown.
#[derive(Debug, Deserialize, Serialize, Clone, Copy, Default, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum Buffering {
    /// Pull model: fixed-capacity ring, oldest samples overwritten.
    #[default]
    Ring,
    /// Push model: unbounded accumulator swapped out on every mix cycle.
    Flush,
}

#[derive(Debug, Deserialize, Serialize, Clone)]
pub struct MixerConfig {
    #[serde(default = "default_sample_rate")]
    pub sample_rate: u32,
    #[serde(default = "default_channels")]
    pub channels: usize,
    #[serde(default = "default_frame_duration_ms")]
    pub frame_duration_ms: u32,
    #[serde(default)]
    pub codec: CodecKind,
    #[serde(default)]
    pub buffering: Buffering,
    /// Ring capacity per stream, in frames.
    #[serde(default = "default_ring_frames")]
    pub ring_frames: usize,
}

impl Default for MixerConfig {
    fn default() -> Self {
        Self {
            sample_rate: default_sample_rate(),
            channels: default_channels(),
            frame_duration_ms: default_frame_duration_ms(),
            codec: CodecKind::default(),
            buffering: Buffering::default(),
            ring_frames: default_ring_frames(),
        }
    }
}

#[derive(Debug, Deserialize, Serialize, Clone)]
pub struct PoolConfig {
    #[serde(default = "default_max_entries")]
    pub max_entries: usize,
    /// Buffers whose capacity exceeds this many elements are dropped on release.
    #[serde(default = "default_retain_ceiling")]
    pub retain_ceiling: usize,
    #[serde(default = "default_idle_clear_secs")]
    pub idle_clear_secs: u64,
}

impl Default for PoolConfig {
    fn default() -> Self {
        Self {
            max_entries: default_max_entries(),
            retain_ceiling: default_retain_ceiling(),
            idle_clear_secs: default_idle_clear_secs(),
        }
    }
}

fn default_sample_rate() -> u32 {
    DEFAULT_SAMPLE_RATE
}

fn default_channels() -> usize {
    DEFAULT_CHANNELS
}

fn default_frame_duration_ms() -> u32 {
    DEFAULT_FRAME_DURATION_MS
}

fn default_ring_frames() -> usize {
    DEFAULT_RING_FRAMES
}

fn default_max_entries() -> usize {
    MAX_POOL_ENTRIES
}

fn default_retain_ceiling() -> usize {
    POOL_RETAIN_CEILING
}

fn default_idle_clear_secs() -> u64 {
    POOL_IDLE_CLEAR_SECS
}
