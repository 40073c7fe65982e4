//! Central constants for the mixing core.
//!
//! Defaults for the config file and the fixed limits of the codec adapters
//! live here.

// ── Frame geometry ───────────────────────────────────────────────────────────

/// Default stream sample rate (Hz).
pub const DEFAULT_SAMPLE_RATE: u32 = 48_000;

/// Default interleaved channel count.
pub const DEFAULT_CHANNELS: usize = 2;

/// Default frame duration (ms); one decode/encode unit.
pub const DEFAULT_FRAME_DURATION_MS: u32 = 20;

/// Default ring capacity per stream, in frames (50 × 20 ms = 1 s).
pub const DEFAULT_RING_FRAMES: usize = 50;

// ── Codec ─────────────────────────────────────────────────────────────────────

/// Maximum decoded Opus frame size at 48 kHz: 120 ms → 5 760 samples/channel.
pub const MAX_OPUS_FRAME_SIZE: usize = 5_760;

/// Upper bound for one encoded packet (bytes).
pub const MAX_ENCODED_PACKET: usize = 4_000;

/// Encoded-byte ring capacity of an encoding stream, in packets.
pub const ENCODED_RING_PACKETS: usize = 16;

// ── Sample buffer pool ────────────────────────────────────────────────────────

/// Maximum buffers parked in the free list.
pub const MAX_POOL_ENTRIES: usize = 64;

/// Buffers with a larger capacity (elements) are dropped instead of pooled.
pub const POOL_RETAIN_CEILING: usize = 8_184;

/// Idle duration before the pool is evicted (seconds).
pub const POOL_IDLE_CLEAR_SECS: u64 = 180;
