pub mod flushable;
pub mod pool;
pub mod ring;

pub use flushable::FlushableBuffer;
pub use pool::{PoolStats, SampleBufferPool};
pub use ring::RingBuffer;

/// Interleaved PCM sample buffer passed between streams and the mixer.
pub type PcmBuffer = Vec<i16>;

/// Pool of interleaved PCM buffers.
pub type PcmPool = SampleBufferPool<i16>;
