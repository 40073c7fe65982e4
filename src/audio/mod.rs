pub mod buffer;
pub mod codec;
pub mod constants;
pub mod engine;
pub mod frame;
pub mod mix;
pub mod stream;

pub use buffer::{FlushableBuffer, PcmBuffer, PcmPool, RingBuffer, SampleBufferPool};
pub use engine::{IngestPacket, Transcoder};
pub use frame::FrameSpec;
pub use mix::{Mixed, Multiplexer};
pub use stream::{SharedStream, Stream};
