//! `stream/mod.rs` — per-source stream abstraction.
//!
//! A stream composes one backing buffer with one codec and exposes the
//! capability pair `{read_pcm, write_pcm}`. Each variant implements the side
//! its codec supports and fails the other with `UnsupportedOperation`:
//!
//! | Stream | Backing buffer | `read_pcm` | `write_pcm` |
//! |---|---|---|---|
//! | [`DecodingStream`] | PCM ring or flushable accumulator | yes | — |
//! | [`EncodingStream`] | ring of encoded bytes | — | yes |
//! | [`G711Stream`] | ring of encoded bytes, expanded on read | yes | — |

pub mod decoding;
pub mod encoding;
pub mod g711;
pub mod sink;

pub use decoding::DecodingStream;
pub use encoding::EncodingStream;
pub use g711::G711Stream;
pub use sink::{BoxedSink, SinkSlot};

use std::sync::Arc;

use crate::audio::buffer::{PcmBuffer, PcmPool};
use crate::audio::frame::FrameSpec;
use crate::common::errors::{MuxError, Result};

/// Where a buffer shorter than the mix window sits inside it.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Alignment {
    /// Samples occupy the head of the window; the tail is silence.
    Start,
    /// Samples occupy the tail of the window; the head is silence.
    End,
}

pub trait Stream: Send + Sync {
    fn id(&self) -> &str;

    fn frame(&self) -> FrameSpec;

    /// Drain up to `dst.len()` decoded samples.
    fn read_pcm(&self, dst: &mut [i16]) -> Result<usize>;

    /// Hand PCM to the stream for encoding.
    fn write_pcm(&self, src: &[i16]) -> Result<usize>;

    /// Feed one encoded payload into the stream.
    fn write(&self, _payload: &[u8]) -> Result<usize> {
        Err(MuxError::UnsupportedOperation(
            "stream doesn't accept encoded payloads",
        ))
    }

    /// Decode one payload without buffering it. The returned buffer comes
    /// from the stream's pool.
    fn decode(&self, _payload: &[u8]) -> Result<PcmBuffer> {
        Err(MuxError::UnsupportedOperation(
            "stream doesn't support decoding",
        ))
    }

    /// Append already-decoded PCM to the backing buffer.
    fn accept_pcm(&self, _pcm: &[i16]) -> Result<usize> {
        Err(MuxError::UnsupportedOperation(
            "stream doesn't buffer decoded pcm",
        ))
    }

    /// Attach the bind-once output sink.
    fn connect(&self, _sink: BoxedSink) -> Result<()> {
        Err(MuxError::UnsupportedOperation("stream doesn't support sinks"))
    }

    fn alignment(&self) -> Alignment {
        Alignment::Start
    }

    /// Everything this stream contributes to one mix cycle.
    ///
    /// The default reads at most `frame_len` samples into a pooled scratch
    /// buffer. The caller returns the buffer to `pool` when done.
    fn take_pcm(&self, frame_len: usize, pool: &PcmPool) -> Result<PcmBuffer> {
        read_into_scratch(self, frame_len, pool)
    }
}

/// Shared handle to any stream variant.
pub type SharedStream = Arc<dyn Stream>;

pub(crate) fn read_into_scratch<S: Stream + ?Sized>(
    stream: &S,
    frame_len: usize,
    pool: &PcmPool,
) -> Result<PcmBuffer> {
    let mut buf = pool.acquire_filled(frame_len);
    match stream.read_pcm(&mut buf) {
        Ok(n) => {
            buf.truncate(n);
            Ok(buf)
        }
        Err(e) => {
            pool.release(buf);
            Err(e)
        }
    }
}
