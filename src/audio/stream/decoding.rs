//! `stream/decoding.rs` — payload → PCM stream.
//!
//! Decoded PCM lands in one of two backing buffers, picked by [`Buffering`]:
//! a fixed ring the mixer reads a frame at a time (pull model), or a
//! flushable accumulator the mixer swaps out whole (push model).

use std::sync::Arc;

use parking_lot::Mutex;
use tracing::trace;

use super::{Alignment, BoxedSink, SinkSlot, Stream, read_into_scratch};
use crate::audio::buffer::{FlushableBuffer, PcmBuffer, PcmPool, RingBuffer};
use crate::audio::codec::{BoxedDecoder, l16::pcm_to_bytes};
use crate::audio::frame::FrameSpec;
use crate::common::errors::{MuxError, Result};
use crate::configs::Buffering;

enum Backing {
    Ring(Mutex<RingBuffer<i16>>),
    Flush(FlushableBuffer<i16>),
}

pub struct DecodingStream {
    id: String,
    frame: FrameSpec,
    decoder: Mutex<BoxedDecoder>,
    backing: Backing,
    pool: Arc<PcmPool>,
    sink: SinkSlot,
}

impl DecodingStream {
    /// `ring_frames` sizes the ring in frames; ignored for [`Buffering::Flush`].
    pub fn new(
        id: impl Into<String>,
        frame: FrameSpec,
        decoder: BoxedDecoder,
        buffering: Buffering,
        ring_frames: usize,
        pool: Arc<PcmPool>,
    ) -> Self {
        let backing = match buffering {
            Buffering::Ring => Backing::Ring(Mutex::new(RingBuffer::new(
                frame.samples() * ring_frames.max(1),
            ))),
            Buffering::Flush => {
                Backing::Flush(FlushableBuffer::new(pool.clone(), frame.samples()))
            }
        };
        Self {
            id: id.into(),
            frame,
            decoder: Mutex::new(decoder),
            backing,
            pool,
            sink: SinkSlot::new(),
        }
    }

    pub fn buffering(&self) -> Buffering {
        match self.backing {
            Backing::Ring(_) => Buffering::Ring,
            Backing::Flush(_) => Buffering::Flush,
        }
    }

    /// Samples decoded but not yet read or flushed.
    pub fn buffered(&self) -> usize {
        match &self.backing {
            Backing::Ring(ring) => ring.lock().len(),
            Backing::Flush(acc) => acc.len(),
        }
    }
}

impl Stream for DecodingStream {
    fn id(&self) -> &str {
        &self.id
    }

    fn frame(&self) -> FrameSpec {
        self.frame
    }

    fn read_pcm(&self, dst: &mut [i16]) -> Result<usize> {
        match &self.backing {
            Backing::Ring(ring) => ring.lock().read(dst),
            Backing::Flush(acc) => {
                if dst.is_empty() {
                    return Err(MuxError::ShortBuffer);
                }
                match acc.drain_into(dst) {
                    0 => Err(MuxError::EmptyBuffer),
                    n => Ok(n),
                }
            }
        }
    }

    fn write_pcm(&self, _src: &[i16]) -> Result<usize> {
        Err(MuxError::UnsupportedOperation(
            "decoding stream doesn't support writing pcm",
        ))
    }

    fn write(&self, payload: &[u8]) -> Result<usize> {
        let pcm = self.decode(payload)?;
        let res = self.accept_pcm(&pcm);
        self.pool.release(pcm);
        res
    }

    fn decode(&self, payload: &[u8]) -> Result<PcmBuffer> {
        let mut pcm = self.pool.acquire(self.frame.samples());
        let decoded = self.decoder.lock().decode(payload, &mut pcm);
        let n = match decoded {
            Ok(n) => n,
            Err(e) => {
                self.pool.release(pcm);
                return Err(e.into());
            }
        };

        trace!(
            stream = %self.id,
            samples = n,
            frame = self.frame.samples(),
            payload = payload.len(),
            "decoded payload"
        );

        if self.sink.is_bound() {
            if let Err(e) = self.sink.forward(&pcm_to_bytes(&pcm)) {
                self.pool.release(pcm);
                return Err(e);
            }
        }
        Ok(pcm)
    }

    fn accept_pcm(&self, pcm: &[i16]) -> Result<usize> {
        if pcm.is_empty() {
            return Ok(0);
        }
        match &self.backing {
            Backing::Ring(ring) => ring.lock().write(pcm),
            Backing::Flush(acc) => {
                acc.push(pcm);
                Ok(pcm.len())
            }
        }
    }

    fn connect(&self, sink: BoxedSink) -> Result<()> {
        self.sink.bind(sink)
    }

    fn alignment(&self) -> Alignment {
        match self.backing {
            Backing::Ring(_) => Alignment::Start,
            // Accumulated audio trails the window it was pushed in.
            Backing::Flush(_) => Alignment::End,
        }
    }

    fn take_pcm(&self, frame_len: usize, pool: &PcmPool) -> Result<PcmBuffer> {
        match &self.backing {
            Backing::Ring(_) => read_into_scratch(self, frame_len, pool),
            Backing::Flush(acc) => Ok(acc.flush()),
        }
    }
}
