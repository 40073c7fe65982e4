//! `stream/encoding.rs` — PCM → payload stream.
//!
//! PCM written to the stream is encoded one frame at a time, right away; the
//! encoded bytes queue up in a byte ring until the caller drains them.

use parking_lot::Mutex;
use tracing::trace;

use super::{BoxedSink, SinkSlot, Stream};
use crate::audio::buffer::RingBuffer;
use crate::audio::codec::{BoxedEncoder, FrameEncoder, packet_capacity};
use crate::audio::constants::ENCODED_RING_PACKETS;
use crate::audio::frame::FrameSpec;
use crate::common::errors::{MuxError, Result};

pub struct EncodingStream {
    id: String,
    frame: FrameSpec,
    encoder: Mutex<FrameEncoder>,
    encoded: Mutex<RingBuffer<u8>>,
    sink: SinkSlot,
}

impl EncodingStream {
    /// The encoder's frame geometry must match `frame`.
    pub fn new(id: impl Into<String>, frame: FrameSpec, encoder: BoxedEncoder) -> Result<Self> {
        if encoder.frame_len() != frame.samples() {
            return Err(MuxError::FrameMismatch {
                expected: frame.samples(),
                got: encoder.frame_len(),
            });
        }
        Ok(Self {
            id: id.into(),
            frame,
            encoder: Mutex::new(FrameEncoder::new(encoder)),
            encoded: Mutex::new(RingBuffer::new(
                packet_capacity(frame.samples()) * ENCODED_RING_PACKETS,
            )),
            sink: SinkSlot::new(),
        })
    }

    /// Drain encoded bytes into `dst`.
    pub fn read(&self, dst: &mut [u8]) -> Result<usize> {
        self.encoded.lock().read(dst)
    }

    /// Encoded bytes waiting to be read.
    pub fn pending(&self) -> usize {
        self.encoded.lock().len()
    }
}

impl Stream for EncodingStream {
    fn id(&self) -> &str {
        &self.id
    }

    fn frame(&self) -> FrameSpec {
        self.frame
    }

    fn read_pcm(&self, _dst: &mut [i16]) -> Result<usize> {
        Err(MuxError::UnsupportedOperation(
            "encoding stream doesn't support reading pcm",
        ))
    }

    /// Encode `src`, which must hold a whole number of frames. Returns the
    /// encoded bytes queued.
    fn write_pcm(&self, src: &[i16]) -> Result<usize> {
        if src.is_empty() {
            return Err(MuxError::EmptyInput);
        }
        let frame_len = self.frame.samples();
        if src.len() % frame_len != 0 {
            return Err(MuxError::FrameMismatch {
                expected: frame_len,
                got: src.len(),
            });
        }

        let mut encoder = self.encoder.lock();
        let mut queued = 0;
        for chunk in src.chunks_exact(frame_len) {
            let packet = encoder.encode(chunk)?;
            trace!(stream = %self.id, bytes = packet.len(), "encoded frame");
            if packet.is_empty() {
                continue;
            }
            self.sink.forward(packet)?;
            queued += self.encoded.lock().write(packet)?;
        }
        Ok(queued)
    }

    fn connect(&self, sink: BoxedSink) -> Result<()> {
        self.sink.bind(sink)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::audio::codec::L16Encoder;
    use crate::audio::stream::sink::testing::SharedSink;

    fn frame() -> FrameSpec {
        FrameSpec::new(8_000, 10, 1).unwrap()
    }

    fn stream() -> EncodingStream {
        EncodingStream::new("out", frame(), Box::new(L16Encoder::new(&frame()))).unwrap()
    }

    #[test]
    fn encodes_whole_frames() {
        let s = stream();
        let sink = SharedSink::default();
        s.connect(Box::new(sink.clone())).unwrap();

        let pcm = vec![3i16; 160];
        assert_eq!(s.write_pcm(&pcm).unwrap(), 320);
        assert_eq!(s.pending(), 320);
        assert_eq!(sink.bytes().len(), 320);

        let mut dst = vec![0u8; 512];
        assert_eq!(s.read(&mut dst).unwrap(), 320);
        assert_eq!(&dst[..2], &[3, 0]);
        assert!(matches!(s.read(&mut dst), Err(MuxError::EmptyBuffer)));
    }

    #[test]
    fn long_stereo_frames_fit() {
        let frame = FrameSpec::new(48_000, 40, 2).unwrap();
        let s = EncodingStream::new("wide", frame, Box::new(L16Encoder::new(&frame))).unwrap();

        assert_eq!(s.write_pcm(&[1; 3_840]).unwrap(), 7_680);
        let mut dst = vec![0u8; 8_192];
        assert_eq!(s.read(&mut dst).unwrap(), 7_680);
        assert_eq!(&dst[..2], &[1, 0]);
    }

    #[test]
    fn partial_frames_are_rejected() {
        let s = stream();
        assert!(matches!(
            s.write_pcm(&[1; 81]),
            Err(MuxError::FrameMismatch {
                expected: 80,
                got: 81
            })
        ));
        assert!(matches!(s.write_pcm(&[]), Err(MuxError::EmptyInput)));
        assert_eq!(s.pending(), 0);
    }

    #[test]
    fn read_pcm_is_unsupported() {
        let s = stream();
        let mut dst = [0i16; 4];
        assert!(matches!(
            s.read_pcm(&mut dst),
            Err(MuxError::UnsupportedOperation(_))
        ));
    }

    #[test]
    fn encoder_geometry_must_match() {
        let other = FrameSpec::new(8_000, 20, 1).unwrap();
        assert!(matches!(
            EncodingStream::new("out", frame(), Box::new(L16Encoder::new(&other))),
            Err(MuxError::FrameMismatch { .. })
        ));
    }
}
