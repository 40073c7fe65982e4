//! `stream/g711.rs` — PCMA/PCMU passthrough stream.
//!
//! Encoded bytes are stored as they arrive and expanded only when read, one
//! byte per sample. There is no encoder side.

use parking_lot::Mutex;

use super::Stream;
use crate::audio::buffer::RingBuffer;
use crate::audio::codec::G711Law;
use crate::audio::frame::FrameSpec;
use crate::common::errors::{MuxError, Result};

const EXPAND_CHUNK: usize = 512;

pub struct G711Stream {
    id: String,
    frame: FrameSpec,
    law: G711Law,
    input: Mutex<RingBuffer<u8>>,
}

impl G711Stream {
    /// `ring_frames` sizes the encoded-byte ring in frames.
    pub fn new(id: impl Into<String>, law: G711Law, frame: FrameSpec, ring_frames: usize) -> Self {
        Self {
            id: id.into(),
            frame,
            law,
            input: Mutex::new(RingBuffer::new(frame.samples() * ring_frames.max(1))),
        }
    }

    pub fn law(&self) -> G711Law {
        self.law
    }
}

impl Stream for G711Stream {
    fn id(&self) -> &str {
        &self.id
    }

    fn frame(&self) -> FrameSpec {
        self.frame
    }

    fn read_pcm(&self, dst: &mut [i16]) -> Result<usize> {
        if dst.is_empty() {
            return Err(MuxError::ShortBuffer);
        }

        let mut input = self.input.lock();
        let mut scratch = [0u8; EXPAND_CHUNK];
        let mut filled = 0;
        while filled < dst.len() {
            let want = (dst.len() - filled).min(EXPAND_CHUNK);
            match input.read(&mut scratch[..want]) {
                Ok(n) => {
                    self.law.expand(&scratch[..n], &mut dst[filled..filled + n]);
                    filled += n;
                }
                Err(MuxError::EmptyBuffer) => break,
                Err(e) => return Err(e),
            }
        }

        if filled == 0 {
            return Err(MuxError::EmptyBuffer);
        }
        Ok(filled)
    }

    fn write_pcm(&self, _src: &[i16]) -> Result<usize> {
        Err(MuxError::UnsupportedOperation(
            "g711 stream doesn't support write pcm",
        ))
    }

    fn write(&self, payload: &[u8]) -> Result<usize> {
        self.input.lock().write(payload)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn stream(law: G711Law) -> G711Stream {
        G711Stream::new("pstn", law, FrameSpec::new(8_000, 20, 1).unwrap(), 4)
    }

    #[test]
    fn expands_on_read() {
        let s = stream(G711Law::Ulaw);
        assert_eq!(s.write(&[0xff, 0x00, 0x80]).unwrap(), 3);

        let mut dst = [1i16; 8];
        assert_eq!(s.read_pcm(&mut dst).unwrap(), 3);
        assert_eq!(dst[..3], [0, -32124, 32124]);
        assert!(matches!(s.read_pcm(&mut dst), Err(MuxError::EmptyBuffer)));
    }

    #[test]
    fn reads_across_chunks() {
        let s = stream(G711Law::Alaw);
        s.write(&[0xd5; 600]).unwrap();
        let mut dst = vec![0i16; 640];
        assert_eq!(s.read_pcm(&mut dst).unwrap(), 600);
        assert!(dst[..600].iter().all(|&v| v == 8));
    }

    #[test]
    fn one_sided_capabilities() {
        let s = stream(G711Law::Alaw);
        assert!(matches!(
            s.write_pcm(&[0; 160]),
            Err(MuxError::UnsupportedOperation(_))
        ));
        assert!(matches!(s.write(&[]), Err(MuxError::EmptyInput)));
        assert!(matches!(s.read_pcm(&mut []), Err(MuxError::ShortBuffer)));
    }
}
