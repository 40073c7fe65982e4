//! Codec seams of the mixing core.
//!
//! The core never looks inside a payload. Streams and the multiplexer only
//! talk to [`Decoder`] and [`Encoder`]; the adapters in this module plug
//! concrete formats in behind them.
//!
//! | Codec | Decoder | Encoder |
//! |---|---|---|
//! | L16 (s16le) | [`L16Decoder`] | [`L16Encoder`] |
//! | G.711 A-law / µ-law | [`G711Decoder`] | — |
//! | Opus (`opus` feature) | `OpusDecoder` | `OpusEncoder` |

pub mod g711;
pub mod l16;
#[cfg(feature = "opus")]
pub mod opus;

pub use g711::{G711Decoder, G711Law};
pub use l16::{L16Decoder, L16Encoder};
#[cfg(feature = "opus")]
pub use opus::{OpusDecoder, OpusEncoder};

use crate::audio::constants::MAX_ENCODED_PACKET;
use crate::audio::frame::FrameSpec;
use crate::common::errors::{CodecError, MuxError, Result};
use crate::configs::CodecKind;

/// Encoded payload → interleaved PCM.
pub trait Decoder: Send {
    /// Decode one payload, appending interleaved samples to `pcm`.
    /// Returns the number of samples appended.
    fn decode(
        &mut self,
        payload: &[u8],
        pcm: &mut Vec<i16>,
    ) -> std::result::Result<usize, CodecError>;
}

/// Interleaved PCM → encoded payload.
pub trait Encoder: Send {
    /// Encode one frame of `pcm` into `out`, returning the bytes written.
    fn encode(&mut self, pcm: &[i16], out: &mut [u8]) -> std::result::Result<usize, CodecError>;

    /// Samples per channel in one frame.
    fn sample_size(&self) -> usize;

    fn channel_count(&self) -> usize;

    /// Interleaved samples the encoder expects per call.
    fn frame_len(&self) -> usize {
        self.sample_size() * self.channel_count()
    }
}

pub type BoxedDecoder = Box<dyn Decoder>;
pub type BoxedEncoder = Box<dyn Encoder>;

/// Output room for one encoded frame of `frame_len` samples.
///
/// Linear PCM needs two bytes per sample; compressed codecs stay under
/// [`MAX_ENCODED_PACKET`].
pub fn packet_capacity(frame_len: usize) -> usize {
    (frame_len * 2).max(MAX_ENCODED_PACKET)
}

/// An encoder paired with packet scratch sized for its frame geometry.
pub struct FrameEncoder {
    encoder: BoxedEncoder,
    packet: Vec<u8>,
}

impl FrameEncoder {
    pub fn new(encoder: BoxedEncoder) -> Self {
        let packet = vec![0u8; packet_capacity(encoder.frame_len())];
        Self { encoder, packet }
    }

    pub fn frame_len(&self) -> usize {
        self.encoder.frame_len()
    }

    /// Largest packet [`FrameEncoder::encode`] can return.
    pub fn packet_capacity(&self) -> usize {
        self.packet.len()
    }

    /// Encode one frame. The returned packet borrows the internal scratch.
    pub fn encode(&mut self, pcm: &[i16]) -> std::result::Result<&[u8], CodecError> {
        let n = self.encoder.encode(pcm, &mut self.packet)?;
        Ok(&self.packet[..n])
    }
}

/// Build a decoder of `kind` for streams shaped like `frame`.
pub fn new_decoder(kind: CodecKind, frame: &FrameSpec) -> Result<BoxedDecoder> {
    match kind {
        CodecKind::L16 => Ok(Box::new(L16Decoder::new())),
        CodecKind::Alaw => Ok(Box::new(G711Decoder::new(G711Law::Alaw))),
        CodecKind::Ulaw => Ok(Box::new(G711Decoder::new(G711Law::Ulaw))),
        #[cfg(feature = "opus")]
        CodecKind::Opus => Ok(Box::new(OpusDecoder::new(frame)?)),
        #[cfg(not(feature = "opus"))]
        CodecKind::Opus => {
            let _ = frame;
            Err(MuxError::UnsupportedOperation(
                "opus support is not compiled in (enable the `opus` feature)",
            ))
        }
    }
}

/// Build an encoder of `kind` producing frames shaped like `frame`.
pub fn new_encoder(kind: CodecKind, frame: &FrameSpec) -> Result<BoxedEncoder> {
    match kind {
        CodecKind::L16 => Ok(Box::new(L16Encoder::new(frame))),
        CodecKind::Alaw | CodecKind::Ulaw => Err(MuxError::UnsupportedOperation(
            "g711 streams are decode-only",
        )),
        #[cfg(feature = "opus")]
        CodecKind::Opus => Ok(Box::new(OpusEncoder::new(frame)?)),
        #[cfg(not(feature = "opus"))]
        CodecKind::Opus => Err(MuxError::UnsupportedOperation(
            "opus support is not compiled in (enable the `opus` feature)",
        )),
    }
}
