use std::error::Error as StdError;

use thiserror::Error;

/// Opaque failure reported by a codec collaborator.
#[derive(Debug, Error)]
#[error("{codec}: {source}")]
pub struct CodecError {
    pub codec: &'static str,
    #[source]
    pub source: Box<dyn StdError + Send + Sync>,
}

impl CodecError {
    pub fn new(codec: &'static str, source: impl Into<Box<dyn StdError + Send + Sync>>) -> Self {
        Self {
            codec,
            source: source.into(),
        }
    }
}

/// Every failure the mixing core can report.
///
/// Registration and binding errors are returned to the caller as-is.
/// `EmptyBuffer` and `ShortBuffer` are buffer-level conditions; the mixdown
/// treats them as silence for the affected stream.
#[derive(Debug, Error)]
pub enum MuxError {
    #[error("stream `{0}` already exists")]
    DuplicateStream(String),

    #[error("stream `{0}` is not registered")]
    UnknownStream(String),

    #[error("encoder already configured")]
    EncoderAlreadySet,

    #[error("{0} is already bound")]
    AlreadyBound(&'static str),

    #[error("{0} is not bound")]
    Unbound(&'static str),

    #[error("{0}")]
    UnsupportedOperation(&'static str),

    #[error("empty buffer")]
    EmptyBuffer,

    #[error("short buffer")]
    ShortBuffer,

    #[error("empty input")]
    EmptyInput,

    #[error(
        "invalid frame geometry: {channels} ch x {duration_ms} ms @ {sample_rate} Hz is not a whole sample count"
    )]
    InvalidFrame {
        sample_rate: u32,
        duration_ms: u32,
        channels: usize,
    },

    #[error("pcm length {got} is not a multiple of the {expected}-sample frame")]
    FrameMismatch { expected: usize, got: usize },

    #[error("codec error: {0}")]
    Codec(#[from] CodecError),

    #[error("sink write failed: {0}")]
    Io(#[from] std::io::Error),
}

impl MuxError {
    /// Buffer-level conditions that only mean "nothing to hand over right now".
    pub fn is_buffer_condition(&self) -> bool {
        matches!(self, Self::EmptyBuffer | Self::ShortBuffer)
    }
}

pub type Result<T> = std::result::Result<T, MuxError>;
