//! `engine/transcode.rs` — single-source transcoder.
//!
//! Pulls PCM from one source stream and pushes it through one encoder. Both
//! ends are bound once; [`Transcoder::read`] produces one encoded frame per
//! call.

use std::sync::{Arc, OnceLock};

use parking_lot::Mutex;
use tracing::debug;

use crate::audio::buffer::PcmPool;
use crate::audio::codec::BoxedEncoder;
use crate::audio::stream::SharedStream;
use crate::common::errors::{MuxError, Result};

pub struct Transcoder {
    source: OnceLock<SharedStream>,
    encoder: OnceLock<Mutex<BoxedEncoder>>,
    pool: Arc<PcmPool>,
}

impl Transcoder {
    pub fn new(pool: Arc<PcmPool>) -> Self {
        Self {
            source: OnceLock::new(),
            encoder: OnceLock::new(),
            pool,
        }
    }

    pub fn add_source(&self, stream: SharedStream) -> Result<()> {
        let id = stream.id().to_owned();
        self.source
            .set(stream)
            .map_err(|_| MuxError::AlreadyBound("source"))?;
        debug!(source = %id, "transcoder source bound");
        Ok(())
    }

    pub fn add_encoder(&self, encoder: BoxedEncoder) -> Result<()> {
        self.encoder
            .set(Mutex::new(encoder))
            .map_err(|_| MuxError::AlreadyBound("encoder"))
    }

    /// Read decoded PCM straight from the source.
    pub fn read_pcm(&self, dst: &mut [i16]) -> Result<usize> {
        self.source
            .get()
            .ok_or(MuxError::Unbound("source"))?
            .read_pcm(dst)
    }

    pub fn write_pcm(&self, _src: &[i16]) -> Result<usize> {
        Err(MuxError::UnsupportedOperation(
            "transcoder doesn't support writing pcm",
        ))
    }

    /// Encode one frame of source PCM into `dst`, returning the encoded size.
    ///
    /// A short read from the source is padded with silence up to the
    /// encoder's frame length.
    pub fn read(&self, dst: &mut [u8]) -> Result<usize> {
        let source = self.source.get().ok_or(MuxError::Unbound("source"))?;
        let encoder = self.encoder.get().ok_or(MuxError::Unbound("encoder"))?;
        let mut encoder = encoder.lock();

        let mut pcm = self.pool.acquire_filled(encoder.frame_len());
        let res = source
            .read_pcm(&mut pcm)
            .and_then(|_| encoder.encode(&pcm, dst).map_err(MuxError::from));
        self.pool.release(pcm);
        res
    }
}

impl Default for Transcoder {
    fn default() -> Self {
        Self::new(Arc::new(PcmPool::default()))
    }
}
