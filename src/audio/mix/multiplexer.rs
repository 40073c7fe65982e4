//! `audio/mix/multiplexer.rs` — N-input mixer over registered streams.
//!
//! Producers push encoded payloads per stream id through [`Multiplexer::process`];
//! a single consumer pulls mixed frames through [`Multiplexer::read_pcm`],
//! [`Multiplexer::read_encoded`] or [`Multiplexer::tick`]. The registry sits
//! behind a reader/writer lock; decoding always happens outside of it.

use std::{
    collections::{HashMap, hash_map::Entry},
    sync::{Arc, OnceLock},
};

use bytes::Bytes;
use parking_lot::{Mutex, RwLock};
use tracing::{debug, info, warn};

use super::mixdown::{self, Contribution};
use crate::audio::{
    buffer::{PcmBuffer, PcmPool},
    codec::{self, BoxedEncoder, FrameEncoder},
    frame::FrameSpec,
    stream::{DecodingStream, SharedStream},
};
use crate::common::errors::{MuxError, Result};
use crate::configs::MixerConfig;

/// Output of one mix cycle.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Mixed {
    /// Interleaved PCM, when no encoder is attached.
    Pcm(PcmBuffer),
    /// One encoded packet per frame of mixed PCM.
    Encoded(Vec<Bytes>),
}

impl Mixed {
    /// True when no stream contributed anything this cycle.
    pub fn is_empty(&self) -> bool {
        match self {
            Mixed::Pcm(pcm) => pcm.is_empty(),
            Mixed::Encoded(packets) => packets.is_empty(),
        }
    }
}

pub struct Multiplexer {
    streams: RwLock<HashMap<String, SharedStream>>,
    encoder: OnceLock<Mutex<FrameEncoder>>,
    pool: Arc<PcmPool>,
    config: MixerConfig,
    frame: FrameSpec,
    mix_buf: Mutex<Vec<i32>>,
}

impl Multiplexer {
    /// Fails when the configured frame geometry is invalid.
    pub fn new(config: MixerConfig, pool: Arc<PcmPool>) -> Result<Self> {
        let frame = FrameSpec::new(
            config.sample_rate,
            config.frame_duration_ms,
            config.channels,
        )?;
        Ok(Self {
            streams: RwLock::new(HashMap::new()),
            encoder: OnceLock::new(),
            pool,
            config,
            frame,
            mix_buf: Mutex::new(Vec::with_capacity(frame.samples())),
        })
    }

    pub fn config(&self) -> &MixerConfig {
        &self.config
    }

    /// Output frame geometry from the mixer config.
    pub fn frame(&self) -> FrameSpec {
        self.frame
    }

    pub fn pool(&self) -> &Arc<PcmPool> {
        &self.pool
    }

    /// Register a decoding stream using the configured codec and buffering.
    pub fn add_stream(
        &self,
        id: &str,
        sample_rate: u32,
        duration_ms: u32,
        channels: usize,
    ) -> Result<()> {
        let frame = FrameSpec::new(sample_rate, duration_ms, channels)?;
        let decoder = codec::new_decoder(self.config.codec, &frame)?;
        let stream = DecodingStream::new(
            id,
            frame,
            decoder,
            self.config.buffering,
            self.config.ring_frames,
            self.pool.clone(),
        );
        self.add_source_stream(id, Arc::new(stream))
    }

    /// Register an already-built stream. Existing ids are never replaced.
    pub fn add_source_stream(&self, id: &str, stream: SharedStream) -> Result<()> {
        let frame = stream.frame();
        match self.streams.write().entry(id.to_owned()) {
            Entry::Occupied(_) => Err(MuxError::DuplicateStream(id.to_owned())),
            Entry::Vacant(slot) => {
                slot.insert(stream);
                info!(
                    stream = id,
                    sample_rate = frame.sample_rate(),
                    channels = frame.channels(),
                    duration_ms = frame.duration_ms(),
                    "stream registered"
                );
                Ok(())
            }
        }
    }

    /// Attach the output encoder. Can only be done once.
    pub fn set_encoder(&self, encoder: BoxedEncoder) -> Result<()> {
        let frame_len = encoder.frame_len();
        self.encoder
            .set(Mutex::new(FrameEncoder::new(encoder)))
            .map_err(|_| MuxError::EncoderAlreadySet)?;
        debug!(frame_len, "output encoder attached");
        Ok(())
    }

    pub fn has_encoder(&self) -> bool {
        self.encoder.get().is_some()
    }

    pub fn stream(&self, id: &str) -> Option<SharedStream> {
        self.streams.read().get(id).cloned()
    }

    pub fn stream_ids(&self) -> Vec<String> {
        self.streams.read().keys().cloned().collect()
    }

    pub fn len(&self) -> usize {
        self.streams.read().len()
    }

    pub fn is_empty(&self) -> bool {
        self.streams.read().is_empty()
    }

    /// Decode `payload` for stream `id` and buffer it, minus leading silence.
    ///
    /// Returns the number of samples buffered.
    pub fn process(&self, payload: &[u8], id: &str) -> Result<usize> {
        let stream = self
            .stream(id)
            .ok_or_else(|| MuxError::UnknownStream(id.to_owned()))?;

        let pcm = stream.decode(payload)?;
        let start = leading_silence(&pcm);
        let res = stream.accept_pcm(&pcm[start..]);
        self.pool.release(pcm);
        res
    }

    /// Mix up to `frame_len` samples from every stream.
    ///
    /// Streams that fail to produce PCM this cycle are left out and do not
    /// count toward the divisor. An empty result means nothing was buffered.
    pub fn read_pcm(&self, frame_len: usize) -> PcmBuffer {
        self.interleaved_multiplex(frame_len)
    }

    /// Mix one encoder frame and encode it.
    ///
    /// Mixed PCM is cut into encoder frames; a trailing partial frame is
    /// padded with silence. A frame the encoder rejects is logged and left
    /// out; the error is returned only when no frame could be encoded.
    pub fn read_encoded(&self) -> Result<Vec<Bytes>> {
        let encoder = self.encoder.get().ok_or(MuxError::Unbound("encoder"))?;
        let mut encoder = encoder.lock();
        let frame_len = encoder.frame_len();

        let pcm = self.interleaved_multiplex(frame_len);
        if pcm.is_empty() {
            return Ok(Vec::new());
        }

        let mut packets = Vec::with_capacity(pcm.len().div_ceil(frame_len));
        let mut padded: Option<PcmBuffer> = None;
        let mut last_err = None;
        for (i, chunk) in pcm.chunks(frame_len).enumerate() {
            let input = if chunk.len() == frame_len {
                chunk
            } else {
                let buf = padded.insert(self.pool.acquire_filled(frame_len));
                buf[..chunk.len()].copy_from_slice(chunk);
                &buf[..]
            };
            match encoder.encode(input) {
                Ok(packet) => packets.push(Bytes::copy_from_slice(packet)),
                Err(e) => {
                    warn!(frame = i, "dropping mixed frame: {e}");
                    last_err = Some(e);
                }
            }
        }

        if let Some(buf) = padded {
            self.pool.release(buf);
        }
        match last_err {
            Some(e) if packets.is_empty() => Err(e.into()),
            _ => Ok(packets),
        }
    }

    /// One mix cycle: encoded when an encoder is attached, `frame_len`
    /// samples of PCM otherwise. The encoder's own frame length wins.
    pub fn tick(&self, frame_len: usize) -> Result<Mixed> {
        if self.has_encoder() {
            self.read_encoded().map(Mixed::Encoded)
        } else {
            Ok(Mixed::Pcm(self.read_pcm(frame_len)))
        }
    }

    fn interleaved_multiplex(&self, frame_len: usize) -> PcmBuffer {
        let mut contributions = Vec::new();
        {
            let streams = self.streams.read();
            contributions.reserve(streams.len());
            for (id, stream) in streams.iter() {
                match stream.take_pcm(frame_len, &self.pool) {
                    Ok(pcm) => contributions.push(Contribution {
                        pcm,
                        align: stream.alignment(),
                    }),
                    Err(e) if e.is_buffer_condition() => {
                        debug!(stream = %id, "nothing to mix: {e}");
                    }
                    Err(e) => {
                        warn!(stream = %id, "stream left out of mix: {e}");
                    }
                }
            }
        }

        let out = mixdown::mix(&mut self.mix_buf.lock(), &contributions);
        for c in contributions {
            self.pool.release(c.pcm);
        }
        out
    }
}

fn leading_silence(pcm: &[i16]) -> usize {
    pcm.iter().position(|&s| s != 0).unwrap_or(pcm.len())
}
