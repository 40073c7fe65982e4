//! Opus adapters over `audiopus`.

use audiopus::{
    Application, Bitrate, Channels, MutSignals, SampleRate,
    coder::{Decoder as RawDecoder, Encoder as RawEncoder},
    packet::Packet,
};

use super::{Decoder, Encoder};
use crate::audio::constants::MAX_OPUS_FRAME_SIZE;
use crate::audio::frame::FrameSpec;
use crate::common::errors::{CodecError, MuxError, Result};

fn opus_rate(sample_rate: u32) -> Result<SampleRate> {
    Ok(match sample_rate {
        8000 => SampleRate::Hz8000,
        12000 => SampleRate::Hz12000,
        16000 => SampleRate::Hz16000,
        24000 => SampleRate::Hz24000,
        48000 => SampleRate::Hz48000,
        _ => {
            return Err(MuxError::UnsupportedOperation(
                "opus supports 8, 12, 16, 24 and 48 kHz only",
            ));
        }
    })
}

fn opus_channels(channels: usize) -> Result<Channels> {
    match channels {
        1 => Ok(Channels::Mono),
        2 => Ok(Channels::Stereo),
        _ => Err(MuxError::UnsupportedOperation(
            "opus supports mono or stereo only",
        )),
    }
}

fn codec_err(e: audiopus::Error) -> CodecError {
    CodecError::new("opus", e.to_string())
}

pub struct OpusDecoder {
    decoder: RawDecoder,
    channels: usize,
    /// Interleaved decode scratch, reused across packets.
    scratch: Vec<i16>,
}

impl OpusDecoder {
    pub fn new(frame: &FrameSpec) -> Result<Self> {
        let decoder = RawDecoder::new(
            opus_rate(frame.sample_rate())?,
            opus_channels(frame.channels())?,
        )
        .map_err(codec_err)?;
        Ok(Self {
            decoder,
            channels: frame.channels(),
            scratch: vec![0i16; MAX_OPUS_FRAME_SIZE * frame.channels()],
        })
    }
}

impl Decoder for OpusDecoder {
    fn decode(
        &mut self,
        payload: &[u8],
        pcm: &mut Vec<i16>,
    ) -> std::result::Result<usize, CodecError> {
        let packet = Packet::try_from(payload).map_err(codec_err)?;
        let signals = MutSignals::try_from(self.scratch.as_mut_slice()).map_err(codec_err)?;
        // Per-channel sample count.
        let n = self
            .decoder
            .decode(Some(packet), signals, false)
            .map_err(codec_err)?;
        let total = n * self.channels;
        pcm.extend_from_slice(&self.scratch[..total]);
        Ok(total)
    }
}

/// PCM i16 → Opus packets with the AUDIO application profile.
pub struct OpusEncoder {
    encoder: RawEncoder,
    sample_size: usize,
    channels: usize,
}

impl OpusEncoder {
    pub fn new(frame: &FrameSpec) -> Result<Self> {
        let mut encoder = RawEncoder::new(
            opus_rate(frame.sample_rate())?,
            opus_channels(frame.channels())?,
            Application::Audio,
        )
        .map_err(codec_err)?;
        encoder.set_bitrate(Bitrate::Auto).map_err(codec_err)?;
        Ok(Self {
            encoder,
            sample_size: frame.samples_per_channel(),
            channels: frame.channels(),
        })
    }
}

impl Encoder for OpusEncoder {
    fn encode(&mut self, pcm: &[i16], out: &mut [u8]) -> std::result::Result<usize, CodecError> {
        self.encoder.encode(pcm, out).map_err(codec_err)
    }

    fn sample_size(&self) -> usize {
        self.sample_size
    }

    fn channel_count(&self) -> usize {
        self.channels
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn encodes_and_decodes_a_frame() {
        let frame = FrameSpec::new(48_000, 20, 2).unwrap();
        let mut enc = OpusEncoder::new(&frame).unwrap();
        let mut dec = OpusDecoder::new(&frame).unwrap();

        let pcm = vec![0i16; frame.samples()];
        let mut packet = vec![0u8; 4000];
        let n = enc.encode(&pcm, &mut packet).unwrap();
        assert!(n > 0);

        let mut out = Vec::new();
        assert_eq!(dec.decode(&packet[..n], &mut out).unwrap(), frame.samples());
    }

    #[test]
    fn rejects_unsupported_rate() {
        let frame = FrameSpec::new(44_100, 20, 2).unwrap();
        assert!(OpusEncoder::new(&frame).is_err());
    }
}
