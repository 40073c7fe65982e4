//! L16: signed 16-bit little-endian linear PCM, the identity codec.

use byteorder::{ByteOrder, LittleEndian};

use super::{Decoder, Encoder};
use crate::audio::frame::FrameSpec;
use crate::common::errors::CodecError;

#[derive(Debug, Default)]
pub struct L16Decoder;

impl L16Decoder {
    pub fn new() -> Self {
        Self
    }
}

impl Decoder for L16Decoder {
    fn decode(&mut self, payload: &[u8], pcm: &mut Vec<i16>) -> Result<usize, CodecError> {
        if payload.len() % 2 != 0 {
            return Err(CodecError::new("l16", "payload has a dangling byte"));
        }
        let n = payload.len() / 2;
        let start = pcm.len();
        pcm.resize(start + n, 0);
        LittleEndian::read_i16_into(payload, &mut pcm[start..]);
        Ok(n)
    }
}

#[derive(Debug)]
pub struct L16Encoder {
    sample_size: usize,
    channels: usize,
}

impl L16Encoder {
    pub fn new(frame: &FrameSpec) -> Self {
        Self {
            sample_size: frame.samples_per_channel(),
            channels: frame.channels(),
        }
    }
}

impl Encoder for L16Encoder {
    fn encode(&mut self, pcm: &[i16], out: &mut [u8]) -> Result<usize, CodecError> {
        let n = pcm.len() * 2;
        if out.len() < n {
            return Err(CodecError::new("l16", "output buffer too small"));
        }
        LittleEndian::write_i16_into(pcm, &mut out[..n]);
        Ok(n)
    }

    fn sample_size(&self) -> usize {
        self.sample_size
    }

    fn channel_count(&self) -> usize {
        self.channels
    }
}

/// Serialize PCM as little-endian bytes, the format handed to sinks.
pub fn pcm_to_bytes(pcm: &[i16]) -> Vec<u8> {
    let mut bytes = vec![0u8; pcm.len() * 2];
    LittleEndian::write_i16_into(pcm, &mut bytes);
    bytes
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn decode_appends_little_endian() {
        let mut dec = L16Decoder::new();
        let mut pcm = vec![9];
        assert_eq!(dec.decode(&[0x01, 0x00, 0xff, 0xff], &mut pcm).unwrap(), 2);
        assert_eq!(pcm, vec![9, 1, -1]);
    }

    #[test]
    fn odd_payload_is_rejected() {
        let mut dec = L16Decoder::new();
        let mut pcm = Vec::new();
        assert!(dec.decode(&[1, 2, 3], &mut pcm).is_err());
        assert!(pcm.is_empty());
    }

    #[test]
    fn encoder_checks_output_room() {
        let mut enc = L16Encoder::new(&FrameSpec::new(8_000, 10, 1).unwrap());
        assert_eq!(enc.sample_size(), 80);
        let mut out = [0u8; 3];
        assert!(enc.encode(&[1, 2], &mut out).is_err());
    }

    #[test]
    fn pcm_bytes_layout() {
        assert_eq!(pcm_to_bytes(&[0x0102, -2]), vec![0x02, 0x01, 0xfe, 0xff]);
    }
}
