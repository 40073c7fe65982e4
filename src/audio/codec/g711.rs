//! G.711 expansion (ITU-T G.711, A-law and µ-law), one byte per sample.

use super::Decoder;
use crate::common::errors::CodecError;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum G711Law {
    /// PCMA
    Alaw,
    /// PCMU
    Ulaw,
}

const fn alaw_to_linear(a: u8) -> i16 {
    let a = a ^ 0x55;
    let mut t = ((a & 0x0f) as i16) << 4;
    let seg = (a & 0x70) >> 4;
    match seg {
        0 => t += 8,
        1 => t += 0x108,
        _ => {
            t += 0x108;
            t <<= seg - 1;
        }
    }
    if a & 0x80 != 0 { t } else { -t }
}

const fn ulaw_to_linear(u: u8) -> i16 {
    let u = !u;
    let mut t = (((u & 0x0f) as i16) << 3) + 0x84;
    t <<= (u & 0x70) >> 4;
    if u & 0x80 != 0 { 0x84 - t } else { t - 0x84 }
}

const fn build_table(law: G711Law) -> [i16; 256] {
    let mut table = [0i16; 256];
    let mut i = 0;
    while i < 256 {
        table[i] = match law {
            G711Law::Alaw => alaw_to_linear(i as u8),
            G711Law::Ulaw => ulaw_to_linear(i as u8),
        };
        i += 1;
    }
    table
}

static ALAW_TABLE: [i16; 256] = build_table(G711Law::Alaw);
static ULAW_TABLE: [i16; 256] = build_table(G711Law::Ulaw);

impl G711Law {
    fn table(self) -> &'static [i16; 256] {
        match self {
            Self::Alaw => &ALAW_TABLE,
            Self::Ulaw => &ULAW_TABLE,
        }
    }

    /// Expand `encoded` into `out`; both slices must be the same length.
    pub fn expand(self, encoded: &[u8], out: &mut [i16]) {
        let table = self.table();
        for (slot, &byte) in out.iter_mut().zip(encoded) {
            *slot = table[byte as usize];
        }
    }
}

#[derive(Debug)]
pub struct G711Decoder {
    law: G711Law,
}

impl G711Decoder {
    pub fn new(law: G711Law) -> Self {
        Self { law }
    }

    pub fn law(&self) -> G711Law {
        self.law
    }
}

impl Decoder for G711Decoder {
    fn decode(&mut self, payload: &[u8], pcm: &mut Vec<i16>) -> Result<usize, CodecError> {
        let start = pcm.len();
        pcm.resize(start + payload.len(), 0);
        self.law.expand(payload, &mut pcm[start..]);
        Ok(payload.len())
    }
}
