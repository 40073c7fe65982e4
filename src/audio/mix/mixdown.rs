//! Sample-domain mixdown of per-stream PCM.
//!
//! Every contributing buffer is divided by the contributor count before it is
//! summed, truncating toward zero at each division. Low-amplitude mixes of
//! many streams lose a little precision to that rounding.

use crate::audio::buffer::PcmBuffer;
use crate::audio::stream::Alignment;

/// One stream's PCM for the current cycle.
pub struct Contribution {
    pub pcm: PcmBuffer,
    pub align: Alignment,
}

/// Mix `contributions` into one interleaved buffer as long as the longest one.
///
/// `acc` is reusable scratch space; its contents on entry are ignored.
pub fn mix(acc: &mut Vec<i32>, contributions: &[Contribution]) -> PcmBuffer {
    let max_len = contributions
        .iter()
        .map(|c| c.pcm.len())
        .max()
        .unwrap_or(0);
    if max_len == 0 {
        return Vec::new();
    }

    let divisor = contributions.len() as i32;
    acc.clear();
    acc.resize(max_len, 0);

    for c in contributions {
        let offset = match c.align {
            Alignment::Start => 0,
            Alignment::End => max_len - c.pcm.len(),
        };
        for (slot, &s) in acc[offset..].iter_mut().zip(c.pcm.iter()) {
            *slot += s as i32 / divisor;
        }
    }

    acc.iter()
        .map(|&sum| sum.clamp(i16::MIN as i32, i16::MAX as i32) as i16)
        .collect()
}
