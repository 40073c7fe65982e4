//! Fixed-capacity circular buffer with overwrite-on-overflow semantics.
//!
//! Two monotonically increasing cursors count every element ever written and
//! read; their value modulo the capacity gives the physical slot. The
//! difference is the unread count and never exceeds the capacity: writing
//! past it drops the oldest unread elements by advancing the read cursor.
//!
//! Both cursors move through `&mut self`, so one producer and one consumer
//! must be serialized by the owner (streams keep the ring behind a mutex).

use crate::common::errors::{MuxError, Result};

pub struct RingBuffer<T> {
    buf: Vec<T>,
    write_pos: u64,
    read_pos: u64,
}

impl<T: Copy + Default> RingBuffer<T> {
    /// Create a ring holding at most `capacity` elements.
    ///
    /// # Panics
    ///
    /// Panics if `capacity` is zero.
    pub fn new(capacity: usize) -> Self {
        assert!(capacity > 0, "ring capacity must be greater than 0");
        Self {
            buf: vec![T::default(); capacity],
            write_pos: 0,
            read_pos: 0,
        }
    }

    pub fn capacity(&self) -> usize {
        self.buf.len()
    }

    /// How many elements are currently available to read.
    pub fn len(&self) -> usize {
        (self.write_pos - self.read_pos) as usize
    }

    pub fn is_empty(&self) -> bool {
        self.write_pos == self.read_pos
    }

    /// How many elements can still be written before old data is overwritten.
    pub fn remaining(&self) -> usize {
        self.capacity() - self.len()
    }

    /// Total elements ever accepted by `write`.
    pub fn written(&self) -> u64 {
        self.write_pos
    }

    /// Write `items`, overwriting the oldest unread elements when full.
    ///
    /// Returns how many of `items` are now held by the ring; a single write
    /// longer than the capacity keeps only its trailing `capacity` elements.
    pub fn write(&mut self, items: &[T]) -> Result<usize> {
        if items.is_empty() {
            return Err(MuxError::EmptyInput);
        }

        let cap = self.capacity();
        let dropped = items.len().saturating_sub(cap);
        let chunk = &items[dropped..];
        let write_pos = self.write_pos + dropped as u64;

        let start = (write_pos % cap as u64) as usize;
        let available_at_end = cap - start;
        if chunk.len() <= available_at_end {
            self.buf[start..start + chunk.len()].copy_from_slice(chunk);
        } else {
            // Wrap around
            self.buf[start..].copy_from_slice(&chunk[..available_at_end]);
            self.buf[..chunk.len() - available_at_end].copy_from_slice(&chunk[available_at_end..]);
        }

        self.write_pos = write_pos + chunk.len() as u64;
        if self.write_pos - self.read_pos > cap as u64 {
            // Overwrote unread data: advance the read cursor.
            self.read_pos = self.write_pos - cap as u64;
        }

        Ok(chunk.len())
    }

    /// Read up to `out.len()` unread elements into `out`, oldest first.
    pub fn read(&mut self, out: &mut [T]) -> Result<usize> {
        if out.is_empty() {
            return Err(MuxError::ShortBuffer);
        }
        if self.is_empty() {
            return Err(MuxError::EmptyBuffer);
        }

        let to_read = out.len().min(self.len());
        let cap = self.capacity();
        let start = (self.read_pos % cap as u64) as usize;
        let available_at_end = cap - start;

        if to_read <= available_at_end {
            out[..to_read].copy_from_slice(&self.buf[start..start + to_read]);
        } else {
            out[..available_at_end].copy_from_slice(&self.buf[start..]);
            out[available_at_end..to_read].copy_from_slice(&self.buf[..to_read - available_at_end]);
        }

        self.read_pos += to_read as u64;
        Ok(to_read)
    }

    /// Skip `n` elements without copying. Returns actual elements skipped.
    pub fn skip(&mut self, n: usize) -> usize {
        let to_skip = n.min(self.len());
        self.read_pos += to_skip as u64;
        to_skip
    }

    /// Drop every unread element.
    pub fn clear(&mut self) {
        self.read_pos = self.write_pos;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn drain(rb: &mut RingBuffer<i16>) -> Vec<i16> {
        let mut out = vec![0; rb.capacity() + 8];
        match rb.read(&mut out) {
            Ok(n) => out[..n].to_vec(),
            Err(MuxError::EmptyBuffer) => Vec::new(),
            Err(e) => panic!("unexpected error: {e}"),
        }
    }

    #[test]
    fn read_returns_last_items_in_order() {
        for cap in [1usize, 3, 7, 16] {
            for chunk in [1usize, 2, 5, 9, 20] {
                let mut rb = RingBuffer::<i16>::new(cap);
                let mut all = Vec::new();
                let mut next = 0i16;
                for _ in 0..4 {
                    let items: Vec<i16> = (0..chunk)
                        .map(|_| {
                            next += 1;
                            next
                        })
                        .collect();
                    rb.write(&items).unwrap();
                    all.extend_from_slice(&items);
                }
                let keep = all.len().min(cap);
                assert_eq!(drain(&mut rb), all[all.len() - keep..], "cap={cap} chunk={chunk}");
                assert!(rb.is_empty());
            }
        }
    }

    #[test]
    fn empty_read_is_an_error() {
        let mut rb = RingBuffer::<u8>::new(4);
        let mut out = [0u8; 4];
        assert!(matches!(rb.read(&mut out), Err(MuxError::EmptyBuffer)));
        assert_eq!(out, [0; 4]);
    }

    #[test]
    fn zero_length_arguments() {
        let mut rb = RingBuffer::<i16>::new(4);
        assert!(matches!(rb.write(&[]), Err(MuxError::EmptyInput)));
        rb.write(&[1]).unwrap();
        assert!(matches!(rb.read(&mut []), Err(MuxError::ShortBuffer)));
        assert_eq!(rb.len(), 1);
    }

    #[test]
    fn partial_reads_wrap_around() {
        let mut rb = RingBuffer::<i16>::new(4);
        rb.write(&[1, 2, 3]).unwrap();
        let mut out = [0i16; 2];
        assert_eq!(rb.read(&mut out).unwrap(), 2);
        assert_eq!(out, [1, 2]);

        rb.write(&[4, 5, 6]).unwrap();
        assert_eq!(rb.len(), 4);
        assert_eq!(rb.remaining(), 0);

        let mut out = [0i16; 8];
        assert_eq!(rb.read(&mut out).unwrap(), 4);
        assert_eq!(out[..4], [3, 4, 5, 6]);
    }

    #[test]
    fn overflow_drops_oldest() {
        let mut rb = RingBuffer::<i16>::new(3);
        rb.write(&[1, 2]).unwrap();
        rb.write(&[3, 4]).unwrap();
        assert_eq!(rb.len(), 3);
        assert_eq!(drain(&mut rb), vec![2, 3, 4]);
    }

    #[test]
    fn oversized_write_keeps_tail() {
        let mut rb = RingBuffer::<i16>::new(3);
        assert_eq!(rb.write(&[1, 2, 3, 4, 5]).unwrap(), 3);
        assert_eq!(rb.written(), 5);
        assert_eq!(drain(&mut rb), vec![3, 4, 5]);
    }

    #[test]
    fn skip_and_clear() {
        let mut rb = RingBuffer::<i16>::new(8);
        rb.write(&[1, 2, 3, 4]).unwrap();
        assert_eq!(rb.skip(3), 3);
        assert_eq!(drain(&mut rb), vec![4]);

        rb.write(&[5, 6]).unwrap();
        rb.clear();
        assert!(rb.is_empty());
        assert_eq!(rb.skip(1), 0);
    }
}
