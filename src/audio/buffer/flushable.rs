//! Accumulate/swap double buffer.
//!
//! Producers append into one live accumulator under a mutex. The consumer
//! swaps a fresh pooled accumulator in under the same mutex and walks away
//! with the filled one, so a flush sees exactly the samples pushed before it.
//! Nothing caps the accumulator; the consumer must flush at a bounded cadence.

use std::sync::Arc;

use parking_lot::Mutex;

use super::pool::SampleBufferPool;

pub struct FlushableBuffer<T> {
    live: Mutex<Vec<T>>,
    pool: Arc<SampleBufferPool<T>>,
    /// Expected samples per flush; sizes the replacement accumulator.
    frame_hint: usize,
}

impl<T: Copy> FlushableBuffer<T> {
    pub fn new(pool: Arc<SampleBufferPool<T>>, frame_hint: usize) -> Self {
        let live = pool.acquire(frame_hint);
        Self {
            live: Mutex::new(live),
            pool,
            frame_hint,
        }
    }

    /// Append `items` to the live accumulator.
    pub fn push(&self, items: &[T]) {
        self.live.lock().extend_from_slice(items);
    }

    /// Swap the live accumulator for an empty one and return the filled one.
    ///
    /// The caller owns the result; handing it back through
    /// [`SampleBufferPool::release`] lets it be reused.
    pub fn flush(&self) -> Vec<T> {
        // Acquire outside the lock; producers only wait for the swap itself.
        let fresh = self.pool.acquire(self.frame_hint);
        std::mem::replace(&mut *self.live.lock(), fresh)
    }

    /// Move up to `dst.len()` samples from the front of the accumulator.
    pub fn drain_into(&self, dst: &mut [T]) -> usize {
        let mut live = self.live.lock();
        let n = dst.len().min(live.len());
        for (slot, sample) in dst.iter_mut().zip(live.drain(..n)) {
            *slot = sample;
        }
        n
    }

    pub fn len(&self) -> usize {
        self.live.lock().len()
    }

    pub fn is_empty(&self) -> bool {
        self.live.lock().is_empty()
    }

    pub fn pool(&self) -> &Arc<SampleBufferPool<T>> {
        &self.pool
    }
}

#[cfg(test)]
mod tests {
    use std::sync::atomic::{AtomicBool, Ordering};

    use super::*;

    fn buffer() -> FlushableBuffer<i16> {
        FlushableBuffer::new(Arc::new(SampleBufferPool::default()), 960)
    }

    #[test]
    fn flush_returns_pushed_samples() {
        let buf = buffer();
        buf.push(&[1, 2]);
        buf.push(&[3]);
        assert_eq!(buf.len(), 3);

        assert_eq!(buf.flush(), vec![1, 2, 3]);
        assert!(buf.is_empty());
        assert!(buf.flush().is_empty());
    }

    #[test]
    fn flushed_buffer_is_reused() {
        let buf = buffer();
        buf.push(&[5; 10]);
        let out = buf.flush();
        buf.pool().release(out);
        buf.push(&[6; 4]);
        assert_eq!(buf.flush(), vec![6; 4]);
        assert_eq!(buf.pool().stats().hits, 1);
    }

    #[test]
    fn drain_into_reads_from_front() {
        let buf = buffer();
        buf.push(&[1, 2, 3, 4, 5]);
        let mut dst = [0i16; 3];
        assert_eq!(buf.drain_into(&mut dst), 3);
        assert_eq!(dst, [1, 2, 3]);
        assert_eq!(buf.flush(), vec![4, 5]);
    }

    #[test]
    fn concurrent_pushers_never_lose_samples() {
        const PUSHERS: usize = 4;
        const PUSHES: usize = 2_000;
        const CHUNK: usize = 7;

        let buf = buffer();
        let done = AtomicBool::new(false);
        let mut flushed = Vec::new();

        std::thread::scope(|s| {
            let workers: Vec<_> = (0..PUSHERS)
                .map(|p| {
                    let buf = &buf;
                    s.spawn(move || {
                        for _ in 0..PUSHES {
                            buf.push(&[p as i16; CHUNK]);
                        }
                    })
                })
                .collect();

            s.spawn(|| {
                for w in workers {
                    w.join().unwrap();
                }
                done.store(true, Ordering::Release);
            });

            while !done.load(Ordering::Acquire) {
                let out = buf.flush();
                flushed.push(out.len());
                buf.pool().release(out);
                std::thread::yield_now();
            }
        });
        flushed.push(buf.flush().len());

        assert_eq!(flushed.iter().sum::<usize>(), PUSHERS * PUSHES * CHUNK);
    }
}
