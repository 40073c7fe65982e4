//! Typed free list of reusable sample buffers.
//!
//! Buffers are lent out empty and handed back after use. Anything larger than
//! the retained-capacity ceiling is dropped on release, as is anything beyond
//! the entry limit, so the pool's footprint stays bounded. The pool is
//! evicted entirely after an idle period.

use std::time::{Duration, Instant};

use parking_lot::Mutex;

use crate::configs::PoolConfig;

// ── Inner state ──────────────────────────────────────────────────────────────

struct PoolInner<T> {
    free: Vec<Vec<T>>,
    retained: usize,
    hits: u64,
    misses: u64,
    last_activity: Instant,
    last_cleanup: Instant,
}

impl<T> PoolInner<T> {
    fn new() -> Self {
        let now = Instant::now();
        Self {
            free: Vec::new(),
            retained: 0,
            hits: 0,
            misses: 0,
            last_activity: now,
            last_cleanup: now,
        }
    }

    fn acquire(&mut self, min_capacity: usize) -> Vec<T> {
        self.last_activity = Instant::now();

        // Most recently released first; scratch buffers usually share one size.
        if let Some(pos) = self
            .free
            .iter()
            .rposition(|buf| buf.capacity() >= min_capacity)
        {
            let buf = self.free.swap_remove(pos);
            self.retained -= buf.capacity();
            self.hits += 1;
            return buf;
        }

        self.misses += 1;
        Vec::with_capacity(min_capacity)
    }

    fn release(&mut self, mut buf: Vec<T>, ceiling: usize, max_entries: usize) -> bool {
        self.last_activity = Instant::now();
        let size = buf.capacity();

        if size == 0 || size > ceiling {
            return false;
        }
        if self.free.len() >= max_entries {
            return false;
        }

        buf.clear();
        self.retained += size;
        self.free.push(buf);
        true
    }

    /// Drop every parked buffer once the pool has been idle for `idle`.
    fn cleanup(&mut self, idle: Duration) {
        if self.free.is_empty() {
            return;
        }

        // Rate-limit cleanup checks.
        if self.last_cleanup.elapsed() < idle / 6 {
            return;
        }
        self.last_cleanup = Instant::now();

        if self.last_activity.elapsed() >= idle {
            self.free.clear();
            self.retained = 0;
        }
    }
}

// ── Public API ───────────────────────────────────────────────────────────────

/// Shared, thread-safe pool of `Vec<T>` buffers.
///
/// Owned by whoever constructs it and passed around as `Arc<SampleBufferPool<T>>`;
/// there is no process-wide instance.
pub struct SampleBufferPool<T> {
    inner: Mutex<PoolInner<T>>,
    retain_ceiling: usize,
    max_entries: usize,
    idle: Duration,
}

impl<T> SampleBufferPool<T> {
    pub fn new(config: &PoolConfig) -> Self {
        Self {
            inner: Mutex::new(PoolInner::new()),
            retain_ceiling: config.retain_ceiling,
            max_entries: config.max_entries,
            idle: Duration::from_secs(config.idle_clear_secs),
        }
    }

    /// Acquire an empty buffer with room for at least `min_capacity` elements.
    pub fn acquire(&self, min_capacity: usize) -> Vec<T> {
        let mut g = self.inner.lock();
        g.cleanup(self.idle);
        g.acquire(min_capacity)
    }

    /// Return a buffer for reuse. Returns `false` when it was dropped instead.
    pub fn release(&self, buf: Vec<T>) -> bool {
        self.inner
            .lock()
            .release(buf, self.retain_ceiling, self.max_entries)
    }

    pub fn retain_ceiling(&self) -> usize {
        self.retain_ceiling
    }

    /// Pool statistics.
    pub fn stats(&self) -> PoolStats {
        let g = self.inner.lock();
        PoolStats {
            entries: g.free.len(),
            retained_elements: g.retained,
            hits: g.hits,
            misses: g.misses,
        }
    }
}

impl<T: Copy + Default> SampleBufferPool<T> {
    /// Acquire a buffer of exactly `len` default-valued elements.
    pub fn acquire_filled(&self, len: usize) -> Vec<T> {
        let mut buf = self.acquire(len);
        buf.resize(len, T::default());
        buf
    }
}

impl<T> Default for SampleBufferPool<T> {
    fn default() -> Self {
        Self::new(&PoolConfig::default())
    }
}

/// Snapshot of pool health.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PoolStats {
    pub entries: usize,
    pub retained_elements: usize,
    pub hits: u64,
    pub misses: u64,
}
