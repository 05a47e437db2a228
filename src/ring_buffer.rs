//! Most-recent-N ring buffer for fixed-length sample blocks.
//!
//! Single producer (the SDR reader thread) appends blocks; single consumer
//! (the DSP pipeline) drains them newest-first. Overwrite-on-full: once the
//! buffer holds `capacity` blocks, the oldest is silently evicted by the
//! next append.
//!
//! Uses the mutex-guarded-deque alternative spec.md §9 explicitly sanctions
//! (over the sequence-numbered slot array) because `pop_newest` must match
//! `collections.deque.pop()` exactly: an interleaved sequence of appends and
//! pops shrinks and grows the live set in a path-dependent way that a plain
//! epoch counter cannot reconstruct once pops have happened out of step with
//! appends. `VecDeque::push_back`/`pop_back`/`pop_front` give that directly,
//! and the critical section is a handful of pointer moves, matching the
//! "short critical sections" the spec calls for.

use std::collections::VecDeque;
use std::sync::Mutex;

pub const FFT_SIZE: usize = 512;

pub type SampleBlock = [i16; FFT_SIZE];

/// Bounded, overwrite-on-full, LIFO-drain container of sample blocks.
pub struct RingBuffer {
    capacity: usize,
    inner: Mutex<VecDeque<SampleBlock>>,
}

impl RingBuffer {
    pub fn new(capacity: usize) -> Self {
        assert!(capacity > 0, "ring buffer capacity must be nonzero");
        Self {
            capacity,
            inner: Mutex::new(VecDeque::with_capacity(capacity)),
        }
    }

    /// Appends a copy of `block`. Never blocks on I/O; evicts the oldest
    /// live block if the buffer is already at capacity.
    pub fn append(&self, block: &SampleBlock) {
        let mut q = self.inner.lock().unwrap();
        if q.len() == self.capacity {
            q.pop_front();
        }
        q.push_back(*block);
    }

    /// Pops the most recently appended block not yet popped. Returns `None`
    /// once every live block has been drained.
    pub fn pop_newest(&self) -> Option<SampleBlock> {
        self.inner.lock().unwrap().pop_back()
    }

    pub fn capacity(&self) -> usize {
        self.capacity
    }

    /// Number of live (appended but not yet evicted or popped) blocks.
    pub fn len(&self) -> u64 {
        self.inner.lock().unwrap().len() as u64
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}
