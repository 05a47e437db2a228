//! SDR Reader: owns the device handle, appends blocks to the ring on its own
//! thread. Grounded on `Aes67Stream`'s receiver-thread shape in
//! `input/stream.rs` (`Arc<AtomicBool>` running flag, atomic counters,
//! `JoinHandle` joined on stop) — this is the ONLY thread that writes to the
//! ring buffer, matching that file's single-writer discipline.

use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};
use std::sync::Arc;
use std::thread::{self, JoinHandle};
use std::time::Duration;

use crate::ring_buffer::RingBuffer;
use crate::sdr::device::{ReadOutcome, SdrDevice};

const BACKOFF: Duration = Duration::from_millis(1);

#[derive(Default)]
pub struct Counters {
    pub reads_ok: AtomicU64,
    pub reads_drop: AtomicU64,
}

pub struct Reader {
    running: Arc<AtomicBool>,
    handle: Option<JoinHandle<()>>,
    pub counters: Arc<Counters>,
}

impl Reader {
    /// Spawns the reader thread. `device` is moved onto that thread; it is
    /// the Reader's exclusive owner from this point on.
    pub fn start(mut device: impl SdrDevice + 'static, ring: Arc<RingBuffer>) -> Self {
        let running = Arc::new(AtomicBool::new(true));
        let counters = Arc::new(Counters::default());

        let thread_running = running.clone();
        let thread_counters = counters.clone();
        let handle = thread::spawn(move || {
            while thread_running.load(Ordering::Relaxed) {
                match device.read_stream() {
                    ReadOutcome::Full(block) => {
                        ring.append(&block);
                        thread_counters.reads_ok.fetch_add(1, Ordering::Relaxed);
                    }
                    ReadOutcome::Short => {
                        thread_counters.reads_drop.fetch_add(1, Ordering::Relaxed);
                        thread::sleep(BACKOFF);
                    }
                }
            }
            device.deactivate_stream();
            device.close_stream();
        });

        Self {
            running,
            handle: Some(handle),
            counters,
        }
    }

    /// Signals the reader to stop after its current iteration and joins it.
    pub fn stop(mut self) {
        self.running.store(false, Ordering::Relaxed);
        if let Some(handle) = self.handle.take() {
            let _ = handle.join();
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ring_buffer::FFT_SIZE;
    use crate::sdr::device::{NullSdr, SyntheticSdr};

    #[test]
    fn disabled_reader_never_appends_and_only_drops() {
        let ring = Arc::new(RingBuffer::new(4));
        let reader = Reader::start(NullSdr, ring.clone());
        thread::sleep(Duration::from_millis(20));
        reader.stop();

        assert_eq!(ring.len(), 0);
    }

    #[test]
    fn synthetic_device_fills_the_ring() {
        let ring = Arc::new(RingBuffer::new(4));
        let device = SyntheticSdr::new([7i16; FFT_SIZE]);
        let reader = Reader::start(device, ring.clone());
        thread::sleep(Duration::from_millis(20));
        let counters = reader.counters.clone();
        reader.stop();

        assert!(counters.reads_ok.load(Ordering::Relaxed) > 0);
        assert_eq!(ring.len(), 4);
    }
}
