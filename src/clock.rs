//! Absolute-deadline tick scheduling.
//!
//! Grounded on `Aes67OutputStream::transmitter_loop`'s `next_tx` pattern in
//! `output/stream.rs`: deadlines are computed from a fixed reference instant
//! plus `n * interval`, never by adding interval to "now", so a late tick
//! never compounds drift into the following ones.

use std::thread;
use std::time::{Duration, Instant};

pub const TICK: Duration = Duration::from_millis(250);

/// Drives a sequence of absolute deadlines spaced `TICK` apart starting at
/// the instant the schedule was created.
pub struct TickSchedule {
    start: Instant,
}

impl TickSchedule {
    /// Captures `start_loop` as "now". Call this immediately before the
    /// first tick, per spec.md §4.3 step 1.
    pub fn starting_now() -> Self {
        Self {
            start: Instant::now(),
        }
    }

    pub fn start(&self) -> Instant {
        self.start
    }

    /// Absolute deadline for tick `n`.
    pub fn deadline(&self, n: u32) -> Instant {
        self.start + TICK * n
    }

    /// Blocks until `deadline(n)`. A deadline already in the past is a no-op
    /// (no catch-up compounding): the next tick simply starts immediately.
    pub fn wait_for(&self, n: u32) {
        let deadline = self.deadline(n);
        let now = Instant::now();
        if deadline > now {
            thread::sleep(deadline - now);
        }
    }
}

/// Resolves a `HH:MM:SS` schedule time against today's date into a concrete
/// instant to sleep until. Mirrors the original's `datetime.combine(today,
/// target_time)`; a schedule time already in the past yields a zero sleep
/// rather than sleeping negatively (spec.md §8 scenario 5).
pub fn sleep_until_schedule(schedule: chrono::NaiveTime) {
    let now = chrono::Local::now();
    let target = now.date_naive().and_time(schedule);
    let target = chrono::Local
        .from_local_datetime(&target)
        .single()
        .unwrap_or(now);

    let delta = target.signed_duration_since(now);
    if let Ok(sleep_for) = delta.to_std() {
        log::info!("sleeping {:.2}s until {}", sleep_for.as_secs_f64(), schedule);
        thread::sleep(sleep_for);
    }
}

use chrono::TimeZone;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn deadlines_are_spaced_one_tick_apart() {
        let sched = TickSchedule::starting_now();
        let d0 = sched.deadline(0);
        let d1 = sched.deadline(1);
        assert_eq!(d1 - d0, TICK);
    }

    #[test]
    fn nth_deadline_is_start_plus_n_ticks() {
        let sched = TickSchedule::starting_now();
        assert_eq!(sched.deadline(4), sched.start() + TICK * 4);
    }
}
