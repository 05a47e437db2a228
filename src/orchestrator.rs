//! Ties the Ring Buffer, Reader, DSP Pipeline, Writer and Sidecar Emitter
//! together into one capture run (spec.md §4.6).

use std::path::PathBuf;
use std::sync::Arc;
use std::thread;
use std::time::Duration;

use crate::cli::Args;
use crate::clock::{self, TickSchedule};
use crate::dsp::{DspPipeline, HALF};
use crate::error::{CaptureError, Result};
use crate::ring_buffer::RingBuffer;
use crate::sdr::device::SAMPLE_RATE_HZ;
use crate::sdr::{Reader, SdrDevice};
use crate::sidecar;
use crate::writer::Writer;

const RING_CAPACITY: usize = 25_000;
pub const N_ITER: u32 = 3600;
const PRIME_DELAY: Duration = Duration::from_secs(1);
const READER_SHUTDOWN_GRACE: Duration = Duration::from_secs(1);

/// `schedule_times` must be parsed from `args.schedule_time` (same length,
/// same order) before calling this; CLI-level parse failures are handled by
/// the caller and never reach the capture error taxonomy.
pub fn run(
    args: Args,
    schedule_times: Vec<chrono::NaiveTime>,
    device: impl SdrDevice + 'static,
    data_dir: PathBuf,
    config_path: PathBuf,
) -> Result<()> {
    run_with_iterations(args, schedule_times, device, data_dir, config_path, N_ITER)
}

/// Same lifecycle as [`run`], with the per-capture tick count overridable —
/// used by integration tests to exercise the full path in milliseconds
/// instead of the fixed 15-minute, 3600-tick production capture.
pub fn run_with_iterations(
    args: Args,
    schedule_times: Vec<chrono::NaiveTime>,
    device: impl SdrDevice + 'static,
    data_dir: PathBuf,
    config_path: PathBuf,
    n_iter: u32,
) -> Result<()> {
    std::fs::create_dir_all(&data_dir).map_err(|e| CaptureError::TempDir {
        path: data_dir.display().to_string(),
        source: e,
    })?;

    let ring = Arc::new(RingBuffer::new(RING_CAPACITY));
    let reader = Reader::start(device, ring.clone());

    log::info!("priming ring buffer for {:?}", PRIME_DELAY);
    thread::sleep(PRIME_DELAY);

    let bin_width = SAMPLE_RATE_HZ / crate::ring_buffer::FFT_SIZE as f64;
    let freq_axis: [f64; HALF] = std::array::from_fn(|i| (HALF - 1 - i) as f64 * bin_width);
    sidecar::write_freq_bin(&data_dir, &freq_axis).map_err(|e| CaptureError::DiskWrite {
        path: data_dir.join("freq.bin").display().to_string(),
        source: e,
    })?;

    let mut dsp = DspPipeline::new(args.transform_mode());

    for (tag, schedule) in args.schedule_time.iter().zip(schedule_times.iter()) {
        log::info!("capture for schedule time {tag} starting");
        clock::sleep_until_schedule(*schedule);

        sidecar::write_time_bin(&data_dir, tag, *schedule, n_iter).map_err(|e| {
            CaptureError::DiskWrite {
                path: data_dir.join(format!("time_{tag}.bin")).display().to_string(),
                source: e,
            }
        })?;
        sidecar::write_header_txt(&data_dir, tag, *schedule, n_iter).map_err(|e| {
            CaptureError::DiskWrite {
                path: data_dir.join(format!("header_{tag}.txt")).display().to_string(),
                source: e,
            }
        })?;

        let writer = Writer::open(&data_dir, tag, config_path.clone(), tag.clone())
            .map_err(|e| CaptureError::DiskWrite {
                path: data_dir.join(format!("fft_data_{tag}.bin")).display().to_string(),
                source: e,
            })?;

        dsp.reset_capture_state();
        run_capture(&mut dsp, &ring, args.integration, &writer, n_iter)?;
        writer.close()?;

        log::info!("capture for schedule time {tag} complete");
    }

    thread::sleep(READER_SHUTDOWN_GRACE);
    reader.stop();
    Ok(())
}

fn run_capture(
    dsp: &mut DspPipeline,
    ring: &RingBuffer,
    n_integration: usize,
    writer: &Writer,
    n_iter: u32,
) -> Result<()> {
    let tick_times = TickSchedule::starting_now();
    let mut durations = Vec::with_capacity(n_iter as usize);

    for n in 0..n_iter {
        tick_times.wait_for(n);
        let tick_start = std::time::Instant::now();

        let row = dsp.process_tick(ring, n_integration);
        writer.push(row)?;

        durations.push(tick_start.elapsed());
        if n % 4 == 0 {
            log::debug!("tick {n}/{n_iter} complete");
        }
    }

    log_timing_stats(&durations);
    Ok(())
}

fn log_timing_stats(durations: &[Duration]) {
    if durations.is_empty() {
        return;
    }
    let mut secs: Vec<f64> = durations.iter().map(Duration::as_secs_f64).collect();
    secs.sort_by(|a, b| a.partial_cmp(b).unwrap());

    let sum: f64 = secs.iter().sum();
    let mean = sum / secs.len() as f64;
    let median = secs[secs.len() / 2];
    let min = secs[0];
    let max = secs[secs.len() - 1];

    log::info!(
        "tick timing: mean={mean:.4}s median={median:.4}s min={min:.4}s max={max:.4}s"
    );
}
