//! Sidecar Emitter: writes `freq.bin`, `time_<tag>.bin` and
//! `header_<tag>.txt` ahead of each capture's DSP pass (spec.md §4.5).

use std::fs::File;
use std::io::{self, Write};
use std::path::Path;

use chrono::{NaiveTime, TimeZone};

use crate::dsp::HALF;

/// Writes the frequency axis once per process (shared by every capture in
/// the invocation, since it depends only on the fixed sample rate and
/// `FFT_SIZE`). `bins` are the positive-frequency bin centers in Hz, already
/// flipped to match `SpectrumRow` orientation (index 0 = highest frequency).
pub fn write_freq_bin(data_dir: &Path, bins: &[f64; HALF]) -> io::Result<()> {
    write_f64_le(&data_dir.join("freq.bin"), bins)
}

/// Writes `n_iter` POSIX-epoch timestamps at 0.25 s spacing, anchored at the
/// scheduled start time combined with today's date (not wall-clock start,
/// per spec.md §8 scenario 5).
pub fn write_time_bin(data_dir: &Path, tag: &str, schedule: NaiveTime, n_iter: u32) -> io::Result<()> {
    let today = chrono::Local::now().date_naive();
    let start = chrono::Local
        .from_local_datetime(&today.and_time(schedule))
        .single()
        .expect("local schedule time must resolve to a single instant");

    let times: Vec<f64> = (0..n_iter)
        .map(|n| start.timestamp() as f64 + start.timestamp_subsec_nanos() as f64 * 1e-9
            + f64::from(n) * crate::clock::TICK.as_secs_f64())
        .collect();

    write_f64_le(&data_dir.join(format!("time_{tag}.bin")), &times)
}

/// Writes the five-line header text file described in spec.md §3.
pub fn write_header_txt(
    data_dir: &Path,
    tag: &str,
    schedule: NaiveTime,
    n_iter: u32,
) -> io::Result<()> {
    let today = chrono::Local::now().date_naive();
    let start = chrono::Local
        .from_local_datetime(&today.and_time(schedule))
        .single()
        .expect("local schedule time must resolve to a single instant");
    // `end` is the timestamp of the last emitted sample (n_iter - 1 ticks
    // after `start`), matching the last entry of `time_<tag>.bin`.
    let end = start + crate::clock::TICK * (n_iter - 1);

    let start_of_day = start
        .time()
        .signed_duration_since(NaiveTime::from_hms_opt(0, 0, 0).unwrap())
        .num_seconds();

    let mut file = File::create(data_dir.join(format!("header_{tag}.txt")))?;
    writeln!(file, "{}", start.format("%Y/%m/%d"))?;
    writeln!(file, "{}", start.format("%H:%M:%S%.3f"))?;
    writeln!(file, "{}", end.format("%Y/%m/%d"))?;
    writeln!(file, "{}", end.format("%H:%M:%S%.3f"))?;
    writeln!(file, "{start_of_day}")?;
    Ok(())
}

fn write_f64_le(path: &Path, values: &[f64]) -> io::Result<()> {
    let mut file = File::create(path)?;
    let mut bytes = Vec::with_capacity(values.len() * 8);
    for v in values {
        bytes.extend_from_slice(&v.to_le_bytes());
    }
    file.write_all(&bytes)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use std::io::Read;

    fn tempdir() -> std::path::PathBuf {
        let dir = std::env::temp_dir().join(format!(
            "rx888-dynspec-sidecar-test-{}-{}",
            std::process::id(),
            line!()
        ));
        fs::create_dir_all(&dir).unwrap();
        dir
    }

    #[test]
    fn freq_bin_round_trips_flipped_values() {
        let dir = tempdir();
        let bins: [f64; HALF] = std::array::from_fn(|i| i as f64 * 1000.0);
        write_freq_bin(&dir, &bins).unwrap();

        let mut raw = Vec::new();
        File::open(dir.join("freq.bin")).unwrap().read_to_end(&mut raw).unwrap();
        assert_eq!(raw.len(), HALF * 8);
        let first = f64::from_le_bytes(raw[0..8].try_into().unwrap());
        assert_eq!(first, 0.0);

        fs::remove_dir_all(&dir).unwrap();
    }

    #[test]
    fn time_bin_has_n_iter_samples_spaced_quarter_second() {
        let dir = tempdir();
        let schedule = NaiveTime::from_hms_opt(10, 0, 0).unwrap();
        write_time_bin(&dir, "10:00:00", schedule, 4).unwrap();

        let mut raw = Vec::new();
        File::open(dir.join("time_10:00:00.bin"))
            .unwrap()
            .read_to_end(&mut raw)
            .unwrap();
        assert_eq!(raw.len(), 4 * 8);

        let values: Vec<f64> = raw
            .chunks_exact(8)
            .map(|c| f64::from_le_bytes(c.try_into().unwrap()))
            .collect();
        for pair in values.windows(2) {
            assert!((pair[1] - pair[0] - 0.25).abs() < 1e-9);
        }

        fs::remove_dir_all(&dir).unwrap();
    }

    #[test]
    fn header_has_five_lines() {
        let dir = tempdir();
        let schedule = NaiveTime::from_hms_opt(9, 30, 0).unwrap();
        write_header_txt(&dir, "9:30:00", schedule, 3600).unwrap();

        let content = fs::read_to_string(dir.join("header_9:30:00.txt")).unwrap();
        let lines: Vec<&str> = content.lines().collect();
        assert_eq!(lines.len(), 5);
        assert_eq!(lines[4], "34200");

        fs::remove_dir_all(&dir).unwrap();
    }
}
