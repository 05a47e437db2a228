//! CLI surface (spec.md §6), parsed with `clap`'s derive API — grounded on
//! `qbzd`'s `clap = { features = ["derive"] }` usage, since the teacher
//! workspace's own crates are BASS plugins with no CLI surface of their own.

use chrono::NaiveTime;
use clap::Parser;

use crate::dsp::TransformMode;

#[derive(Parser, Debug)]
#[command(name = "rx888-dynspec", about = "Wideband SDR dynamic spectrum capture core")]
pub struct Args {
    /// Number of FFTs to average per 250 ms tick (n_integration).
    #[arg(short = 'i', long = "integration")]
    pub integration: usize,

    /// Comma-separated HH:MM:SS wall-clock start times, processed in order.
    #[arg(short = 't', long = "schedule_time", value_delimiter = ',')]
    pub schedule_time: Vec<String>,

    /// Amplitude-shaping transform mode (§4.3 step 10).
    #[arg(short = 'd', long = "data_transform_mode", default_value = "0")]
    pub data_transform_mode: u8,
}

impl Args {
    pub fn transform_mode(&self) -> TransformMode {
        TransformMode::from_index(self.data_transform_mode)
    }

    /// Parses each `-t` entry as `HH:MM:SS`, failing fast on malformed input.
    pub fn schedule_times(&self) -> Result<Vec<NaiveTime>, String> {
        self.schedule_time
            .iter()
            .map(|s| {
                NaiveTime::parse_from_str(s.trim(), "%H:%M:%S")
                    .map_err(|e| format!("invalid --schedule-time '{s}': {e}"))
            })
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn comma_separated_schedule_times_parse_in_order() {
        let args = Args {
            integration: 4,
            schedule_time: vec!["09:00:00".into(), "13:30:00".into()],
            data_transform_mode: 0,
        };
        let times = args.schedule_times().unwrap();
        assert_eq!(times.len(), 2);
        assert!(times[0] < times[1]);
    }

    #[test]
    fn malformed_schedule_time_is_rejected() {
        let args = Args {
            integration: 4,
            schedule_time: vec!["not-a-time".into()],
            data_transform_mode: 0,
        };
        assert!(args.schedule_times().is_err());
    }
}
