use std::path::PathBuf;
use std::process::ExitCode;

use clap::Parser;

use rx888_dynspec::cli::Args;
use rx888_dynspec::{orchestrator, sdr};

fn main() -> ExitCode {
    env_logger::init();
    let args = Args::parse();

    let schedule_times = match args.schedule_times() {
        Ok(times) => times,
        Err(e) => {
            log::error!("{e}");
            return ExitCode::FAILURE;
        }
    };

    let device = match sdr::open_default() {
        Ok(device) => device,
        Err(e) => {
            log::error!("{e}");
            return ExitCode::FAILURE;
        }
    };

    let data_dir = PathBuf::from("temp_data");
    let config_path = PathBuf::from("config.cfg");

    match orchestrator::run(args, schedule_times, device, data_dir, config_path) {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            log::error!("{e}");
            ExitCode::FAILURE
        }
    }
}
