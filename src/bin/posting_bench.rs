use log::{error, info};
use measure_time::info_time;
use posting_codec_bench::{get_logger, BenchConfig, BenchError, BenchRunner};
use std::path::PathBuf;
use std::process::ExitCode;

fn load_config() -> Result<BenchConfig, BenchError> {
    match std::env::args_os().nth(1).map(PathBuf::from) {
        Some(config_dir) => {
            info!("Loading bench config from {:?}", config_dir);
            BenchConfig::load(&config_dir)
        }
        None => Ok(BenchConfig::default()),
    }
}

fn run() -> Result<(), BenchError> {
    let config = load_config()?;
    info_time!("posting codec bench");
    let reports = BenchRunner::run(&config)?;
    for report in &reports {
        println!("{}", report);
    }
    Ok(())
}

fn main() -> ExitCode {
    get_logger().init();
    match run() {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            error!("Posting bench failed: {}", e);
            ExitCode::FAILURE
        }
    }
}
