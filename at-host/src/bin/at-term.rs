//! at-term: type AT commands on stdin, read the answers on stdout
//!
//! ```text
//! $ at-term --log-level debug
//! AT+LED_ON=1
//! [OK]
//! ```

use std::path::PathBuf;

use at_core::{RingBuffer, RX_BUFFER_SIZE};
use at_host::{run, HostConfig, HostError};
use clap::Parser;

/// Receive queue shared between the input feeder and the command loop
static RX: RingBuffer<RX_BUFFER_SIZE> = RingBuffer::new();

#[derive(Parser, Debug)]
#[command(name = "at-term", version, about = "AT command terminal simulator")]
struct Args {
    /// JSON config file
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Log filter, overrides the config file (e.g. `debug`, `at_core=trace`)
    #[arg(short, long)]
    log_level: Option<String>,

    /// Quiet time in milliseconds before queued input is processed
    #[arg(long)]
    quiet_gap_ms: Option<u64>,

    /// Print run totals as JSON on stderr at exit
    #[arg(long)]
    stats: bool,
}

#[tokio::main(flavor = "current_thread")]
async fn main() -> Result<(), HostError> {
    let args = Args::parse();

    let mut config = match &args.config {
        Some(path) => HostConfig::load(path)?,
        None => HostConfig::default(),
    };
    if let Some(level) = args.log_level {
        config.log_level = level;
    }
    if let Some(gap) = args.quiet_gap_ms {
        config.quiet_gap_ms = gap;
    }

    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(&config.log_level))
        .init();
    log::debug!("config: {:?}", config);

    let report = run(tokio::io::stdin(), tokio::io::stdout(), &RX, &config).await?;

    if args.stats {
        eprintln!("{}", report.to_json()?);
    }
    Ok(())
}
