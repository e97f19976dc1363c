use anyhow::{Context, Result};
use clap::Parser;
use sqljudge_core::report::JsonStream;
use sqljudge_core::{judge, load_config, parse_config, JudgeConfig};
use std::io::Read;
use tracing_subscriber::{fmt, EnvFilter};

mod cli;

use cli::args::Cli;

const CONFIG_ERROR: i32 = 2;
const OUTPUT_ERROR: i32 = 3;

fn init_logging(log_level: &str) {
    let filter = EnvFilter::try_new(log_level).unwrap_or_else(|_| EnvFilter::new("warn"));

    // stdout carries the feedback stream
    fmt()
        .with_env_filter(filter)
        .json()
        .with_timer(fmt::time::UtcTime::rfc_3339())
        .with_target(true)
        .with_current_span(false)
        .with_span_list(false)
        .with_writer(std::io::stderr)
        .init();
}

fn read_config(cli: &Cli) -> Result<JudgeConfig> {
    let config = match &cli.config {
        Some(path) => load_config(path)?,
        None => {
            let mut raw = String::new();
            std::io::stdin()
                .read_to_string(&mut raw)
                .context("failed to read config from stdin")?;
            parse_config(&raw)?
        }
    };
    Ok(config)
}

fn main() {
    let cli = Cli::parse();
    init_logging(&cli.log_level);

    let config = match read_config(&cli) {
        Ok(config) => config,
        Err(e) => {
            tracing::error!(event = "cli.config.invalid", error = %e);
            eprintln!("fatal: {e:#}");
            std::process::exit(CONFIG_ERROR);
        }
    };

    let mut stream = JsonStream::new(std::io::stdout().lock());
    let verdict = judge(&config, &mut stream);
    tracing::info!(
        event = "cli.judged",
        accepted = verdict.accepted,
        status = ?verdict.status.kind
    );

    if let Err(e) = stream.finish() {
        eprintln!("fatal: {e:#}");
        std::process::exit(OUTPUT_ERROR);
    }
}
