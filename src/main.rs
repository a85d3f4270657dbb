use clap::error::ErrorKind;
use clap::Parser;
use tracing::{debug, info};

mod cli;
mod commands;
mod domain;
mod logging;
mod services;

use cli::Cli;
use commands::run_check;
use domain::models::{ProbeConfig, Status};
use services::http::HttpClient;
use services::report;

const SEPARATOR: &str = "---------------------------";

fn main() {
    let code = match run() {
        Ok(status) => status.exit_code(),
        Err(e) => {
            println!("{}: {:#}", Status::Unknown, e);
            Status::Unknown.exit_code()
        }
    };
    std::process::exit(code);
}

fn run() -> anyhow::Result<Status> {
    let cli = match Cli::try_parse() {
        Ok(cli) => cli,
        Err(e) if matches!(e.kind(), ErrorKind::DisplayHelp | ErrorKind::DisplayVersion) => {
            e.print()?;
            return Ok(Status::Ok);
        }
        Err(e) => {
            eprint!("{}", e.render());
            println!("{}: invalid command line arguments", Status::Unknown);
            return Ok(Status::Unknown);
        }
    };
    let config = match ProbeConfig::try_from(&cli) {
        Ok(config) => config,
        Err(e) => {
            println!("{}: {}", Status::Unknown, e);
            return Ok(Status::Unknown);
        }
    };

    if let Err(e) = logging::init_tracing(&config) {
        eprintln!("tracing disabled: {:#}", e);
    }
    preamble(&config);

    let client = HttpClient::new(&config)?;
    let outcome = run_check(&client, &config);
    debug!("completed steps: {}", outcome.steps.join(", "));
    if config.verbosity > 0 {
        info!("{}", SEPARATOR);
    }
    report::print(&outcome, &mut std::io::stdout().lock())?;
    Ok(outcome.status)
}

fn preamble(config: &ProbeConfig) {
    if !config.verify_tls {
        debug!("TLS certificate verification: OFF");
    }
    debug!("Verbosity level: {}", config.verbosity);
    debug!("Timeout: {} seconds", config.timeout.as_secs());
    debug!("B2SHARE URL: {}", config.url);
    debug!("Starting B2SHARE Probe...");
    debug!("{}", SEPARATOR);
}
