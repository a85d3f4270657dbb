use crate::domain::models::ProbeConfig;
use tracing_subscriber::EnvFilter;

fn level(verbosity: u8) -> &'static str {
    match verbosity {
        0 => "warn",
        1 => "info",
        2 => "debug",
        _ => "trace",
    }
}

pub fn filter_directives(config: &ProbeConfig) -> String {
    let mut directives = vec!["warn".to_string()];
    if config.verbosity > 0 {
        directives.push(format!(
            "{}={}",
            env!("CARGO_CRATE_NAME"),
            level(config.verbosity)
        ));
    }
    if config.debug_metadata {
        directives.push("vocabulary=debug".to_string());
    }
    if config.metadata_report {
        directives.push("metadata_report=info".to_string());
    }
    directives.join(",")
}

/// Trace output goes to stderr; stdout is reserved for the status line.
pub fn init_tracing(config: &ProbeConfig) -> anyhow::Result<()> {
    let filter = EnvFilter::try_from_default_env()
        .or_else(|_| EnvFilter::try_new(filter_directives(config)))?;
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .without_time()
        .with_target(false)
        .with_level(false)
        .try_init()
        .map_err(|e| anyhow::anyhow!(e.to_string()))?;
    Ok(())
}
