use crate::domain::models::{ProbeConfig, SelectionPolicy, MAX_VERBOSITY};
use clap::{ArgAction, Parser};
use std::time::Duration;

#[derive(Parser, Debug)]
#[command(
    name = "check_b2share",
    version,
    about = "Nagios probe checking the health and availability of a B2SHARE (v2 or RDM) instance"
)]
pub struct Cli {
    #[arg(short, long, help = "Base URL of the B2SHARE instance")]
    pub url: String,
    #[arg(
        short,
        long,
        default_value_t = 15,
        help = "Timeout for each HTTP request in seconds"
    )]
    pub timeout: u64,
    #[arg(short, long, action = ArgAction::Count, help = "Increase output verbosity (-v, -vv, -vvv)")]
    pub verbose: u8,
    #[arg(
        long,
        overrides_with = "no_verify_tls_cert",
        help = "Verify the TLS certificate (default)"
    )]
    pub verify_tls_cert: bool,
    #[arg(
        long,
        overrides_with = "verify_tls_cert",
        help = "Do not verify the TLS certificate (NOT recommended)"
    )]
    pub no_verify_tls_cert: bool,
    #[arg(long, help = "Return CRITICAL if no public records are present")]
    pub error_if_no_records_present: bool,
    #[arg(long, help = "Allow requests to use proxies from the environment")]
    pub use_proxy: bool,
    #[arg(
        long,
        help = "Fail on vocabulary enrichment keys instead of ignoring them (v3 only)"
    )]
    pub strict_metadata: bool,
    #[arg(long, help = "Print every ignored vocabulary key to stderr (v3 only)")]
    pub debug_metadata: bool,
    #[arg(long, help = "Print a count of vocabulary-like keys to stderr (v3 only)")]
    pub metadata_report: bool,
    #[arg(
        long,
        value_enum,
        default_value_t = SelectionPolicy::PreferFiles,
        help = "Which record of the search page to check"
    )]
    pub record_selection: SelectionPolicy,
    #[arg(long, default_value_t = 10, help = "Number of records requested by the search")]
    pub search_size: u32,
    #[arg(
        long,
        value_delimiter = ',',
        help = "Comma separated vocabulary enrichment keys to ignore (default: icon,props,tags)"
    )]
    pub vocabulary_keys: Option<Vec<String>>,
}

#[derive(thiserror::Error, Debug)]
pub enum ConfigError {
    #[error("Invalid URL syntax {0}")]
    InvalidUrl(String),
    #[error("Timeout must be >= 1")]
    Timeout,
    #[error("Search size must be >= 1")]
    SearchSize,
}

fn valid_url(raw: &str) -> bool {
    match url::Url::parse(raw) {
        Ok(u) => matches!(u.scheme(), "http" | "https") && u.host().is_some(),
        Err(_) => false,
    }
}

impl TryFrom<&Cli> for ProbeConfig {
    type Error = ConfigError;

    fn try_from(cli: &Cli) -> Result<Self, Self::Error> {
        if !valid_url(&cli.url) {
            return Err(ConfigError::InvalidUrl(cli.url.clone()));
        }
        if cli.timeout < 1 {
            return Err(ConfigError::Timeout);
        }
        if cli.search_size < 1 {
            return Err(ConfigError::SearchSize);
        }
        Ok(ProbeConfig {
            url: cli.url.trim_end_matches('/').to_string(),
            timeout: Duration::from_secs(cli.timeout),
            verbosity: cli.verbose.min(MAX_VERBOSITY),
            verify_tls: !cli.no_verify_tls_cert,
            use_proxy: cli.use_proxy,
            error_if_empty: cli.error_if_no_records_present,
            strict_metadata: cli.strict_metadata,
            debug_metadata: cli.debug_metadata,
            metadata_report: cli.metadata_report,
            selection: cli.record_selection,
            search_size: cli.search_size,
            vocabulary_keys: cli.vocabulary_keys.clone(),
        })
    }
}
