use crate::domain::errors::{ProbeError, Step, TransportError};
use crate::domain::models::ProbeConfig;
use reqwest::header::ACCEPT;
use serde_json::Value;
use std::time::Duration;
use tracing::debug;

const USER_AGENT: &str = concat!("b2share-probe/", env!("CARGO_PKG_VERSION"), " (+nagios)");

/// Outbound calls the probe makes. Every call is bounded by its own timeout.
///
/// Errors are returned tagged with [`Step::Search`]; callers retag them with
/// [`ProbeError::at`].
pub trait Transport {
    fn get_json(&self, url: &str) -> Result<Value, ProbeError>;
    /// Returns the final status code after redirects.
    fn head(&self, url: &str) -> Result<u16, ProbeError>;
}

pub struct HttpClient {
    client: reqwest::blocking::Client,
}

impl HttpClient {
    pub fn new(config: &ProbeConfig) -> anyhow::Result<Self> {
        Self::with_timeout(config.timeout, config.verify_tls, config.use_proxy)
    }

    pub fn with_timeout(
        timeout: Duration,
        verify_tls: bool,
        use_proxy: bool,
    ) -> anyhow::Result<Self> {
        let mut builder = reqwest::blocking::Client::builder()
            .timeout(timeout)
            .user_agent(USER_AGENT)
            .danger_accept_invalid_certs(!verify_tls);
        if !use_proxy {
            builder = builder.no_proxy();
        }
        Ok(Self {
            client: builder.build()?,
        })
    }
}

fn transport(url: &str, err: &reqwest::Error) -> ProbeError {
    ProbeError::Transport {
        step: Step::Search,
        source: TransportError::from_reqwest(url, err),
    }
}

impl Transport for HttpClient {
    fn get_json(&self, url: &str) -> Result<Value, ProbeError> {
        debug!("Making a HTTP GET request to {}", url);
        let resp = self
            .client
            .get(url)
            .header(ACCEPT, "application/json")
            .send()
            .map_err(|e| transport(url, &e))?;
        let status = resp.status();
        if !status.is_success() {
            return Err(ProbeError::Http {
                step: Step::Search,
                status: status.as_u16(),
                url: url.to_string(),
            });
        }
        resp.json::<Value>().map_err(|e| transport(url, &e))
    }

    fn head(&self, url: &str) -> Result<u16, ProbeError> {
        debug!("Making a HTTP HEAD request to {}", url);
        let resp = self.client.head(url).send().map_err(|e| transport(url, &e))?;
        Ok(resp.status().as_u16())
    }
}
