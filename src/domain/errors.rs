use crate::domain::models::Status;
use std::error::Error as _;

#[derive(thiserror::Error, Debug, Clone, PartialEq, Eq)]
pub enum TransportError {
    #[error("request to {url} timed out")]
    Timeout { url: String },
    #[error("TLS failure talking to {url}: {detail}")]
    Tls { url: String, detail: String },
    #[error("could not resolve host for {url}")]
    Dns { url: String },
    #[error("connection to {url} failed: {detail}")]
    Connect { url: String, detail: String },
    #[error("response from {url} is not valid JSON: {detail}")]
    Decode { url: String, detail: String },
    #[error("request to {url} failed: {detail}")]
    Other { url: String, detail: String },
}

impl TransportError {
    pub fn from_reqwest(url: &str, err: &reqwest::Error) -> Self {
        let url = url.to_string();
        let detail = error_chain(err);
        // The top-level message repeats the request URL; only causes are inspected.
        let causes = err
            .source()
            .map(|s| error_chain(s).to_ascii_lowercase())
            .unwrap_or_default();
        if err.is_timeout() {
            TransportError::Timeout { url }
        } else if causes.contains("certificate") || causes.contains("tls") {
            TransportError::Tls { url, detail }
        } else if causes.contains("dns error") || causes.contains("failed to lookup address") {
            TransportError::Dns { url }
        } else if err.is_connect() {
            TransportError::Connect { url, detail }
        } else if err.is_decode() {
            TransportError::Decode { url, detail }
        } else {
            TransportError::Other { url, detail }
        }
    }
}

fn error_chain(err: &dyn std::error::Error) -> String {
    let mut parts = vec![err.to_string()];
    let mut source = err.source();
    while let Some(s) = source {
        parts.push(s.to_string());
        source = s.source();
    }
    parts.join(": ")
}

/// Pipeline step a failure is attributed to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Step {
    Search,
    Record,
    Schema,
    Validation,
    Files,
}

impl std::fmt::Display for Step {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let s = match self {
            Step::Search => "search",
            Step::Record => "record",
            Step::Schema => "schema",
            Step::Validation => "validation",
            Step::Files => "files",
        };
        f.write_str(s)
    }
}

#[derive(thiserror::Error, Debug, Clone, PartialEq, Eq)]
pub enum ProbeError {
    #[error("{step}: {source}")]
    Transport {
        step: Step,
        #[source]
        source: TransportError,
    },
    #[error("{step}: HTTP {status} from {url}")]
    Http { step: Step, status: u16, url: String },
    #[error("unrecognised B2SHARE API dialect: {0}")]
    UnknownDialect(String),
    #[error("It seems that there are no records stored in this B2SHARE instance")]
    NoRecords,
    #[error("{step}: {0}", step = Step::Record)]
    RecordFormat(String),
    #[error("{step}: {0}", step = Step::Schema)]
    SchemaResolution(String),
    #[error("{step}: metadata does not match schema: {0}", step = Step::Validation)]
    MetadataInvalid(String),
    #[error("{step}: {0}", step = Step::Files)]
    FileAccess(String),
}

impl ProbeError {
    pub fn status(&self) -> Status {
        match self {
            ProbeError::UnknownDialect(_) => Status::Unknown,
            _ => Status::Critical,
        }
    }

    /// Retags a network failure with the step that issued the call.
    pub fn at(self, step: Step) -> Self {
        match self {
            ProbeError::Transport { source, .. } => ProbeError::Transport { step, source },
            ProbeError::Http { status, url, .. } => ProbeError::Http { step, status, url },
            other => other,
        }
    }
}
