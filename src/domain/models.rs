use serde_json::Value;
use std::collections::HashMap;
use std::time::Duration;

/// Highest verbosity level recognised by the plugin guidelines.
pub const MAX_VERBOSITY: u8 = 3;

/// Nagios plugin status. The discriminant is the process exit code.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Status {
    Ok = 0,
    #[allow(dead_code)]
    Warning = 1,
    Critical = 2,
    Unknown = 3,
}

impl Status {
    pub fn exit_code(self) -> i32 {
        self as i32
    }

    pub fn label(self) -> &'static str {
        match self {
            Status::Ok => "OK",
            Status::Warning => "WARNING",
            Status::Critical => "CRITICAL",
            Status::Unknown => "UNKNOWN",
        }
    }
}

impl std::fmt::Display for Status {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.label())
    }
}

/// How the record under test is picked from the search page.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, clap::ValueEnum)]
pub enum SelectionPolicy {
    /// First record that declares files, else the first record.
    #[default]
    PreferFiles,
    /// Always the first record.
    First,
}

#[derive(Debug, Clone)]
pub struct ProbeConfig {
    /// Base URL without a trailing slash.
    pub url: String,
    pub timeout: Duration,
    pub verbosity: u8,
    pub verify_tls: bool,
    pub use_proxy: bool,
    pub error_if_empty: bool,
    pub strict_metadata: bool,
    pub debug_metadata: bool,
    pub metadata_report: bool,
    pub selection: SelectionPolicy,
    pub search_size: u32,
    /// Replaces the default vocabulary enrichment keys when set.
    pub vocabulary_keys: Option<Vec<String>>,
}

impl ProbeConfig {
    #[cfg(test)]
    pub fn for_url(url: &str) -> Self {
        Self {
            url: url.trim_end_matches('/').to_string(),
            timeout: Duration::from_secs(15),
            verbosity: 0,
            verify_tls: true,
            use_proxy: false,
            error_if_empty: false,
            strict_metadata: false,
            debug_metadata: false,
            metadata_report: false,
            selection: SelectionPolicy::PreferFiles,
            search_size: 10,
            vocabulary_keys: None,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ServiceDialect {
    /// Legacy B2SHARE (Invenio 1/2 based), Draft-04 schemas.
    V2,
    /// InvenioRDM based B2SHARE, Draft-07 record schemas.
    V3,
}

impl std::fmt::Display for ServiceDialect {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ServiceDialect::V2 => f.write_str("v2"),
            ServiceDialect::V3 => f.write_str("v3"),
        }
    }
}

#[derive(Debug, Clone)]
pub struct RecordSummary {
    pub id: Option<String>,
    pub self_link: Option<String>,
    pub has_files: bool,
}

#[derive(Debug, Clone, Default)]
pub struct SearchResult {
    pub total: u64,
    pub hits: Vec<RecordSummary>,
}

#[derive(Debug, Clone)]
pub struct Record {
    pub id: String,
    pub has_files: bool,
    pub file_bucket: Option<String>,
    pub metadata: Value,
    /// The whole record document as served by the record endpoint.
    pub document: Value,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SchemaDraft {
    Draft4,
    Draft7,
}

#[derive(Debug, Clone)]
pub struct MetadataSchema {
    pub url: String,
    pub draft: SchemaDraft,
    pub document: Value,
    /// Documents behind remote `$ref`s, keyed by URL without fragment.
    pub remote: HashMap<String, Value>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Violation {
    pub path: String,
    pub schema_path: String,
    pub message: String,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct IgnoredKey {
    pub path: String,
    pub reason: &'static str,
}

#[derive(Debug, Clone, Default)]
pub struct ValidationOutcome {
    pub violations: Vec<Violation>,
    /// Vocabulary keys stripped before validation (non-strict mode only).
    pub ignored: Vec<IgnoredKey>,
    /// Vocabulary-like keys seen in the metadata, regardless of mode.
    pub vocabulary_keys: usize,
    /// Violations located at a vocabulary-like key (strict mode only).
    pub flagged: usize,
}

impl ValidationOutcome {
    pub fn passed(&self) -> bool {
        self.violations.is_empty()
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProbeOutcome {
    pub status: Status,
    pub message: String,
    /// Steps that completed, in order.
    pub steps: Vec<&'static str>,
}

impl ProbeOutcome {
    pub fn status_line(&self) -> String {
        format!("{}: {}", self.status, self.message)
    }
}
