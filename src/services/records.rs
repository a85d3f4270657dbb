use crate::domain::errors::{ProbeError, Step};
use crate::domain::models::{ProbeConfig, Record, RecordSummary, SearchResult, SelectionPolicy};
use crate::services::http::Transport;
use serde::Deserialize;
use serde_json::Value;
use tracing::{debug, info};

pub fn search_url(config: &ProbeConfig) -> String {
    format!(
        "{}/api/records?sort=newest&size={}",
        config.url, config.search_size
    )
}

pub fn search(transport: &dyn Transport, config: &ProbeConfig) -> Result<SearchResult, ProbeError> {
    debug!("Making a search.");
    let body = transport
        .get_json(&search_url(config))
        .map_err(|e| e.at(Step::Search))?;
    let result = parse_search(&body)?;
    info!("hits: {}", result.total);
    Ok(result)
}

#[derive(Debug, Deserialize)]
struct SearchEnvelope {
    hits: HitsPage,
}

#[derive(Debug, Deserialize)]
struct HitsPage {
    #[serde(default)]
    total: Option<Total>,
    #[serde(default)]
    hits: Vec<Value>,
}

#[derive(Debug, Deserialize)]
#[serde(untagged)]
enum Total {
    Count(u64),
    Tracked { value: u64 },
}

pub fn parse_search(body: &Value) -> Result<SearchResult, ProbeError> {
    let envelope = SearchEnvelope::deserialize(body).map_err(|e| {
        ProbeError::RecordFormat(format!("unexpected search response: {}", e))
    })?;
    let hits: Vec<RecordSummary> = envelope.hits.hits.iter().map(summarize).collect();
    let total = match envelope.hits.total {
        Some(Total::Count(n)) | Some(Total::Tracked { value: n }) => n,
        None => hits.len() as u64,
    };
    Ok(SearchResult { total, hits })
}

fn summarize(hit: &Value) -> RecordSummary {
    let id = match hit.get("id") {
        Some(Value::String(s)) => Some(s.clone()),
        Some(Value::Number(n)) => Some(n.to_string()),
        _ => None,
    };
    RecordSummary {
        id,
        self_link: hit
            .pointer("/links/self")
            .and_then(Value::as_str)
            .map(str::to_string),
        has_files: declares_files(hit.get("files")),
    }
}

/// V2 hits carry a file list; V3 hits carry a `files` summary object.
pub fn declares_files(files: Option<&Value>) -> bool {
    match files {
        Some(Value::Array(a)) => !a.is_empty(),
        Some(Value::Object(o)) => {
            if let Some(count) = o.get("count").and_then(Value::as_u64) {
                count > 0
            } else if let Some(entries) = o.get("entries") {
                match entries {
                    Value::Array(a) => !a.is_empty(),
                    Value::Object(m) => !m.is_empty(),
                    _ => false,
                }
            } else {
                o.get("enabled").and_then(Value::as_bool).unwrap_or(false)
            }
        }
        _ => false,
    }
}

pub fn select(result: &SearchResult, policy: SelectionPolicy) -> Option<&RecordSummary> {
    let first = result.hits.first();
    match policy {
        SelectionPolicy::First => first,
        SelectionPolicy::PreferFiles => match result.hits.iter().find(|h| h.has_files) {
            Some(with_files) => {
                debug!("A record containing files was found.");
                Some(with_files)
            }
            None => {
                debug!("No records containing files were found.");
                debug!("Fetching a record without files.");
                first
            }
        },
    }
}

/// Fetches the full record behind a search hit.
pub fn fetch(
    transport: &dyn Transport,
    config: &ProbeConfig,
    summary: &RecordSummary,
) -> Result<Record, ProbeError> {
    let url = match (&summary.self_link, &summary.id) {
        (Some(link), _) => link.clone(),
        (None, Some(id)) => format!("{}/api/records/{}", config.url, id),
        (None, None) => {
            return Err(ProbeError::RecordFormat(
                "search hit has neither `links.self` nor `id`".to_string(),
            ))
        }
    };
    let document = transport.get_json(&url).map_err(|e| e.at(Step::Record))?;
    record_from_document(document, summary)
}

pub fn record_from_document(document: Value, summary: &RecordSummary) -> Result<Record, ProbeError> {
    let metadata = match document.get("metadata") {
        Some(m @ Value::Object(_)) => m.clone(),
        Some(Value::String(raw)) => serde_json::from_str::<Value>(raw)
            .ok()
            .filter(Value::is_object)
            .ok_or_else(|| {
                ProbeError::RecordFormat("record metadata is not a JSON object".to_string())
            })?,
        _ => {
            return Err(ProbeError::RecordFormat(
                "record has no metadata object".to_string(),
            ))
        }
    };
    let id = match document.get("id") {
        Some(Value::String(s)) => s.clone(),
        Some(Value::Number(n)) => n.to_string(),
        _ => summary.id.clone().unwrap_or_default(),
    };
    let file_bucket = document
        .pointer("/links/files")
        .and_then(Value::as_str)
        .map(str::to_string);
    Ok(Record {
        id,
        has_files: summary.has_files,
        file_bucket,
        metadata,
        document,
    })
}
