use crate::domain::errors::{ProbeError, Step};
use crate::domain::models::Record;
use crate::services::dialect::DialectProfile;
use crate::services::http::Transport;
use tracing::debug;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FileCheck {
    Accessible { url: String, status: u16 },
    /// The record declares no files.
    Skipped,
}

pub fn check(
    transport: &dyn Transport,
    profile: &dyn DialectProfile,
    record: &Record,
) -> Result<FileCheck, ProbeError> {
    if !record.has_files {
        debug!("Record has no files, skipping file bucket check.");
        return Ok(FileCheck::Skipped);
    }
    let bucket_url = record.file_bucket.as_deref().ok_or_else(|| {
        ProbeError::FileAccess(format!("record {} has no file bucket link", record.id))
    })?;

    debug!("Accessing file bucket of the record.");
    let bucket = transport
        .get_json(bucket_url)
        .map_err(|e| e.at(Step::Files))?;
    let first = profile
        .file_entries(&bucket)
        .and_then(|entries| entries.first())
        .ok_or_else(|| {
            ProbeError::FileAccess(format!("file bucket {} lists no files", bucket_url))
        })?;
    let url = profile.file_url(first).ok_or_else(|| {
        ProbeError::FileAccess(format!("first file in {} has no link", bucket_url))
    })?;

    debug!("Fetching first file of the bucket.");
    let status = transport.head(&url).map_err(|e| e.at(Step::Files))?;
    if !(200..300).contains(&status) {
        return Err(ProbeError::Http {
            step: Step::Files,
            status,
            url,
        });
    }
    Ok(FileCheck::Accessible { url, status })
}
