//! API dialect detection and the per-dialect behaviour the pipeline branches on.

use crate::domain::errors::ProbeError;
use crate::domain::models::{SchemaDraft, ServiceDialect};
use serde_json::Value;

/// What differs between the two B2SHARE generations.
pub trait DialectProfile {
    fn dialect(&self) -> ServiceDialect;
    fn draft(&self) -> SchemaDraft;
    /// Where the record declares its schema.
    fn schema_url(&self, record: &Value) -> Option<String>;
    /// Turns the fetched schema document into the one metadata is validated against.
    fn metadata_schema(&self, fetched: Value) -> Result<Value, ProbeError>;
    /// Whether vocabulary enrichment can appear in this dialect's metadata.
    fn enriches_vocabulary(&self) -> bool;
    /// File entries of a bucket listing.
    fn file_entries<'a>(&self, bucket: &'a Value) -> Option<&'a Vec<Value>>;
    /// URL a HEAD request should be sent to for one file entry.
    fn file_url(&self, entry: &Value) -> Option<String>;
}

pub struct LegacyV2;
pub struct RdmV3;

fn str_at(v: &Value, pointer: &str) -> Option<String> {
    v.pointer(pointer).and_then(Value::as_str).map(str::to_string)
}

impl DialectProfile for LegacyV2 {
    fn dialect(&self) -> ServiceDialect {
        ServiceDialect::V2
    }

    fn draft(&self) -> SchemaDraft {
        SchemaDraft::Draft4
    }

    fn schema_url(&self, record: &Value) -> Option<String> {
        str_at(record, "/metadata/$schema")
    }

    fn metadata_schema(&self, fetched: Value) -> Result<Value, ProbeError> {
        if !fetched.is_object() {
            return Err(ProbeError::SchemaResolution(
                "schema document is not a JSON object".to_string(),
            ));
        }
        Ok(fetched)
    }

    fn enriches_vocabulary(&self) -> bool {
        false
    }

    fn file_entries<'a>(&self, bucket: &'a Value) -> Option<&'a Vec<Value>> {
        bucket.get("contents").and_then(Value::as_array)
    }

    fn file_url(&self, entry: &Value) -> Option<String> {
        str_at(entry, "/links/self")
    }
}

impl DialectProfile for RdmV3 {
    fn dialect(&self) -> ServiceDialect {
        ServiceDialect::V3
    }

    fn draft(&self) -> SchemaDraft {
        SchemaDraft::Draft7
    }

    fn schema_url(&self, record: &Value) -> Option<String> {
        str_at(record, "/$schema").or_else(|| str_at(record, "/links/$schema"))
    }

    fn metadata_schema(&self, fetched: Value) -> Result<Value, ProbeError> {
        crate::services::schema::derive_metadata_schema(&fetched, "metadata")
    }

    fn enriches_vocabulary(&self) -> bool {
        true
    }

    fn file_entries<'a>(&self, bucket: &'a Value) -> Option<&'a Vec<Value>> {
        bucket.get("entries").and_then(Value::as_array)
    }

    fn file_url(&self, entry: &Value) -> Option<String> {
        str_at(entry, "/links/content").or_else(|| str_at(entry, "/links/self"))
    }
}

pub fn profile(dialect: ServiceDialect) -> &'static dyn DialectProfile {
    match dialect {
        ServiceDialect::V2 => &LegacyV2,
        ServiceDialect::V3 => &RdmV3,
    }
}

/// Reads the dialect off a fetched record document. V3 markers are tried first.
pub fn detect(record: &Value) -> Result<ServiceDialect, ProbeError> {
    for dialect in [ServiceDialect::V3, ServiceDialect::V2] {
        if profile(dialect).schema_url(record).is_some() {
            return Ok(dialect);
        }
    }
    Err(ProbeError::UnknownDialect(
        "record declares no schema in `$schema`, `links.$schema` or `metadata.$schema`"
            .to_string(),
    ))
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn rdm_record_is_v3() {
        let rec = json!({
            "id": "abcd-1234",
            "links": {"self": "https://x/api/records/abcd-1234", "$schema": "https://x/schemas/records/record-v6.0.0.json"},
            "metadata": {"title": "T"}
        });
        assert_eq!(detect(&rec).unwrap(), ServiceDialect::V3);
    }

    #[test]
    fn top_level_schema_wins_over_metadata_schema() {
        let rec = json!({
            "$schema": "local://records/record-v6.0.0.json",
            "metadata": {"$schema": "https://x/api/communities/c/schemas/0#/json_schema"}
        });
        assert_eq!(detect(&rec).unwrap(), ServiceDialect::V3);
    }

    #[test]
    fn legacy_record_is_v2() {
        let rec = json!({
            "id": "b1",
            "links": {"self": "https://x/api/records/b1", "files": "https://x/api/files/bucket"},
            "metadata": {"$schema": "https://x/api/communities/c/schemas/0#/json_schema", "titles": []}
        });
        assert_eq!(detect(&rec).unwrap(), ServiceDialect::V2);
    }

    #[test]
    fn record_without_schema_reference_is_unknown() {
        let err = detect(&json!({"id": "z", "metadata": {}})).unwrap_err();
        assert!(matches!(err, ProbeError::UnknownDialect(_)));
    }

    #[test]
    fn v3_prefers_content_link_for_files() {
        let entry = json!({"links": {"self": "https://x/f", "content": "https://x/f/content"}});
        assert_eq!(
            RdmV3.file_url(&entry).as_deref(),
            Some("https://x/f/content")
        );
        assert_eq!(LegacyV2.file_url(&entry).as_deref(), Some("https://x/f"));
    }
}
