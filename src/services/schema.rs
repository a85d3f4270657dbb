//! Metadata schema resolution.
//!
//! V2 services publish a schema per community that describes the metadata
//! block directly. V3 (RDM) services publish a schema for the whole record
//! envelope, so the metadata part has to be cut out of it before it can be
//! used. The cut keeps the parent's `$id`, `definitions` and `$defs`, and
//! rewrites local references into the envelope property so they keep
//! resolving inside the smaller document.

use crate::domain::errors::{ProbeError, Step};
use crate::domain::models::{MetadataSchema, Record, SchemaDraft};
use crate::services::dialect::DialectProfile;
use crate::services::http::Transport;
use serde_json::{Map, Value};
use std::collections::{HashMap, HashSet};
use tracing::debug;
use url::Url;

pub const DRAFT7_URI: &str = "http://json-schema.org/draft-07/schema#";

const MAX_REMOTE_DOCUMENTS: usize = 32;

pub fn resolve(
    transport: &dyn Transport,
    profile: &dyn DialectProfile,
    record: &Record,
) -> Result<MetadataSchema, ProbeError> {
    debug!("Fetching record's metadata schema.");
    let url = profile.schema_url(&record.document).ok_or_else(|| {
        ProbeError::SchemaResolution(format!("record {} declares no schema", record.id))
    })?;
    let fetched = transport.get_json(&url).map_err(|e| e.at(Step::Schema))?;
    debug!("Building metadata-only schema ({} dialect).", profile.dialect());
    let mut document = profile.metadata_schema(fetched)?;
    let draft = profile.draft();
    anchor(&mut document, draft, &url);
    let remote = fetch_remote_refs(transport, &document, draft)?;
    Ok(MetadataSchema {
        url,
        draft,
        document,
        remote,
    })
}

fn id_keyword(draft: SchemaDraft) -> &'static str {
    match draft {
        SchemaDraft::Draft4 => "id",
        SchemaDraft::Draft7 => "$id",
    }
}

fn without_fragment(url: &Url) -> String {
    let mut url = url.clone();
    url.set_fragment(None);
    url.to_string()
}

/// Gives a schema without an id the URL it was served from, so relative
/// references resolve against it.
fn anchor(document: &mut Value, draft: SchemaDraft, served_from: &str) {
    let Ok(url) = Url::parse(served_from) else {
        return;
    };
    if let Value::Object(map) = document {
        map.entry(id_keyword(draft))
            .or_insert_with(|| Value::String(without_fragment(&url)));
    }
}

fn ref_targets(node: &Value, out: &mut Vec<String>) {
    match node {
        Value::Object(map) => {
            for (k, v) in map {
                match (k.as_str(), v) {
                    ("$ref", Value::String(r)) if !r.starts_with('#') => out.push(r.clone()),
                    _ => ref_targets(v, out),
                }
            }
        }
        Value::Array(items) => items.iter().for_each(|v| ref_targets(v, out)),
        _ => {}
    }
}

fn refs_of(document: &Value) -> Vec<String> {
    let mut out = Vec::new();
    ref_targets(document, &mut out);
    out
}

/// Fetches every remote document the schema references, transitively, through
/// the probe's own transport.
pub fn fetch_remote_refs(
    transport: &dyn Transport,
    document: &Value,
    draft: SchemaDraft,
) -> Result<HashMap<String, Value>, ProbeError> {
    let mut remote = HashMap::new();
    let Some(root) = document
        .get(id_keyword(draft))
        .and_then(Value::as_str)
        .and_then(|id| Url::parse(id).ok())
    else {
        return Ok(remote);
    };
    let mut seen = HashSet::from([without_fragment(&root)]);
    let mut pending = vec![(root, refs_of(document))];

    while let Some((base, refs)) = pending.pop() {
        for reference in refs {
            let Ok(target) = base.join(&reference) else {
                continue;
            };
            if !matches!(target.scheme(), "http" | "https") {
                continue;
            }
            let key = without_fragment(&target);
            if !seen.insert(key.clone()) {
                continue;
            }
            if remote.len() >= MAX_REMOTE_DOCUMENTS {
                return Err(ProbeError::SchemaResolution(format!(
                    "schema references more than {} remote documents",
                    MAX_REMOTE_DOCUMENTS
                )));
            }
            debug!("Fetching referenced schema {}.", key);
            let fetched = transport.get_json(&key).map_err(|e| e.at(Step::Schema))?;
            pending.push((target, refs_of(&fetched)));
            remote.insert(key, fetched);
        }
    }
    Ok(remote)
}

/// Extracts `properties.<property>` of an envelope schema as a standalone schema.
pub fn derive_metadata_schema(envelope: &Value, property: &str) -> Result<Value, ProbeError> {
    let sub = envelope
        .pointer(&format!("/properties/{}", property))
        .and_then(Value::as_object)
        .ok_or_else(|| {
            ProbeError::SchemaResolution(format!(
                "record schema does not define 'properties.{}'",
                property
            ))
        })?;

    let mut out = Map::new();
    out.insert(
        "$schema".to_string(),
        envelope
            .get("$schema")
            .cloned()
            .unwrap_or_else(|| Value::String(DRAFT7_URI.to_string())),
    );
    for key in ["$id", "definitions", "$defs"] {
        if let Some(v) = envelope.get(key) {
            out.insert(key.to_string(), v.clone());
        }
    }
    for (k, v) in sub {
        if let (Some(Value::Object(parent)), Value::Object(own)) = (out.get_mut(k), v) {
            if k == "definitions" || k == "$defs" {
                for (name, def) in own {
                    parent.insert(name.clone(), def.clone());
                }
                continue;
            }
        }
        out.insert(k.clone(), v.clone());
    }

    let mut derived = Value::Object(out);
    rebase_refs(&mut derived, &format!("#/properties/{}", property));
    Ok(derived)
}

fn rebase_refs(node: &mut Value, prefix: &str) {
    match node {
        Value::Object(map) => {
            for (k, v) in map.iter_mut() {
                if k == "$ref" {
                    if let Value::String(r) = v {
                        if let Some(rest) = r.strip_prefix(prefix) {
                            if rest.is_empty() || rest.starts_with('/') {
                                *r = format!("#{}", rest);
                            }
                        }
                    }
                } else {
                    rebase_refs(v, prefix);
                }
            }
        }
        Value::Array(items) => items.iter_mut().for_each(|v| rebase_refs(v, prefix)),
        _ => {}
    }
}
