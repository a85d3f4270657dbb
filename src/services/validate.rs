use crate::domain::errors::ProbeError;
use crate::domain::models::{MetadataSchema, SchemaDraft, ValidationOutcome, Violation};
use crate::services::vocabulary::{touches, VocabularyKeySet};
use serde_json::Value;
use std::collections::HashMap;
use tracing::{debug, info};

#[derive(Debug, Clone, Copy, Default)]
pub struct ValidationPolicy {
    /// Apply the vocabulary key set at all (V3 only).
    pub vocabulary: bool,
    pub strict: bool,
}

/// Serves the documents fetched during the schema step. Anything else is a
/// resolution failure; the validator never goes to the network itself.
struct Prefetched(HashMap<String, Value>);

impl jsonschema::Retrieve for Prefetched {
    fn retrieve(
        &self,
        uri: &jsonschema::Uri<String>,
    ) -> Result<Value, Box<dyn std::error::Error + Send + Sync>> {
        let key = uri.as_str().split('#').next().unwrap_or_default();
        self.0
            .get(key)
            .cloned()
            .ok_or_else(|| format!("{} was not fetched with the schema", key).into())
    }
}

fn compile(schema: &MetadataSchema) -> Result<jsonschema::Validator, ProbeError> {
    let draft = match schema.draft {
        SchemaDraft::Draft4 => jsonschema::Draft::Draft4,
        SchemaDraft::Draft7 => jsonschema::Draft::Draft7,
    };
    jsonschema::options()
        .with_draft(draft)
        .with_retriever(Prefetched(schema.remote.clone()))
        .build(&schema.document)
        .map_err(|e| {
            ProbeError::SchemaResolution(format!(
                "schema at {} does not compile: {}",
                schema.url, e
            ))
        })
}

fn violations(validator: &jsonschema::Validator, instance: &Value) -> Vec<Violation> {
    validator
        .iter_errors(instance)
        .map(|e| Violation {
            path: e.instance_path.to_string(),
            schema_path: e.schema_path.to_string(),
            message: e.to_string(),
        })
        .collect()
}

pub fn validate(
    metadata: &Value,
    schema: &MetadataSchema,
    keys: &VocabularyKeySet,
    policy: ValidationPolicy,
) -> Result<ValidationOutcome, ProbeError> {
    let validator = compile(schema)?;
    debug!("Validating record's metadata against metadata schema.");

    if !policy.vocabulary {
        return Ok(ValidationOutcome {
            violations: violations(&validator, metadata),
            ..Default::default()
        });
    }

    let found = keys.scan(metadata);
    let outcome = if policy.strict {
        let violations = violations(&validator, metadata);
        let flagged = violations
            .iter()
            .filter(|v| found.iter().any(|k| touches(&v.path, &k.path)))
            .count();
        ValidationOutcome {
            violations,
            ignored: Vec::new(),
            vocabulary_keys: found.len(),
            flagged,
        }
    } else {
        for key in &found {
            debug!(target: "vocabulary", "ignored {} ({})", key.path, key.reason);
        }
        ValidationOutcome {
            violations: violations(&validator, &keys.strip(metadata)),
            vocabulary_keys: found.len(),
            ignored: found,
            flagged: 0,
        }
    };
    info!(
        target: "metadata_report",
        "vocabulary-like keys: {} found, {} ignored, {} flagged",
        outcome.vocabulary_keys,
        outcome.ignored.len(),
        outcome.flagged
    );
    Ok(outcome)
}

fn trace(outcome: &ValidationOutcome) {
    for v in &outcome.violations {
        debug!("violation at {:?} ({}): {}", v.path, v.schema_path, v.message);
    }
}

/// Converts a failed outcome into the error the pipeline reports.
pub fn check(outcome: &ValidationOutcome) -> Result<(), ProbeError> {
    if outcome.passed() {
        return Ok(());
    }
    trace(outcome);
    match outcome.violations.first() {
        None => Ok(()),
        Some(first) => {
            let at = if first.path.is_empty() { "/" } else { &first.path };
            let more = match outcome.violations.len() {
                1 => String::new(),
                n => format!(" (and {} more)", n - 1),
            };
            Err(ProbeError::MetadataInvalid(format!(
                "{} at {}{}",
                first.message, at, more
            )))
        }
    }
}
