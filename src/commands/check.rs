use crate::domain::errors::ProbeError;
use crate::domain::models::{ProbeConfig, ProbeOutcome};
use crate::services::dialect;
use crate::services::files::{self, FileCheck};
use crate::services::http::Transport;
use crate::services::records;
use crate::services::report::{conclude, Conclusion};
use crate::services::schema;
use crate::services::validate::{self, ValidationPolicy};
use crate::services::vocabulary::VocabularyKeySet;
use tracing::debug;

/// Runs the whole check once. Never fails: every error ends up in the outcome.
pub fn run_check(transport: &dyn Transport, config: &ProbeConfig) -> ProbeOutcome {
    let mut steps = Vec::new();
    let conclusion = match pipeline(transport, config, &mut steps) {
        Ok(done) => done,
        Err(err) => {
            debug!("check stopped after {:?}: {}", steps, err);
            Conclusion::Failed(err)
        }
    };
    conclude(conclusion, steps)
}

fn pipeline(
    transport: &dyn Transport,
    config: &ProbeConfig,
    steps: &mut Vec<&'static str>,
) -> Result<Conclusion, ProbeError> {
    let result = records::search(transport, config)?;
    steps.push("search");

    let Some(summary) = records::select(&result, config.selection) else {
        debug!("No search results returned by the query.");
        return if config.error_if_empty {
            Err(ProbeError::NoRecords)
        } else {
            Ok(Conclusion::Empty)
        };
    };
    debug!("Search returned some results.");

    let record = records::fetch(transport, config, summary)?;
    steps.push("record");

    let dialect = dialect::detect(&record.document)?;
    debug!("Service speaks the {} API.", dialect);
    steps.push("dialect");
    let profile = dialect::profile(dialect);

    let schema = schema::resolve(transport, profile, &record)?;
    steps.push("schema");

    if config.strict_metadata && !profile.enriches_vocabulary() {
        debug!("--strict-metadata has no effect on {} services.", dialect);
    }
    let policy = ValidationPolicy {
        vocabulary: profile.enriches_vocabulary(),
        strict: config.strict_metadata,
    };
    let keys = match &config.vocabulary_keys {
        Some(custom) => VocabularyKeySet::with_keys(custom.iter().cloned()),
        None => VocabularyKeySet::default(),
    };
    let outcome = validate::validate(&record.metadata, &schema, &keys, policy)?;
    validate::check(&outcome)?;
    steps.push("validation");

    match files::check(transport, profile, &record)? {
        FileCheck::Accessible { url, status } => {
            debug!("File {} answered HTTP {}.", url, status);
            steps.push("files");
            Ok(Conclusion::Checked {
                files_checked: true,
            })
        }
        FileCheck::Skipped => Ok(Conclusion::Checked {
            files_checked: false,
        }),
    }
}
