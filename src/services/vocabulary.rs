//! Vocabulary enrichment found in RDM metadata.
//!
//! RDM expands controlled-vocabulary references (languages, resource types,
//! subjects...) in the served record with display fields that the record
//! schema does not declare.

use crate::domain::models::IgnoredKey;
use serde_json::{Map, Value};
use std::collections::BTreeSet;

const UI_KEYS: [&str; 3] = ["icon", "props", "tags"];

#[derive(Debug, Clone)]
pub struct VocabularyKeySet {
    keys: BTreeSet<String>,
    /// Drop `title` from objects shaped like a vocabulary term.
    term_titles: bool,
}

impl Default for VocabularyKeySet {
    fn default() -> Self {
        Self {
            keys: UI_KEYS.iter().map(|k| k.to_string()).collect(),
            term_titles: true,
        }
    }
}

/// A term reference carries `id` and a display `title`. Rights entries also
/// have both but keep their title, told apart by `description` or `link`.
fn is_vocabulary_term(obj: &Map<String, Value>) -> bool {
    obj.contains_key("id")
        && obj.contains_key("title")
        && !obj.contains_key("description")
        && !obj.contains_key("link")
}

fn escape(segment: &str) -> String {
    segment.replace('~', "~0").replace('/', "~1")
}

impl VocabularyKeySet {
    pub fn with_keys<I: IntoIterator<Item = S>, S: Into<String>>(keys: I) -> Self {
        Self {
            keys: keys.into_iter().map(Into::into).collect(),
            term_titles: true,
        }
    }

    fn classify(&self, obj: &Map<String, Value>, key: &str) -> Option<&'static str> {
        if self.keys.contains(key) {
            Some("UI enrichment key")
        } else if self.term_titles && key == "title" && is_vocabulary_term(obj) {
            Some("vocabulary term title")
        } else {
            None
        }
    }

    /// JSON pointers of every vocabulary-like key in `doc`.
    pub fn scan(&self, doc: &Value) -> Vec<IgnoredKey> {
        let mut out = Vec::new();
        self.walk(doc, String::new(), &mut out);
        out
    }

    fn walk(&self, node: &Value, path: String, out: &mut Vec<IgnoredKey>) {
        match node {
            Value::Object(obj) => {
                for (k, v) in obj {
                    let child = format!("{}/{}", path, escape(k));
                    match self.classify(obj, k) {
                        Some(reason) => out.push(IgnoredKey {
                            path: child,
                            reason,
                        }),
                        None => self.walk(v, child, out),
                    }
                }
            }
            Value::Array(items) => {
                for (i, v) in items.iter().enumerate() {
                    self.walk(v, format!("{}/{}", path, i), out);
                }
            }
            _ => {}
        }
    }

    /// Copy of `doc` without vocabulary-like keys.
    pub fn strip(&self, doc: &Value) -> Value {
        match doc {
            Value::Object(obj) => Value::Object(
                obj.iter()
                    .filter(|(k, _)| self.classify(obj, k).is_none())
                    .map(|(k, v)| (k.clone(), self.strip(v)))
                    .collect(),
            ),
            Value::Array(items) => Value::Array(items.iter().map(|v| self.strip(v)).collect()),
            other => other.clone(),
        }
    }
}

/// Whether a violation reported at `violation_path` concerns the key at `key_path`.
///
/// `additionalProperties` failures point at the parent object, so the parent of
/// the key counts as well.
pub fn touches(violation_path: &str, key_path: &str) -> bool {
    if violation_path == key_path || violation_path.starts_with(&format!("{}/", key_path)) {
        return true;
    }
    key_path
        .rsplit_once('/')
        .map(|(parent, _)| parent == violation_path)
        .unwrap_or(false)
}
