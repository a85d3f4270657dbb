//! Service layer: one file per probe component.
//!
//! ## Service map
//! - `http.rs`: blocking HTTP adapter behind the `Transport` trait.
//! - `dialect.rs`: v2/v3 detection and per-dialect behaviour.
//! - `records.rs`: search, record selection and record fetch.
//! - `schema.rs`: schema fetch and metadata-only schema derivation.
//! - `vocabulary.rs`: vocabulary enrichment keys in RDM metadata.
//! - `validate.rs`: metadata validation and strict/non-strict policy.
//! - `files.rs`: file bucket listing and HEAD on the first file.
//! - `report.rs`: final status and status line.
//!
//! ## Conventions
//! - Prefer pure helpers where possible.
//! - Network calls go through `Transport` so steps can be tested offline.

pub mod dialect;
pub mod files;
pub mod http;
pub mod records;
pub mod report;
pub mod schema;
pub mod validate;
pub mod vocabulary;
