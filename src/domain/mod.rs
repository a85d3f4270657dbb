//! Shared data model layer (structs/enums only).
//!
//! ## Files
//! - `models.rs`: configuration, dialect, record, schema and outcome types.
//! - `errors.rs`: typed failures and their mapping to plugin status.
//!
//! ## Rule of thumb
//! Domain types should be data-only: no network or output side effects.

pub mod errors;
pub mod models;
