//! Command handler layer.
//!
//! ## Files
//! - `check.rs`: the probe pipeline: search, record, dialect, schema,
//!   validation, files. Stops at the first failure.
//!
//! ## Principles
//! - Orchestrate here, delegate to `services/*`.
//! - Return an outcome, never an error: the status line must always be printed.

pub mod check;

pub use check::run_check;
