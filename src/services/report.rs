use crate::domain::errors::ProbeError;
use crate::domain::models::{ProbeOutcome, Status};

pub const OK_MESSAGE: &str = "records, metadata schemas and files are accessible.";
pub const OK_NO_FILES_MESSAGE: &str =
    "records and metadata schemas are accessible (record has no files).";
pub const OK_EMPTY_MESSAGE: &str = "no records present in this B2SHARE instance";

/// How the pipeline ended before it is turned into a status.
#[derive(Debug)]
pub enum Conclusion {
    Checked { files_checked: bool },
    Empty,
    Failed(ProbeError),
}

pub fn conclude(conclusion: Conclusion, steps: Vec<&'static str>) -> ProbeOutcome {
    let (status, message) = match conclusion {
        Conclusion::Checked { files_checked: true } => (Status::Ok, OK_MESSAGE.to_string()),
        Conclusion::Checked {
            files_checked: false,
        } => (Status::Ok, OK_NO_FILES_MESSAGE.to_string()),
        Conclusion::Empty => (Status::Ok, OK_EMPTY_MESSAGE.to_string()),
        Conclusion::Failed(err) => (err.status(), err.to_string()),
    };
    ProbeOutcome {
        status,
        message,
        steps,
    }
}

/// Writes the status line. Trace output has already gone to stderr.
pub fn print(outcome: &ProbeOutcome, out: &mut impl std::io::Write) -> std::io::Result<()> {
    writeln!(out, "{}", outcome.status_line())
}
