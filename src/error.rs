use std::path::PathBuf;

use miette::Diagnostic;
use thiserror::Error;

/// Fatal errors. Any of these aborts the whole batch.
#[derive(Debug, Error, Diagnostic)]
pub enum PaperError {
    #[error("failed to read input file at {0}")]
    InputRead(PathBuf),

    #[error("malformed CSV input: {0}")]
    CsvStructure(String),

    #[error("invalid DOI: {0}")]
    InvalidDoi(String),

    #[error("mirror client setup failed: {0}")]
    MirrorHttp(String),

    #[error("filesystem error: {0}")]
    Filesystem(String),

    #[error("failed to write follow-up report at {0}")]
    Report(PathBuf),
}

/// Per-record failure classification. Recoverable: the batch driver turns
/// these into follow-up report entries and moves on to the next record.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum FailureKind {
    #[error("record has no usable identifier")]
    MissingIdentifier,

    #[error("document not available at mirror")]
    NotFound,

    #[error("mirror request failed: {0}")]
    Transport(String),

    #[error("mirror returned status {0}")]
    Status(u16),

    #[error("unexpected mirror page structure: {0}")]
    Parse(String),

    #[error("unsupported download link shape: {0}")]
    UnresolvedLink(String),

    #[error("failed to store document: {0}")]
    Storage(String),
}

impl FailureKind {
    /// Short stable label used in the run summary.
    pub fn label(&self) -> &'static str {
        match self {
            FailureKind::MissingIdentifier => "missing-identifier",
            FailureKind::NotFound => "not-found",
            FailureKind::Transport(_) | FailureKind::Status(_) => "transport-error",
            FailureKind::Parse(_) => "parse-error",
            FailureKind::UnresolvedLink(_) => "unresolved-link-shape",
            FailureKind::Storage(_) => "storage-error",
        }
    }
}
