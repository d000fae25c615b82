use std::path::PathBuf;

use thiserror::Error;

/// Failure taxonomy shared by every crate in the workspace.
///
/// "No deterministic answer" is not represented here: extractors return
/// `None` for that. Only `CorpusUnavailable` is allowed to reach a caller
/// of the pipeline; upstream failures are recovered where they happen.
#[derive(Debug, Clone, Error)]
pub enum Error {
    #[error("Corpus unavailable at {path}: {reason}")]
    CorpusUnavailable { path: PathBuf, reason: String },

    #[error("Upstream {service} failure: {detail}")]
    UpstreamServiceFailure { service: &'static str, detail: String },

    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),

    #[error("Invalid index artifact: {0}")]
    InvalidArtifact(String),
}

impl Error {
    pub fn corpus(path: impl Into<PathBuf>, reason: impl ToString) -> Self {
        Self::CorpusUnavailable { path: path.into(), reason: reason.to_string() }
    }

    pub fn upstream(service: &'static str, detail: impl ToString) -> Self {
        Self::UpstreamServiceFailure { service, detail: detail.to_string() }
    }
}

pub type Result<T> = std::result::Result<T, Error>;
