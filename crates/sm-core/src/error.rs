use std::result;
use thiserror::Error;

/// Reasons a host analysis service may abort.
#[derive(Error, Debug, Clone, Copy, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
pub enum AnalysisError {
    #[error("analysis canceled")]
    Canceled,
    #[error("analysis exceeded its budget")]
    Timeout,
}

#[derive(Error, Debug)]
pub enum Error {
    #[error("Analysis error: {0}")]
    Analysis(#[from] AnalysisError),
    #[error("Synthesis invariant violated: {message}")]
    SynthesisInvariant { message: String },
    #[error("Stale finding: computed at revision {expected}, tree is at revision {actual}")]
    StaleFinding { expected: u64, actual: u64 },
    #[error("Invalid edit: {0}")]
    InvalidEdit(String),
    #[error("Generic error: {0}")]
    Generic(String),
}

impl Error {
    pub fn synthesis(message: impl Into<String>) -> Self {
        Error::SynthesisInvariant {
            message: message.into(),
        }
    }

    pub fn invalid_edit(message: impl Into<String>) -> Self {
        Error::InvalidEdit(message.into())
    }
}

pub type Result<T> = result::Result<T, Error>;

// Convert from eyre::Report to our Error type
impl From<eyre::Report> for Error {
    fn from(err: eyre::Report) -> Self {
        Error::Generic(err.to_string())
    }
}

impl From<String> for Error {
    fn from(s: String) -> Self {
        Error::Generic(s)
    }
}

impl From<serde_json::Error> for Error {
    fn from(e: serde_json::Error) -> Self {
        Error::Generic(e.to_string())
    }
}
