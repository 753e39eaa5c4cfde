//! Error type shared by the loaders, the benchmark runner and the CLI.
//!
//! The solving core never fails: infeasibility is handled by construction.
//! Everything that touches files returns [`Result`].

use thiserror::Error;

#[derive(Debug, Error)]
pub enum TapError {
    #[error(transparent)]
    Io(#[from] std::io::Error),
    #[error(transparent)]
    Csv(#[from] csv::Error),
    #[error(transparent)]
    Json(#[from] serde_json::Error),
    /// Arrays of an instance disagree on its size
    #[error("invalid instance: {0}")]
    InvalidInstance(String),
    #[error("parse error in {file}: {message}")]
    Parse { file: String, message: String },
    /// An instance has no entry in a reference file
    #[error("no reference value for instance '{0}'")]
    MissingReference(String),
}

pub type Result<T> = std::result::Result<T, TapError>;

impl TapError {
    pub fn invalid_instance(message: impl Into<String>) -> Self {
        Self::InvalidInstance(message.into())
    }

    pub fn parse(file: impl Into<String>, message: impl Into<String>) -> Self {
        Self::Parse {
            file: file.into(),
            message: message.into(),
        }
    }
}
