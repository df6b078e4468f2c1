use thiserror::Error;

use crate::lookup::LookupError;
use crate::protocols::DecodeError;

/// Failures that abort normalization of a whole transaction.
#[derive(Debug, Error)]
pub enum NormalizerError {
    #[error("unsupported message version: {0}")]
    UnsupportedVersion(String),
    #[error("malformed transaction message: {0}")]
    Message(String),
    #[error("instruction {index} ({program}) failed: {error}")]
    Instruction {
        index: usize,
        program: &'static str,
        #[source]
        error: DecodeError,
    },
    #[error("account lookup failed: {0}")]
    Lookup(#[from] LookupError),
    #[error("failed to serialize output: {0}")]
    Json(#[from] serde_json::Error),
}

impl NormalizerError {
    pub fn message(message: impl Into<String>) -> Self {
        Self::Message(message.into())
    }

    pub fn unsupported_version(version: impl Into<String>) -> Self {
        Self::UnsupportedVersion(version.into())
    }
}
