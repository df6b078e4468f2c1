use thiserror::Error;

use super::binary_reader::BinaryReaderError;
use super::DecodedInstruction;
use crate::lookup::LookupError;

/// Per-instruction decode failure. Never aborts sibling instructions on its own.
#[derive(Debug, Error)]
pub enum DecodeError {
    #[error("binary reader error: {0}")]
    BinaryReader(#[from] BinaryReaderError),
    #[error("missing account at position {position}")]
    MissingAccount { position: usize },
    /// The instruction decoded but an account lookup it needs failed;
    /// `partial` holds everything read from the instruction itself.
    #[error("account lookup failed: {error}")]
    Lookup {
        #[source]
        error: LookupError,
        partial: Box<DecodedInstruction>,
    },
}

impl DecodeError {
    pub fn missing_account(position: usize) -> Self {
        Self::MissingAccount { position }
    }

    pub fn lookup(error: LookupError, partial: DecodedInstruction) -> Self {
        Self::Lookup {
            error,
            partial: Box::new(partial),
        }
    }
}
