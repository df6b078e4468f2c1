//! Normalizes Solana transactions into one flat record per instruction,
//! exported as CSV or JSON.

pub mod config;
pub mod core;
pub mod lookup;
pub mod output;
pub mod protocols;
pub mod rpc;
pub mod types;

pub use crate::config::NormalizeConfig;
pub use crate::core::error::NormalizerError;
pub use crate::core::normalizer::TransactionNormalizer;
pub use crate::lookup::{AccountSource, StaticAccounts};
pub use crate::output::OutputFormat;
pub use crate::types::{
    NativeBalanceChange, NormalizedRecord, RawTransaction, TokenBalanceChange, TransactionContext,
};
