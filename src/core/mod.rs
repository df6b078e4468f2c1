pub mod balance_changes;
pub mod constants;
pub mod discriminator;
pub mod error;
pub mod message_adapter;
pub mod normalizer;
pub mod record_assembler;
pub mod utils;
