//! Per-program instruction decoders.
//!
//! Each program maps its discriminator to a closed set of variants through a
//! constant table, decodes the variant into a typed instruction and, at
//! assembly time, projects it onto the shared record columns.

pub mod binary_reader;
pub mod compute_budget;
pub mod error;
pub mod merkle_distributor;
pub mod spl_token;
pub mod stake;
pub mod system;
pub mod unknown;
pub mod vote;

pub use error::DecodeError;

use crate::core::constants::ProgramKind;
use crate::core::discriminator::Discriminator;
use crate::core::utils::{convert_to_ui_amount, SOL_DECIMALS};
use crate::lookup::AccountSource;
use crate::types::{InstructionFields, RawInstruction, TransactionContext};

use compute_budget::{ComputeBudgetInstruction, ComputeBudgetInstructionKind};
use merkle_distributor::{DistributorInstruction, DistributorInstructionKind};
use spl_token::{TokenInstruction, TokenInstructionKind};
use stake::{StakeInstruction, StakeInstructionKind};
use system::{SystemInstruction, SystemInstructionKind};
use unknown::UnknownInstruction;
use vote::{VoteInstruction, VoteInstructionKind};

/// Maps a typed instruction onto the generic record slots.
pub trait Project {
    fn name(&self) -> &'static str;
    fn project(&self, fields: &mut InstructionFields);
}

/// A decoded top-level instruction, one arm per program family.
#[derive(Clone, Debug, PartialEq)]
pub enum DecodedInstruction {
    System(SystemInstruction),
    Stake(StakeInstruction),
    Vote(VoteInstruction),
    SplToken(TokenInstruction),
    ComputeBudget(ComputeBudgetInstruction),
    MerkleDistributor(DistributorInstruction),
    Unknown(UnknownInstruction),
    /// Known program, variant without a decoder.
    Unrecognized { name: String },
}

impl DecodedInstruction {
    pub fn unrecognized(name: impl Into<String>) -> Self {
        Self::Unrecognized { name: name.into() }
    }

    pub fn name(&self) -> String {
        match self {
            Self::System(ix) => ix.name().to_string(),
            Self::Stake(ix) => ix.name().to_string(),
            Self::Vote(ix) => ix.name().to_string(),
            Self::SplToken(ix) => ix.name().to_string(),
            Self::ComputeBudget(ix) => ix.name().to_string(),
            Self::MerkleDistributor(ix) => ix.name().to_string(),
            Self::Unknown(ix) => ix.discriminator.to_string(),
            Self::Unrecognized { name } => name.clone(),
        }
    }

    pub fn fields(&self) -> InstructionFields {
        let mut fields = InstructionFields::default();
        match self {
            Self::System(ix) => ix.project(&mut fields),
            Self::Stake(ix) => ix.project(&mut fields),
            Self::Vote(ix) => ix.project(&mut fields),
            Self::SplToken(ix) => ix.project(&mut fields),
            Self::ComputeBudget(ix) => ix.project(&mut fields),
            Self::MerkleDistributor(ix) => ix.project(&mut fields),
            Self::Unknown(ix) => ix.project(&mut fields),
            Self::Unrecognized { .. } => {}
        }
        fields
    }
}

/// Decode one instruction with the decoder registered for `kind`.
///
/// Only token instructions suspend, on account lookups through `accounts`.
pub async fn decode_instruction(
    kind: ProgramKind,
    ix: &RawInstruction,
    disc: Discriminator,
    context: &TransactionContext,
    accounts: &dyn AccountSource,
) -> Result<DecodedInstruction, DecodeError> {
    match kind {
        ProgramKind::System => system::decode(ix, disc),
        ProgramKind::Stake => stake::decode(ix, disc, context),
        ProgramKind::Vote => vote::decode(ix, disc),
        ProgramKind::SplToken => spl_token::decode(ix, disc, accounts).await,
        ProgramKind::ComputeBudget => compute_budget::decode(ix, disc),
        ProgramKind::MerkleDistributor => merkle_distributor::decode(ix, disc),
        ProgramKind::Unknown => Ok(unknown::decode(ix, disc)),
    }
}

/// Variant name for `disc`, or its numeric value when the table has no entry.
pub fn variant_name(kind: ProgramKind, disc: Discriminator) -> String {
    let name = match kind {
        ProgramKind::System => {
            SystemInstructionKind::from_discriminator(disc).map(SystemInstructionKind::as_str)
        }
        ProgramKind::Stake => {
            StakeInstructionKind::from_discriminator(disc).map(StakeInstructionKind::as_str)
        }
        ProgramKind::Vote => {
            VoteInstructionKind::from_discriminator(disc).map(VoteInstructionKind::as_str)
        }
        ProgramKind::SplToken => {
            TokenInstructionKind::from_discriminator(disc).map(TokenInstructionKind::as_str)
        }
        ProgramKind::ComputeBudget => ComputeBudgetInstructionKind::from_discriminator(disc)
            .map(ComputeBudgetInstructionKind::as_str),
        ProgramKind::MerkleDistributor => DistributorInstructionKind::from_discriminator(disc)
            .map(DistributorInstructionKind::as_str),
        ProgramKind::Unknown => None,
    };
    name.map(str::to_string)
        .unwrap_or_else(|| disc.to_string())
}

pub(crate) fn account_at(ix: &RawInstruction, position: usize) -> Result<String, DecodeError> {
    ix.account(position)
        .map(str::to_string)
        .ok_or_else(|| DecodeError::missing_account(position))
}

pub(crate) fn sol_amount(fields: &mut InstructionFields, lamports: u64) {
    token_amount(fields, lamports, SOL_DECIMALS);
}

pub(crate) fn token_amount(fields: &mut InstructionFields, amount: u64, decimals: u8) {
    fields.amount = Some(amount);
    fields.ui_amount = Some(convert_to_ui_amount(amount, decimals));
}

#[cfg(test)]
pub(crate) mod tests {
    use super::*;
    use crate::core::constants::programs;
    use crate::types::AccountMeta;

    pub(crate) fn instruction(program_id: &str, accounts: &[&str], data: Vec<u8>) -> RawInstruction {
        RawInstruction {
            index: 0,
            program_id: program_id.to_string(),
            accounts: accounts
                .iter()
                .map(|pubkey| AccountMeta {
                    pubkey: pubkey.to_string(),
                    is_signer: false,
                    is_writable: true,
                })
                .collect(),
            data,
        }
    }

    #[test]
    fn variant_names_come_from_tables() {
        let transfer = Discriminator::extract(ProgramKind::System, &[2, 0, 0, 0]);
        assert_eq!(variant_name(ProgramKind::System, transfer), "Transfer");

        let token = Discriminator::extract(ProgramKind::SplToken, &[12]);
        assert_eq!(variant_name(ProgramKind::SplToken, token), "TransferChecked");

        let unknown = Discriminator::extract(ProgramKind::Unknown, &[9, 0, 0, 0]);
        assert_eq!(variant_name(ProgramKind::Unknown, unknown), "9");

        let sentinel = Discriminator::extract(ProgramKind::Vote, &[]);
        assert_eq!(variant_name(ProgramKind::Vote, sentinel), "999");
    }

    #[test]
    fn missing_accounts_are_reported() {
        let ix = instruction(programs::SYSTEM, &["A"], vec![2, 0, 0, 0]);
        assert!(matches!(
            account_at(&ix, 1),
            Err(DecodeError::MissingAccount { position: 1 })
        ));
    }
}
