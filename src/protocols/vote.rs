use super::binary_reader::BinaryReader;
use super::error::DecodeError;
use super::{account_at, sol_amount, DecodedInstruction, Project};
use crate::core::discriminator::Discriminator;
use crate::types::{InstructionFields, RawInstruction};

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum VoteInstructionKind {
    InitializeAccount,
    Authorize,
    Vote,
    Withdraw,
    UpdateValidatorIdentity,
    UpdateCommission,
    VoteSwitch,
    AuthorizeChecked,
    UpdateVoteState,
    UpdateVoteStateSwitch,
    AuthorizeWithSeed,
    AuthorizeCheckedWithSeed,
    CompactUpdateVoteState,
    CompactUpdateVoteStateSwitch,
    TowerSync,
    TowerSyncSwitch,
}

impl VoteInstructionKind {
    pub fn from_discriminator(disc: Discriminator) -> Option<Self> {
        let Discriminator::U32(tag) = disc else {
            return None;
        };
        let kind = match tag {
            0 => Self::InitializeAccount,
            1 => Self::Authorize,
            2 => Self::Vote,
            3 => Self::Withdraw,
            4 => Self::UpdateValidatorIdentity,
            5 => Self::UpdateCommission,
            6 => Self::VoteSwitch,
            7 => Self::AuthorizeChecked,
            8 => Self::UpdateVoteState,
            9 => Self::UpdateVoteStateSwitch,
            10 => Self::AuthorizeWithSeed,
            11 => Self::AuthorizeCheckedWithSeed,
            12 => Self::CompactUpdateVoteState,
            13 => Self::CompactUpdateVoteStateSwitch,
            14 => Self::TowerSync,
            15 => Self::TowerSyncSwitch,
            _ => return None,
        };
        Some(kind)
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Self::InitializeAccount => "InitializeAccount",
            Self::Authorize => "Authorize",
            Self::Vote => "Vote",
            Self::Withdraw => "Withdraw",
            Self::UpdateValidatorIdentity => "UpdateValidatorIdentity",
            Self::UpdateCommission => "UpdateCommission",
            Self::VoteSwitch => "VoteSwitch",
            Self::AuthorizeChecked => "AuthorizeChecked",
            Self::UpdateVoteState => "UpdateVoteState",
            Self::UpdateVoteStateSwitch => "UpdateVoteStateSwitch",
            Self::AuthorizeWithSeed => "AuthorizeWithSeed",
            Self::AuthorizeCheckedWithSeed => "AuthorizeCheckedWithSeed",
            Self::CompactUpdateVoteState => "CompactUpdateVoteState",
            Self::CompactUpdateVoteStateSwitch => "CompactUpdateVoteStateSwitch",
            Self::TowerSync => "TowerSync",
            Self::TowerSyncSwitch => "TowerSyncSwitch",
        }
    }
}

#[derive(Clone, Debug, PartialEq)]
pub enum VoteInstruction {
    InitializeAccount {
        vote: String,
        node: String,
        authorized_voter: String,
        authorized_withdrawer: String,
        commission: u8,
    },
    Authorize {
        vote: String,
        authority: String,
        new_authority: String,
        /// 0 = voter, 1 = withdrawer.
        authority_type: u32,
    },
    Withdraw {
        vote: String,
        to: String,
        withdrawer: String,
        lamports: u64,
    },
    AuthorizeWithSeed {
        vote: String,
        base: String,
        authority_type: u32,
        authority_owner: String,
        seed: String,
        new_authority: String,
    },
}

pub fn decode(ix: &RawInstruction, disc: Discriminator) -> Result<DecodedInstruction, DecodeError> {
    let Some(kind) = VoteInstructionKind::from_discriminator(disc) else {
        return Ok(DecodedInstruction::unrecognized(disc.to_string()));
    };
    let mut reader = BinaryReader::after(&ix.data, 4)?;

    let decoded = match kind {
        VoteInstructionKind::InitializeAccount => VoteInstruction::InitializeAccount {
            vote: account_at(ix, 0)?,
            node: reader.read_pubkey()?,
            authorized_voter: reader.read_pubkey()?,
            authorized_withdrawer: reader.read_pubkey()?,
            commission: reader.read_u8()?,
        },
        VoteInstructionKind::Authorize => VoteInstruction::Authorize {
            vote: account_at(ix, 0)?,
            authority: account_at(ix, 2)?,
            new_authority: reader.read_pubkey()?,
            authority_type: reader.read_u32()?,
        },
        VoteInstructionKind::Withdraw => VoteInstruction::Withdraw {
            vote: account_at(ix, 0)?,
            to: account_at(ix, 1)?,
            withdrawer: account_at(ix, 2)?,
            lamports: reader.read_u64()?,
        },
        VoteInstructionKind::AuthorizeWithSeed => VoteInstruction::AuthorizeWithSeed {
            vote: account_at(ix, 0)?,
            base: account_at(ix, 2)?,
            authority_type: reader.read_u32()?,
            authority_owner: reader.read_pubkey()?,
            seed: reader.read_bincode_string()?,
            new_authority: reader.read_pubkey()?,
        },
        other => return Ok(DecodedInstruction::unrecognized(other.as_str())),
    };

    Ok(DecodedInstruction::Vote(decoded))
}

impl Project for VoteInstruction {
    fn name(&self) -> &'static str {
        let kind = match self {
            Self::InitializeAccount { .. } => VoteInstructionKind::InitializeAccount,
            Self::Authorize { .. } => VoteInstructionKind::Authorize,
            Self::Withdraw { .. } => VoteInstructionKind::Withdraw,
            Self::AuthorizeWithSeed { .. } => VoteInstructionKind::AuthorizeWithSeed,
        };
        kind.as_str()
    }

    fn project(&self, fields: &mut InstructionFields) {
        match self {
            Self::InitializeAccount {
                vote,
                node,
                authorized_voter,
                authorized_withdrawer,
                commission,
            } => {
                fields.auth1 = Some(authorized_voter.clone());
                fields.auth2 = Some(authorized_withdrawer.clone());
                fields.source = Some(vote.clone());
                fields.destination = Some(node.clone());
                fields.misc2 = Some((*commission).into());
            }
            Self::Authorize {
                vote,
                authority,
                new_authority,
                authority_type,
            } => {
                fields.auth1 = Some(authority.clone());
                fields.auth2 = Some(new_authority.clone());
                fields.source = Some(vote.clone());
                fields.misc2 = Some((*authority_type).into());
            }
            Self::Withdraw {
                vote,
                to,
                withdrawer,
                lamports,
            } => {
                fields.auth1 = Some(withdrawer.clone());
                fields.source = Some(vote.clone());
                fields.destination = Some(to.clone());
                sol_amount(fields, *lamports);
            }
            Self::AuthorizeWithSeed {
                vote,
                base,
                authority_type,
                authority_owner,
                seed,
                new_authority,
            } => {
                fields.auth1 = Some(authority_owner.clone());
                fields.auth2 = Some(new_authority.clone());
                fields.source = Some(vote.clone());
                fields.misc1 = Some(seed.as_str().into());
                fields.misc2 = Some((*authority_type).into());
                fields.misc4 = Some(base.as_str().into());
            }
        }
    }
}
