use super::binary_reader::BinaryReader;
use super::error::DecodeError;
use super::{account_at, sol_amount, DecodedInstruction, Project};
use crate::core::discriminator::Discriminator;
use crate::types::{InstructionFields, RawInstruction, TransactionContext};

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum StakeInstructionKind {
    Initialize,
    Authorize,
    Delegate,
    Split,
    Withdraw,
    Deactivate,
    SetLockup,
    Merge,
    AuthorizeWithSeed,
    InitializeChecked,
    AuthorizeChecked,
    AuthorizeCheckedWithSeed,
    SetLockupChecked,
    GetMinimumDelegation,
    DeactivateDelinquent,
    Redelegate,
    MoveStake,
    MoveLamports,
}

impl StakeInstructionKind {
    pub fn from_discriminator(disc: Discriminator) -> Option<Self> {
        let Discriminator::U32(tag) = disc else {
            return None;
        };
        let kind = match tag {
            0 => Self::Initialize,
            1 => Self::Authorize,
            2 => Self::Delegate,
            3 => Self::Split,
            4 => Self::Withdraw,
            5 => Self::Deactivate,
            6 => Self::SetLockup,
            7 => Self::Merge,
            8 => Self::AuthorizeWithSeed,
            9 => Self::InitializeChecked,
            10 => Self::AuthorizeChecked,
            11 => Self::AuthorizeCheckedWithSeed,
            12 => Self::SetLockupChecked,
            13 => Self::GetMinimumDelegation,
            14 => Self::DeactivateDelinquent,
            15 => Self::Redelegate,
            16 => Self::MoveStake,
            17 => Self::MoveLamports,
            _ => return None,
        };
        Some(kind)
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Self::Initialize => "Initialize",
            Self::Authorize => "Authorize",
            Self::Delegate => "Delegate",
            Self::Split => "Split",
            Self::Withdraw => "Withdraw",
            Self::Deactivate => "Deactivate",
            Self::SetLockup => "SetLockup",
            Self::Merge => "Merge",
            Self::AuthorizeWithSeed => "AuthorizeWithSeed",
            Self::InitializeChecked => "InitializeChecked",
            Self::AuthorizeChecked => "AuthorizeChecked",
            Self::AuthorizeCheckedWithSeed => "AuthorizeCheckedWithSeed",
            Self::SetLockupChecked => "SetLockupChecked",
            Self::GetMinimumDelegation => "GetMinimumDelegation",
            Self::DeactivateDelinquent => "DeactivateDelinquent",
            Self::Redelegate => "Redelegate",
            Self::MoveStake => "MoveStake",
            Self::MoveLamports => "MoveLamports",
        }
    }
}

#[derive(Clone, Debug, PartialEq)]
pub enum StakeInstruction {
    Initialize {
        stake: String,
        staker: String,
        withdrawer: String,
        unix_timestamp: i64,
        epoch: u64,
        custodian: String,
    },
    Authorize {
        stake: String,
        authority: String,
        new_authority: String,
        /// 0 = staker, 1 = withdrawer.
        authority_type: u32,
        custodian: Option<String>,
    },
    Delegate {
        stake: String,
        vote: String,
        authority: String,
    },
    Split {
        stake: String,
        split_stake: String,
        authority: String,
        lamports: u64,
    },
    Withdraw {
        stake: String,
        to: String,
        authority: String,
        custodian: Option<String>,
        lamports: u64,
    },
    Deactivate {
        stake: String,
        authority: String,
    },
    Merge {
        destination: String,
        source: String,
        authority: String,
        /// Native balance change of the destination stake over the whole transaction.
        balance_change: Option<f64>,
    },
    AuthorizeWithSeed {
        stake: String,
        base: String,
        new_authority: String,
        authority_type: u32,
        seed: String,
        authority_owner: String,
        custodian: Option<String>,
    },
}

pub fn decode(
    ix: &RawInstruction,
    disc: Discriminator,
    context: &TransactionContext,
) -> Result<DecodedInstruction, DecodeError> {
    let Some(kind) = StakeInstructionKind::from_discriminator(disc) else {
        return Ok(DecodedInstruction::unrecognized(disc.to_string()));
    };
    let mut reader = BinaryReader::after(&ix.data, 4)?;

    let decoded = match kind {
        StakeInstructionKind::Initialize => StakeInstruction::Initialize {
            stake: account_at(ix, 0)?,
            staker: reader.read_pubkey()?,
            withdrawer: reader.read_pubkey()?,
            unix_timestamp: reader.read_i64()?,
            epoch: reader.read_u64()?,
            custodian: reader.read_pubkey()?,
        },
        StakeInstructionKind::Authorize => StakeInstruction::Authorize {
            stake: account_at(ix, 0)?,
            authority: account_at(ix, 2)?,
            new_authority: reader.read_pubkey()?,
            authority_type: reader.read_u32()?,
            custodian: ix.account(3).map(str::to_string),
        },
        StakeInstructionKind::Delegate => StakeInstruction::Delegate {
            stake: account_at(ix, 0)?,
            vote: account_at(ix, 1)?,
            authority: account_at(ix, 5)?,
        },
        StakeInstructionKind::Split => StakeInstruction::Split {
            stake: account_at(ix, 0)?,
            split_stake: account_at(ix, 1)?,
            authority: account_at(ix, 2)?,
            lamports: reader.read_u64()?,
        },
        StakeInstructionKind::Withdraw => StakeInstruction::Withdraw {
            stake: account_at(ix, 0)?,
            to: account_at(ix, 1)?,
            authority: account_at(ix, 4)?,
            custodian: ix.account(5).map(str::to_string),
            lamports: reader.read_u64()?,
        },
        StakeInstructionKind::Deactivate => StakeInstruction::Deactivate {
            stake: account_at(ix, 0)?,
            authority: account_at(ix, 2)?,
        },
        StakeInstructionKind::Merge => {
            let destination = account_at(ix, 0)?;
            StakeInstruction::Merge {
                balance_change: context.native_delta_of(&destination),
                destination,
                source: account_at(ix, 1)?,
                authority: account_at(ix, 4)?,
            }
        }
        StakeInstructionKind::AuthorizeWithSeed => StakeInstruction::AuthorizeWithSeed {
            stake: account_at(ix, 0)?,
            base: account_at(ix, 1)?,
            new_authority: reader.read_pubkey()?,
            authority_type: reader.read_u32()?,
            seed: reader.read_bincode_string()?,
            authority_owner: reader.read_pubkey()?,
            custodian: ix.account(3).map(str::to_string),
        },
        other => return Ok(DecodedInstruction::unrecognized(other.as_str())),
    };

    Ok(DecodedInstruction::Stake(decoded))
}

impl Project for StakeInstruction {
    fn name(&self) -> &'static str {
        let kind = match self {
            Self::Initialize { .. } => StakeInstructionKind::Initialize,
            Self::Authorize { .. } => StakeInstructionKind::Authorize,
            Self::Delegate { .. } => StakeInstructionKind::Delegate,
            Self::Split { .. } => StakeInstructionKind::Split,
            Self::Withdraw { .. } => StakeInstructionKind::Withdraw,
            Self::Deactivate { .. } => StakeInstructionKind::Deactivate,
            Self::Merge { .. } => StakeInstructionKind::Merge,
            Self::AuthorizeWithSeed { .. } => StakeInstructionKind::AuthorizeWithSeed,
        };
        kind.as_str()
    }

    fn project(&self, fields: &mut InstructionFields) {
        match self {
            Self::Initialize {
                stake,
                staker,
                withdrawer,
                unix_timestamp,
                epoch,
                custodian,
            } => {
                fields.auth1 = Some(staker.clone());
                fields.auth2 = Some(withdrawer.clone());
                fields.auth3 = Some(custodian.clone());
                fields.source = Some(stake.clone());
                fields.misc2 = Some((*epoch).into());
                fields.misc3 = Some((*unix_timestamp).into());
            }
            Self::Authorize {
                stake,
                authority,
                new_authority,
                authority_type,
                custodian,
            } => {
                fields.auth1 = Some(authority.clone());
                fields.auth2 = Some(new_authority.clone());
                fields.auth3 = custodian.clone();
                fields.source = Some(stake.clone());
                fields.misc2 = Some((*authority_type).into());
            }
            Self::Delegate {
                stake,
                vote,
                authority,
            } => {
                fields.auth1 = Some(authority.clone());
                fields.source = Some(stake.clone());
                fields.misc1 = Some(vote.as_str().into());
            }
            Self::Split {
                stake,
                split_stake,
                authority,
                lamports,
            } => {
                fields.auth1 = Some(authority.clone());
                fields.source = Some(stake.clone());
                fields.destination = Some(split_stake.clone());
                sol_amount(fields, *lamports);
            }
            Self::Withdraw {
                stake,
                to,
                authority,
                custodian,
                lamports,
            } => {
                fields.auth1 = Some(authority.clone());
                fields.auth3 = custodian.clone();
                fields.source = Some(stake.clone());
                fields.destination = Some(to.clone());
                sol_amount(fields, *lamports);
            }
            Self::Deactivate { stake, authority } => {
                fields.auth1 = Some(authority.clone());
                fields.source = Some(stake.clone());
            }
            Self::Merge {
                destination,
                source,
                authority,
                balance_change,
            } => {
                fields.auth1 = Some(authority.clone());
                fields.source = Some(source.clone());
                fields.destination = Some(destination.clone());
                fields.ui_amount = *balance_change;
            }
            Self::AuthorizeWithSeed {
                stake,
                base,
                new_authority,
                authority_type,
                seed,
                authority_owner,
                custodian,
            } => {
                fields.auth1 = Some(authority_owner.clone());
                fields.auth2 = Some(new_authority.clone());
                fields.auth3 = custodian.clone();
                fields.source = Some(stake.clone());
                fields.misc1 = Some(seed.as_str().into());
                fields.misc2 = Some((*authority_type).into());
                fields.misc4 = Some(base.as_str().into());
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::constants::{programs, ProgramKind};
    use crate::protocols::tests::instruction;
    use crate::types::MiscValue;

    fn run(data: Vec<u8>, accounts: &[&str], context: &TransactionContext) -> DecodedInstruction {
        let ix = instruction(programs::STAKE, accounts, data);
        let disc = Discriminator::extract(ProgramKind::Stake, &ix.data);
        decode(&ix, disc, context).unwrap()
    }

    #[test]
    fn withdraw_reports_lamports_and_custodian() {
        let mut data = 4u32.to_le_bytes().to_vec();
        data.extend(250_000_000u64.to_le_bytes());
        let decoded = run(
            data,
            &["stake", "to", "clock", "history", "withdrawer", "custodian"],
            &TransactionContext::default(),
        );
        assert_eq!(decoded.name(), "Withdraw");
        let fields = decoded.fields();
        assert_eq!(fields.auth1.as_deref(), Some("withdrawer"));
        assert_eq!(fields.auth3.as_deref(), Some("custodian"));
        assert_eq!(fields.destination.as_deref(), Some("to"));
        assert_eq!(fields.amount, Some(250_000_000));
        assert_eq!(fields.ui_amount, Some(0.25));
    }

    #[test]
    fn merge_reads_destination_balance_change() {
        let context = TransactionContext {
            account_keys: vec!["payer".into(), "dest".into()],
            pre_balances: vec![10, 2_000_000_000],
            post_balances: vec![5, 5_000_000_000],
            ..TransactionContext::default()
        };
        let decoded = run(
            7u32.to_le_bytes().to_vec(),
            &["dest", "src", "clock", "history", "auth"],
            &context,
        );
        let fields = decoded.fields();
        assert_eq!(decoded.name(), "Merge");
        assert_eq!(fields.source.as_deref(), Some("src"));
        assert_eq!(fields.ui_amount, Some(3.0));
        assert_eq!(fields.amount, None);
    }

    #[test]
    fn authorize_with_seed_projects_seed_and_base() {
        let mut data = 8u32.to_le_bytes().to_vec();
        data.extend([0u8; 32]);
        data.extend(1u32.to_le_bytes());
        data.extend(3u64.to_le_bytes());
        data.extend(b"abc");
        data.extend([0u8; 32]);
        let decoded = run(data, &["stake", "base", "clock"], &TransactionContext::default());
        let fields = decoded.fields();
        assert_eq!(fields.misc1, Some(MiscValue::Text("abc".into())));
        assert_eq!(fields.misc2, Some(MiscValue::Unsigned(1)));
        assert_eq!(fields.misc4, Some(MiscValue::Text("base".into())));
        assert_eq!(fields.auth3, None);
    }

    #[test]
    fn named_variants_without_decoder_keep_their_name() {
        let decoded = run(
            6u32.to_le_bytes().to_vec(),
            &["stake"],
            &TransactionContext::default(),
        );
        assert_eq!(decoded, DecodedInstruction::unrecognized("SetLockup"));
        assert_eq!(decoded.fields(), InstructionFields::default());
    }
}
