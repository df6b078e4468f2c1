use super::binary_reader::BinaryReader;
use super::error::DecodeError;
use super::{account_at, sol_amount, DecodedInstruction, Project};
use crate::core::discriminator::Discriminator;
use crate::types::{InstructionFields, RawInstruction};

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum SystemInstructionKind {
    Create,
    Assign,
    Transfer,
    CreateWithSeed,
    AdvanceNonceAccount,
    WithdrawNonceAccount,
    InitializeNonceAccount,
    AuthorizeNonceAccount,
    Allocate,
    AllocateWithSeed,
    AssignWithSeed,
    TransferWithSeed,
    UpgradeNonceAccount,
}

impl SystemInstructionKind {
    pub fn from_discriminator(disc: Discriminator) -> Option<Self> {
        let kind = match disc {
            Discriminator::U32(0) => Self::Create,
            Discriminator::U32(1) => Self::Assign,
            Discriminator::U32(2) => Self::Transfer,
            Discriminator::U32(3) => Self::CreateWithSeed,
            Discriminator::U32(4) => Self::AdvanceNonceAccount,
            Discriminator::U32(5) => Self::WithdrawNonceAccount,
            Discriminator::U32(6) => Self::InitializeNonceAccount,
            Discriminator::U32(7) => Self::AuthorizeNonceAccount,
            Discriminator::U32(8) => Self::Allocate,
            Discriminator::U32(9) => Self::AllocateWithSeed,
            Discriminator::U32(10) => Self::AssignWithSeed,
            Discriminator::U32(11) => Self::TransferWithSeed,
            Discriminator::U32(12) => Self::UpgradeNonceAccount,
            _ => return None,
        };
        Some(kind)
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Self::Create => "Create",
            Self::Assign => "Assign",
            Self::Transfer => "Transfer",
            Self::CreateWithSeed => "CreateWithSeed",
            Self::AdvanceNonceAccount => "AdvanceNonceAccount",
            Self::WithdrawNonceAccount => "WithdrawNonceAccount",
            Self::InitializeNonceAccount => "InitializeNonceAccount",
            Self::AuthorizeNonceAccount => "AuthorizeNonceAccount",
            Self::Allocate => "Allocate",
            Self::AllocateWithSeed => "AllocateWithSeed",
            Self::AssignWithSeed => "AssignWithSeed",
            Self::TransferWithSeed => "TransferWithSeed",
            Self::UpgradeNonceAccount => "UpgradeNonceAccount",
        }
    }
}

#[derive(Clone, Debug, PartialEq)]
pub enum SystemInstruction {
    Create {
        from: String,
        new_account: String,
        lamports: u64,
        space: u64,
        owner: String,
    },
    Assign {
        account: String,
        owner: String,
    },
    Transfer {
        from: String,
        to: String,
        lamports: u64,
    },
    CreateWithSeed {
        from: String,
        new_account: String,
        base: String,
        seed: String,
        lamports: u64,
        space: u64,
        owner: String,
    },
    AdvanceNonceAccount {
        nonce: String,
        authority: String,
    },
    WithdrawNonceAccount {
        nonce: String,
        to: String,
        authority: String,
        lamports: u64,
    },
    InitializeNonceAccount {
        nonce: String,
        authority: String,
    },
    AuthorizeNonceAccount {
        nonce: String,
        authority: String,
        new_authority: String,
    },
    Allocate {
        account: String,
        space: u64,
    },
    AllocateWithSeed {
        account: String,
        base: String,
        seed: String,
        space: u64,
        owner: String,
    },
    AssignWithSeed {
        account: String,
        base: String,
        seed: String,
        owner: String,
    },
    TransferWithSeed {
        from: String,
        base: String,
        to: String,
        lamports: u64,
        seed: String,
        from_owner: String,
    },
    UpgradeNonceAccount {
        nonce: String,
    },
}

pub fn decode(ix: &RawInstruction, disc: Discriminator) -> Result<DecodedInstruction, DecodeError> {
    let Some(kind) = SystemInstructionKind::from_discriminator(disc) else {
        return Ok(DecodedInstruction::unrecognized(disc.to_string()));
    };
    let mut reader = BinaryReader::after(&ix.data, 4)?;

    let decoded = match kind {
        SystemInstructionKind::Create => SystemInstruction::Create {
            from: account_at(ix, 0)?,
            new_account: account_at(ix, 1)?,
            lamports: reader.read_u64()?,
            space: reader.read_u64()?,
            owner: reader.read_pubkey()?,
        },
        SystemInstructionKind::Assign => SystemInstruction::Assign {
            account: account_at(ix, 0)?,
            owner: reader.read_pubkey()?,
        },
        SystemInstructionKind::Transfer => SystemInstruction::Transfer {
            from: account_at(ix, 0)?,
            to: account_at(ix, 1)?,
            lamports: reader.read_u64()?,
        },
        SystemInstructionKind::CreateWithSeed => SystemInstruction::CreateWithSeed {
            from: account_at(ix, 0)?,
            new_account: account_at(ix, 1)?,
            base: reader.read_pubkey()?,
            seed: reader.read_bincode_string()?,
            lamports: reader.read_u64()?,
            space: reader.read_u64()?,
            owner: reader.read_pubkey()?,
        },
        SystemInstructionKind::AdvanceNonceAccount => SystemInstruction::AdvanceNonceAccount {
            nonce: account_at(ix, 0)?,
            authority: account_at(ix, 2)?,
        },
        SystemInstructionKind::WithdrawNonceAccount => SystemInstruction::WithdrawNonceAccount {
            nonce: account_at(ix, 0)?,
            to: account_at(ix, 1)?,
            authority: account_at(ix, 4)?,
            lamports: reader.read_u64()?,
        },
        SystemInstructionKind::InitializeNonceAccount => {
            SystemInstruction::InitializeNonceAccount {
                nonce: account_at(ix, 0)?,
                authority: reader.read_pubkey()?,
            }
        }
        SystemInstructionKind::AuthorizeNonceAccount => SystemInstruction::AuthorizeNonceAccount {
            nonce: account_at(ix, 0)?,
            authority: account_at(ix, 1)?,
            new_authority: reader.read_pubkey()?,
        },
        SystemInstructionKind::Allocate => SystemInstruction::Allocate {
            account: account_at(ix, 0)?,
            space: reader.read_u64()?,
        },
        SystemInstructionKind::AllocateWithSeed => SystemInstruction::AllocateWithSeed {
            account: account_at(ix, 0)?,
            base: reader.read_pubkey()?,
            seed: reader.read_bincode_string()?,
            space: reader.read_u64()?,
            owner: reader.read_pubkey()?,
        },
        SystemInstructionKind::AssignWithSeed => SystemInstruction::AssignWithSeed {
            account: account_at(ix, 0)?,
            base: reader.read_pubkey()?,
            seed: reader.read_bincode_string()?,
            owner: reader.read_pubkey()?,
        },
        SystemInstructionKind::TransferWithSeed => SystemInstruction::TransferWithSeed {
            from: account_at(ix, 0)?,
            base: account_at(ix, 1)?,
            to: account_at(ix, 2)?,
            lamports: reader.read_u64()?,
            seed: reader.read_bincode_string()?,
            from_owner: reader.read_pubkey()?,
        },
        SystemInstructionKind::UpgradeNonceAccount => SystemInstruction::UpgradeNonceAccount {
            nonce: account_at(ix, 0)?,
        },
    };

    Ok(DecodedInstruction::System(decoded))
}

impl Project for SystemInstruction {
    fn name(&self) -> &'static str {
        let kind = match self {
            Self::Create { .. } => SystemInstructionKind::Create,
            Self::Assign { .. } => SystemInstructionKind::Assign,
            Self::Transfer { .. } => SystemInstructionKind::Transfer,
            Self::CreateWithSeed { .. } => SystemInstructionKind::CreateWithSeed,
            Self::AdvanceNonceAccount { .. } => SystemInstructionKind::AdvanceNonceAccount,
            Self::WithdrawNonceAccount { .. } => SystemInstructionKind::WithdrawNonceAccount,
            Self::InitializeNonceAccount { .. } => SystemInstructionKind::InitializeNonceAccount,
            Self::AuthorizeNonceAccount { .. } => SystemInstructionKind::AuthorizeNonceAccount,
            Self::Allocate { .. } => SystemInstructionKind::Allocate,
            Self::AllocateWithSeed { .. } => SystemInstructionKind::AllocateWithSeed,
            Self::AssignWithSeed { .. } => SystemInstructionKind::AssignWithSeed,
            Self::TransferWithSeed { .. } => SystemInstructionKind::TransferWithSeed,
            Self::UpgradeNonceAccount { .. } => SystemInstructionKind::UpgradeNonceAccount,
        };
        kind.as_str()
    }

    fn project(&self, fields: &mut InstructionFields) {
        match self {
            Self::Create {
                from,
                new_account,
                lamports,
                space,
                owner,
            } => {
                fields.source = Some(from.clone());
                fields.destination = Some(new_account.clone());
                fields.misc2 = Some((*space).into());
                fields.misc3 = Some(owner.as_str().into());
                sol_amount(fields, *lamports);
            }
            Self::Assign { account, owner } => {
                fields.source = Some(account.clone());
                fields.misc3 = Some(owner.as_str().into());
            }
            Self::Transfer { from, to, lamports } => {
                fields.source = Some(from.clone());
                fields.destination = Some(to.clone());
                sol_amount(fields, *lamports);
            }
            Self::CreateWithSeed {
                from,
                new_account,
                base,
                seed,
                lamports,
                space,
                owner,
            } => {
                fields.source = Some(from.clone());
                fields.destination = Some(new_account.clone());
                fields.misc1 = Some(seed.as_str().into());
                fields.misc2 = Some((*space).into());
                fields.misc3 = Some(owner.as_str().into());
                fields.misc4 = Some(base.as_str().into());
                sol_amount(fields, *lamports);
            }
            Self::AdvanceNonceAccount { nonce, authority } => {
                fields.auth1 = Some(authority.clone());
                fields.misc1 = Some(nonce.as_str().into());
            }
            Self::WithdrawNonceAccount {
                nonce,
                to,
                authority,
                lamports,
            } => {
                fields.auth1 = Some(authority.clone());
                fields.source = Some(nonce.clone());
                fields.destination = Some(to.clone());
                sol_amount(fields, *lamports);
            }
            Self::InitializeNonceAccount { nonce, authority } => {
                fields.auth1 = Some(authority.clone());
                fields.misc1 = Some(nonce.as_str().into());
            }
            Self::AuthorizeNonceAccount {
                nonce,
                authority,
                new_authority,
            } => {
                fields.auth1 = Some(authority.clone());
                fields.auth2 = Some(new_authority.clone());
                fields.misc1 = Some(nonce.as_str().into());
            }
            Self::Allocate { account, space } => {
                fields.source = Some(account.clone());
                fields.misc2 = Some((*space).into());
            }
            Self::AllocateWithSeed {
                account,
                base,
                seed,
                space,
                owner,
            } => {
                fields.source = Some(account.clone());
                fields.misc1 = Some(seed.as_str().into());
                fields.misc2 = Some((*space).into());
                fields.misc3 = Some(owner.as_str().into());
                fields.misc4 = Some(base.as_str().into());
            }
            Self::AssignWithSeed {
                account,
                base,
                seed,
                owner,
            } => {
                fields.source = Some(account.clone());
                fields.misc1 = Some(seed.as_str().into());
                fields.misc3 = Some(owner.as_str().into());
                fields.misc4 = Some(base.as_str().into());
            }
            Self::TransferWithSeed {
                from,
                base,
                to,
                lamports,
                seed,
                from_owner,
            } => {
                fields.source = Some(from.clone());
                fields.destination = Some(to.clone());
                fields.misc1 = Some(seed.as_str().into());
                fields.misc3 = Some(from_owner.as_str().into());
                fields.misc4 = Some(base.as_str().into());
                sol_amount(fields, *lamports);
            }
            Self::UpgradeNonceAccount { nonce } => {
                fields.misc1 = Some(nonce.as_str().into());
            }
        }
    }
}
