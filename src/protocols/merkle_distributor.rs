use once_cell::sync::Lazy;
use sha2::{Digest, Sha256};

use super::binary_reader::BinaryReader;
use super::error::DecodeError;
use super::{account_at, DecodedInstruction, Project};
use crate::core::discriminator::Discriminator;
use crate::types::{InstructionFields, RawInstruction};

/// Anchor instruction discriminators are eight bytes wide.
const SIGHASH_WIDTH: usize = 8;

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum DistributorInstructionKind {
    NewDistributor,
    NewClaim,
    ClaimLocked,
    Clawback,
    SetClawbackReceiver,
    SetAdmin,
}

const DISTRIBUTOR_INSTRUCTIONS: [DistributorInstructionKind; 6] = [
    DistributorInstructionKind::NewDistributor,
    DistributorInstructionKind::NewClaim,
    DistributorInstructionKind::ClaimLocked,
    DistributorInstructionKind::Clawback,
    DistributorInstructionKind::SetClawbackReceiver,
    DistributorInstructionKind::SetAdmin,
];

/// Leading four bytes of `sha256("global:<name>")`, read little-endian.
static SIGHASHES: Lazy<Vec<(u32, DistributorInstructionKind)>> = Lazy::new(|| {
    DISTRIBUTOR_INSTRUCTIONS
        .iter()
        .map(|kind| (sighash(kind.method_name()), *kind))
        .collect()
});

fn sighash(method: &str) -> u32 {
    let digest = Sha256::digest(format!("global:{method}").as_bytes());
    u32::from_le_bytes([digest[0], digest[1], digest[2], digest[3]])
}

impl DistributorInstructionKind {
    pub fn from_discriminator(disc: Discriminator) -> Option<Self> {
        let Discriminator::U32(value) = disc else {
            return None;
        };
        SIGHASHES
            .iter()
            .find(|(hash, _)| *hash == value)
            .map(|(_, kind)| *kind)
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Self::NewDistributor => "NewDistributor",
            Self::NewClaim => "NewClaim",
            Self::ClaimLocked => "ClaimLocked",
            Self::Clawback => "Clawback",
            Self::SetClawbackReceiver => "SetClawbackReceiver",
            Self::SetAdmin => "SetAdmin",
        }
    }

    fn method_name(self) -> &'static str {
        match self {
            Self::NewDistributor => "new_distributor",
            Self::NewClaim => "new_claim",
            Self::ClaimLocked => "claim_locked",
            Self::Clawback => "clawback",
            Self::SetClawbackReceiver => "set_clawback_receiver",
            Self::SetAdmin => "set_admin",
        }
    }
}

#[derive(Clone, Debug, PartialEq)]
pub struct DistributorInstruction {
    pub instruction_type: DistributorInstructionKind,
    pub program_id: String,
    pub data: DistributorInstructionData,
}

#[derive(Clone, Debug, PartialEq)]
pub enum DistributorInstructionData {
    NewDistributor {
        distributor: String,
        clawback_receiver: String,
        mint: String,
        token_vault: String,
        admin: String,
        version: u64,
        max_total_claim: u64,
        max_num_nodes: u64,
    },
    /// New and locked claims; locked claims carry no amounts.
    Claim {
        distributor: String,
        from: String,
        to: String,
        claimant: String,
        amounts: Option<(u64, u64)>,
    },
    Clawback {
        distributor: String,
        from: String,
        to: String,
        claimant: String,
    },
    SetClawbackReceiver {
        distributor: String,
        new_receiver: String,
        admin: String,
    },
    SetAdmin {
        distributor: String,
        admin: String,
        new_admin: String,
    },
}

pub fn decode(ix: &RawInstruction, disc: Discriminator) -> Result<DecodedInstruction, DecodeError> {
    let Some(kind) = DistributorInstructionKind::from_discriminator(disc) else {
        return Ok(DecodedInstruction::unrecognized(disc.to_string()));
    };
    let mut reader = BinaryReader::after(&ix.data, SIGHASH_WIDTH)?;

    let data = match kind {
        DistributorInstructionKind::NewDistributor => {
            let version = reader.read_u64()?;
            reader.skip(32)?;
            let max_total_claim = reader.read_u64()?;
            let max_num_nodes = reader.read_u64()?;
            DistributorInstructionData::NewDistributor {
                distributor: account_at(ix, 0)?,
                clawback_receiver: account_at(ix, 1)?,
                mint: account_at(ix, 2)?,
                token_vault: account_at(ix, 3)?,
                admin: account_at(ix, 4)?,
                version,
                max_total_claim,
                max_num_nodes,
            }
        }
        DistributorInstructionKind::NewClaim | DistributorInstructionKind::ClaimLocked => {
            let amounts = if kind == DistributorInstructionKind::NewClaim {
                Some((reader.read_u64()?, reader.read_u64()?))
            } else {
                None
            };
            DistributorInstructionData::Claim {
                distributor: account_at(ix, 0)?,
                from: account_at(ix, 2)?,
                to: account_at(ix, 3)?,
                claimant: account_at(ix, 4)?,
                amounts,
            }
        }
        DistributorInstructionKind::Clawback => DistributorInstructionData::Clawback {
            distributor: account_at(ix, 0)?,
            from: account_at(ix, 1)?,
            to: account_at(ix, 2)?,
            claimant: account_at(ix, 3)?,
        },
        DistributorInstructionKind::SetClawbackReceiver => {
            DistributorInstructionData::SetClawbackReceiver {
                distributor: account_at(ix, 0)?,
                new_receiver: account_at(ix, 1)?,
                admin: account_at(ix, 2)?,
            }
        }
        DistributorInstructionKind::SetAdmin => DistributorInstructionData::SetAdmin {
            distributor: account_at(ix, 0)?,
            admin: account_at(ix, 1)?,
            new_admin: account_at(ix, 2)?,
        },
    };

    Ok(DecodedInstruction::MerkleDistributor(DistributorInstruction {
        instruction_type: kind,
        program_id: ix.program_id.clone(),
        data,
    }))
}

impl Project for DistributorInstruction {
    fn name(&self) -> &'static str {
        self.instruction_type.as_str()
    }

    fn project(&self, fields: &mut InstructionFields) {
        fields.misc4 = Some(self.program_id.as_str().into());
        match &self.data {
            DistributorInstructionData::NewDistributor {
                distributor,
                clawback_receiver,
                mint,
                token_vault,
                admin,
                version,
                max_total_claim,
                max_num_nodes,
            } => {
                fields.auth1 = Some(distributor.clone());
                fields.auth2 = Some(admin.clone());
                fields.source = Some(token_vault.clone());
                fields.destination = Some(clawback_receiver.clone());
                fields.misc1 = Some((*version).into());
                fields.misc2 = Some((*max_num_nodes).into());
                fields.misc3 = Some(mint.as_str().into());
                fields.amount = Some(*max_total_claim);
            }
            DistributorInstructionData::Claim {
                distributor,
                from,
                to,
                claimant,
                amounts,
            } => {
                fields.auth1 = Some(distributor.clone());
                fields.auth2 = Some(claimant.clone());
                fields.source = Some(from.clone());
                fields.destination = Some(to.clone());
                if let Some((unlocked, locked)) = amounts {
                    fields.amount = Some(*unlocked);
                    fields.misc3 = Some((*locked).into());
                }
            }
            DistributorInstructionData::Clawback {
                distributor,
                from,
                to,
                claimant,
            } => {
                fields.auth1 = Some(distributor.clone());
                fields.auth2 = Some(claimant.clone());
                fields.source = Some(from.clone());
                fields.destination = Some(to.clone());
            }
            DistributorInstructionData::SetClawbackReceiver {
                distributor,
                new_receiver,
                admin,
            } => {
                fields.auth1 = Some(distributor.clone());
                fields.auth3 = Some(admin.clone());
                fields.destination = Some(new_receiver.clone());
            }
            DistributorInstructionData::SetAdmin {
                distributor,
                admin,
                new_admin,
            } => {
                fields.auth1 = Some(distributor.clone());
                fields.auth2 = Some(new_admin.clone());
                fields.auth3 = Some(admin.clone());
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

    fn payload(method: &str, args: &[u8]) -> Vec<u8> {
        let digest = Sha256::digest(format!("global:{method}").as_bytes());
        let mut data = digest[..8].to_vec();
        data.extend_from_slice(args);
        data
    }

    fn run(data: Vec<u8>, accounts: &[&str]) -> DecodedInstruction {
        let ix = instruction(programs::MERKLE_DISTRIBUTOR, accounts, data);
        let disc = Discriminator::extract(ProgramKind::MerkleDistributor, &ix.data);
        decode(&ix, disc).unwrap()
    }

    #[test]
    fn sighash_table_matches_anchor() {
        assert_eq!(sighash("new_claim"), 2_070_065_486);
        assert_eq!(sighash("new_distributor"), 2_876_279_584);
        assert_eq!(
            DistributorInstructionKind::from_discriminator(Discriminator::U32(1_334_729_839)),
            Some(DistributorInstructionKind::Clawback)
        );
    }

    #[test]
    fn new_claim_reports_both_amounts() {
        let mut args = 1_000u64.to_le_bytes().to_vec();
        args.extend(250u64.to_le_bytes());
        args.extend(0u32.to_le_bytes());
        let decoded = run(
            payload("new_claim", &args),
            &["distributor", "status", "vault", "ata", "claimant"],
        );
        assert_eq!(decoded.name(), "NewClaim");
        let fields = decoded.fields();
        assert_eq!(fields.auth1.as_deref(), Some("distributor"));
        assert_eq!(fields.auth2.as_deref(), Some("claimant"));
        assert_eq!(fields.source.as_deref(), Some("vault"));
        assert_eq!(fields.destination.as_deref(), Some("ata"));
        assert_eq!(fields.amount, Some(1_000));
        assert_eq!(fields.misc3, Some(MiscValue::Unsigned(250)));
        assert_eq!(
            fields.misc4,
            Some(MiscValue::Text(programs::MERKLE_DISTRIBUTOR.into()))
        );
    }

    #[test]
    fn set_admin_maps_authorities() {
        let fields = run(payload("set_admin", &[]), &["distributor", "old", "new"]).fields();
        assert_eq!(fields.auth2.as_deref(), Some("new"));
        assert_eq!(fields.auth3.as_deref(), Some("old"));
    }

    #[test]
    fn unknown_sighash_is_numeric() {
        let decoded = run(vec![1, 0, 0, 0, 0, 0, 0, 0], &[]);
        assert_eq!(decoded, DecodedInstruction::unrecognized("1"));
    }
}
