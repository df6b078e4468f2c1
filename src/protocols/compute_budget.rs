use super::binary_reader::BinaryReader;
use super::error::DecodeError;
use super::{DecodedInstruction, Project};
use crate::core::discriminator::Discriminator;
use crate::types::{InstructionFields, RawInstruction};

/// Compute budget variants are tagged by the first payload byte.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ComputeBudgetInstructionKind {
    RequestUnits,
    RequestHeapFrame,
    SetComputeUnitLimit,
    SetComputeUnitPrice,
    SetLoadedAccountsDataSizeLimit,
}

impl ComputeBudgetInstructionKind {
    pub fn from_discriminator(disc: Discriminator) -> Option<Self> {
        let kind = match disc.leading_byte()? {
            0 => Self::RequestUnits,
            1 => Self::RequestHeapFrame,
            2 => Self::SetComputeUnitLimit,
            3 => Self::SetComputeUnitPrice,
            4 => Self::SetLoadedAccountsDataSizeLimit,
            _ => return None,
        };
        Some(kind)
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Self::RequestUnits => "RequestUnits",
            Self::RequestHeapFrame => "RequestHeapFrame",
            Self::SetComputeUnitLimit => "SetComputeUnitLimit",
            Self::SetComputeUnitPrice => "SetComputeUnitPrice",
            Self::SetLoadedAccountsDataSizeLimit => "SetLoadedAccountsDataSizeLimit",
        }
    }
}

#[derive(Clone, Debug, PartialEq)]
pub enum ComputeBudgetInstruction {
    RequestUnits { units: u32, additional_fee: u32 },
    RequestHeapFrame { bytes: u32 },
    SetComputeUnitLimit { units: u32 },
    SetComputeUnitPrice { micro_lamports: u64 },
    SetLoadedAccountsDataSizeLimit { bytes: u32 },
}

pub fn decode(ix: &RawInstruction, disc: Discriminator) -> Result<DecodedInstruction, DecodeError> {
    let Some(kind) = ComputeBudgetInstructionKind::from_discriminator(disc) else {
        return Ok(DecodedInstruction::unrecognized(disc.to_string()));
    };
    let mut reader = BinaryReader::after(&ix.data, 1)?;

    let decoded = match kind {
        ComputeBudgetInstructionKind::RequestUnits => ComputeBudgetInstruction::RequestUnits {
            units: reader.read_u32()?,
            additional_fee: reader.read_u32()?,
        },
        ComputeBudgetInstructionKind::RequestHeapFrame => {
            ComputeBudgetInstruction::RequestHeapFrame {
                bytes: reader.read_u32()?,
            }
        }
        ComputeBudgetInstructionKind::SetComputeUnitLimit => {
            ComputeBudgetInstruction::SetComputeUnitLimit {
                units: reader.read_u32()?,
            }
        }
        ComputeBudgetInstructionKind::SetComputeUnitPrice => {
            ComputeBudgetInstruction::SetComputeUnitPrice {
                micro_lamports: reader.read_u64()?,
            }
        }
        ComputeBudgetInstructionKind::SetLoadedAccountsDataSizeLimit => {
            ComputeBudgetInstruction::SetLoadedAccountsDataSizeLimit {
                bytes: reader.read_u32()?,
            }
        }
    };

    Ok(DecodedInstruction::ComputeBudget(decoded))
}

impl Project for ComputeBudgetInstruction {
    fn name(&self) -> &'static str {
        let kind = match self {
            Self::RequestUnits { .. } => ComputeBudgetInstructionKind::RequestUnits,
            Self::RequestHeapFrame { .. } => ComputeBudgetInstructionKind::RequestHeapFrame,
            Self::SetComputeUnitLimit { .. } => ComputeBudgetInstructionKind::SetComputeUnitLimit,
            Self::SetComputeUnitPrice { .. } => ComputeBudgetInstructionKind::SetComputeUnitPrice,
            Self::SetLoadedAccountsDataSizeLimit { .. } => {
                ComputeBudgetInstructionKind::SetLoadedAccountsDataSizeLimit
            }
        };
        kind.as_str()
    }

    fn project(&self, fields: &mut InstructionFields) {
        match self {
            Self::RequestUnits {
                units,
                additional_fee,
            } => {
                fields.misc1 = Some((*units).into());
                fields.misc2 = Some((*additional_fee).into());
            }
            Self::RequestHeapFrame { bytes } => fields.misc4 = Some((*bytes).into()),
            Self::SetComputeUnitLimit { units } => fields.misc1 = Some((*units).into()),
            Self::SetComputeUnitPrice { micro_lamports } => {
                fields.misc3 = Some((*micro_lamports).into())
            }
            Self::SetLoadedAccountsDataSizeLimit { bytes } => fields.misc4 = Some((*bytes).into()),
        }
    }
}
