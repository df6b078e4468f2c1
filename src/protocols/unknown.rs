use tracing::debug;

use super::DecodedInstruction;
use crate::core::discriminator::Discriminator;
use crate::types::{InstructionFields, RawInstruction};

/// Instruction of a program without a registered decoder.
///
/// Named by its numeric discriminator; the payload is carried through as base58.
#[derive(Clone, Debug, PartialEq)]
pub struct UnknownInstruction {
    pub program_id: String,
    pub discriminator: Discriminator,
    pub data: Vec<u8>,
}

impl UnknownInstruction {
    pub fn project(&self, fields: &mut InstructionFields) {
        fields.misc1 = Some(bs58::encode(&self.data).into_string().into());
        fields.misc4 = Some(self.program_id.as_str().into());
    }
}

pub fn decode(ix: &RawInstruction, disc: Discriminator) -> DecodedInstruction {
    debug!(
        program_id = %ix.program_id,
        discriminator = %disc,
        data = %hex::encode(&ix.data),
        "no decoder registered for program"
    );
    DecodedInstruction::Unknown(UnknownInstruction {
        program_id: ix.program_id.clone(),
        discriminator: disc,
        data: ix.data.clone(),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::constants::ProgramKind;
    use crate::protocols::tests::instruction;
    use crate::types::MiscValue;

    const PROGRAM: &str = "JUP6LkbZbjS1jKKwapdHNy74zcZ3tLUZoi5QNyVTaV4";

    #[test]
    fn carries_payload_and_program() {
        let ix = instruction(PROGRAM, &["a"], vec![9, 0, 0, 0, 1, 2]);
        let decoded = decode(&ix, Discriminator::extract(ProgramKind::Unknown, &ix.data));
        assert_eq!(decoded.name(), "9");
        let fields = decoded.fields();
        assert_eq!(
            fields.misc1,
            Some(MiscValue::Text(bs58::encode([9u8, 0, 0, 0, 1, 2]).into_string()))
        );
        assert_eq!(fields.misc4, Some(MiscValue::Text(PROGRAM.into())));
        assert_eq!(fields.source, None);
    }

    #[test]
    fn empty_payload_uses_sentinel() {
        let ix = instruction(PROGRAM, &[], Vec::new());
        let decoded = decode(&ix, Discriminator::extract(ProgramKind::Unknown, &ix.data));
        assert_eq!(decoded.name(), "999");
        assert_eq!(decoded.fields().misc1, Some(MiscValue::Text(String::new())));
    }
}
