use std::fmt;

use byteorder::{ByteOrder, LittleEndian};

use crate::core::constants::ProgramKind;

/// Numeric value reported when no discriminator could be read.
pub const SENTINEL_DISCRIMINATOR: u32 = 999;

/// Leading bytes of an instruction payload identifying its variant.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Discriminator {
    Byte(u8),
    U32(u32),
    Sentinel,
}

impl Discriminator {
    /// Never fails: a payload too short for the program's width yields `Sentinel`.
    pub fn extract(kind: ProgramKind, data: &[u8]) -> Self {
        if kind.uses_byte_discriminator() {
            return data.first().map_or(Self::Sentinel, |byte| Self::Byte(*byte));
        }
        if data.len() < 4 {
            return Self::Sentinel;
        }
        Self::U32(LittleEndian::read_u32(&data[..4]))
    }

    pub fn value(self) -> u32 {
        match self {
            Self::Byte(byte) => byte.into(),
            Self::U32(value) => value,
            Self::Sentinel => SENTINEL_DISCRIMINATOR,
        }
    }

    /// First payload byte, for programs whose variant tag is one byte wide.
    pub fn leading_byte(self) -> Option<u8> {
        match self {
            Self::Byte(byte) => Some(byte),
            Self::U32(value) => Some((value & 0xff) as u8),
            Self::Sentinel => None,
        }
    }

    pub fn is_sentinel(self) -> bool {
        matches!(self, Self::Sentinel)
    }
}

impl fmt::Display for Discriminator {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.value())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn token_family_reads_one_byte() {
        assert_eq!(
            Discriminator::extract(ProgramKind::SplToken, &[3, 1, 2, 3, 4]),
            Discriminator::Byte(3)
        );
        assert_eq!(
            Discriminator::extract(ProgramKind::SplToken, &[]),
            Discriminator::Sentinel
        );
    }

    #[test]
    fn other_programs_read_u32_le() {
        let data = [2, 0, 0, 0, 0xff];
        assert_eq!(
            Discriminator::extract(ProgramKind::System, &data),
            Discriminator::U32(2)
        );
        assert_eq!(
            Discriminator::extract(ProgramKind::Unknown, &[1, 1, 0, 0]).value(),
            257
        );
    }

    #[test]
    fn short_payloads_yield_sentinel() {
        for kind in [ProgramKind::System, ProgramKind::Stake, ProgramKind::Unknown] {
            let disc = Discriminator::extract(kind, &[1, 2]);
            assert!(disc.is_sentinel());
            assert_eq!(disc.value(), SENTINEL_DISCRIMINATOR);
            assert_eq!(disc.to_string(), "999");
        }
    }

    #[test]
    fn extraction_is_pure() {
        let data = [4, 0, 0, 0, 9, 9];
        let first = Discriminator::extract(ProgramKind::Stake, &data);
        let _ = Discriminator::extract(ProgramKind::SplToken, &data);
        assert_eq!(first, Discriminator::extract(ProgramKind::Stake, &data));
    }

    #[test]
    fn leading_byte_is_low_byte() {
        let disc = Discriminator::extract(ProgramKind::ComputeBudget, &[3, 0x10, 0x27, 0, 0]);
        assert_eq!(disc.leading_byte(), Some(3));
        assert_eq!(Discriminator::Sentinel.leading_byte(), None);
    }
}
