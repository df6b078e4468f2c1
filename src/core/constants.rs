use serde::{Deserialize, Serialize};

pub mod programs {
    pub const SYSTEM: &str = "11111111111111111111111111111111";
    pub const STAKE: &str = "Stake11111111111111111111111111111111111111";
    pub const VOTE: &str = "Vote111111111111111111111111111111111111111";
    pub const SPL_TOKEN: &str = "TokenkegQfeZyiNwAJbNbGKPFXCWuBvf9Ss623VQ5DA";
    pub const TOKEN_2022: &str = "TokenzQdBNbLqP5VEhdkAS6EPFLC1PHnBqCXEpPxuEb";
    pub const COMPUTE_BUDGET: &str = "ComputeBudget111111111111111111111111111111";
    pub const MERKLE_DISTRIBUTOR: &str = "MErKy6nZVoVAkryxAejJz2juifQ4ArgLgHmaJCQkU7N";
}

/// Program families the normalizer knows how to decode.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum ProgramKind {
    System,
    Stake,
    Vote,
    SplToken,
    ComputeBudget,
    MerkleDistributor,
    Unknown,
}

impl ProgramKind {
    /// Exact-match registry lookup; unregistered addresses are `Unknown`.
    pub fn from_address(address: &str) -> Self {
        program_kinds::lookup(address)
    }

    /// Tag written to the `program` column.
    pub fn tag(self) -> &'static str {
        match self {
            Self::System => "system",
            Self::Stake => "stake",
            Self::Vote => "vote",
            Self::SplToken => "spl-token",
            Self::ComputeBudget => "compute-budget",
            Self::MerkleDistributor => "merkle-distributor",
            Self::Unknown => "unknown",
        }
    }

    /// The token program family tags instructions with a single leading byte.
    pub fn uses_byte_discriminator(self) -> bool {
        matches!(self, Self::SplToken)
    }
}

pub mod program_kinds {
    use super::{programs, ProgramKind};
    use once_cell::sync::Lazy;
    use std::collections::HashMap;

    static PROGRAM_KIND: Lazy<HashMap<&'static str, ProgramKind>> = Lazy::new(|| {
        let mut map = HashMap::new();
        map.insert(programs::SYSTEM, ProgramKind::System);
        map.insert(programs::STAKE, ProgramKind::Stake);
        map.insert(programs::VOTE, ProgramKind::Vote);
        map.insert(programs::SPL_TOKEN, ProgramKind::SplToken);
        map.insert(programs::TOKEN_2022, ProgramKind::SplToken);
        map.insert(programs::COMPUTE_BUDGET, ProgramKind::ComputeBudget);
        map.insert(programs::MERKLE_DISTRIBUTOR, ProgramKind::MerkleDistributor);
        map
    });

    pub fn lookup(address: &str) -> ProgramKind {
        PROGRAM_KIND
            .get(address)
            .copied()
            .unwrap_or(ProgramKind::Unknown)
    }
}

/// Token accounts carry the mint at [0, 32) and the owner at [32, 64).
pub const TOKEN_ACCOUNT_MINT_OFFSET: usize = 0;
pub const TOKEN_ACCOUNT_MIN_LEN: usize = 64;
/// Mint accounts carry `decimals` as a single byte here.
pub const MINT_DECIMALS_OFFSET: usize = 44;
