use tracing::debug;

use super::binary_reader::BinaryReader;
use super::error::DecodeError;
use super::{account_at, token_amount, DecodedInstruction, Project};
use crate::core::discriminator::Discriminator;
use crate::lookup::{self, AccountSource};
use crate::types::{InstructionFields, MiscValue, RawInstruction};

/// Token program variants, keyed by the single leading tag byte.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum TokenInstructionKind {
    InitializeMint,
    InitializeAccount,
    InitializeMultisig,
    Transfer,
    Approve,
    Revoke,
    SetAuthority,
    MintTo,
    Burn,
    CloseAccount,
    FreezeAccount,
    ThawAccount,
    TransferChecked,
    ApproveChecked,
    MintToChecked,
    BurnChecked,
    InitializeAccount2,
    SyncNative,
    InitializeAccount3,
    InitializeMultisig2,
    InitializeMint2,
    GetAccountDataSize,
    InitializeImmutableOwner,
    AmountToUiAmount,
    UiAmountToAmount,
    InitializeMintCloseAuthority,
    TransferFeeExtension,
    ConfidentialTransferExtension,
    DefaultAccountStateExtension,
    Reallocate,
    MemoTransferExtension,
    CreateNativeMint,
    InitializeNonTransferableMint,
    InterestBearingMintExtension,
    CpiGuardExtension,
    InitializePermanentDelegate,
    TransferHookExtension,
}

const TOKEN_INSTRUCTIONS: [TokenInstructionKind; 37] = [
    TokenInstructionKind::InitializeMint,
    TokenInstructionKind::InitializeAccount,
    TokenInstructionKind::InitializeMultisig,
    TokenInstructionKind::Transfer,
    TokenInstructionKind::Approve,
    TokenInstructionKind::Revoke,
    TokenInstructionKind::SetAuthority,
    TokenInstructionKind::MintTo,
    TokenInstructionKind::Burn,
    TokenInstructionKind::CloseAccount,
    TokenInstructionKind::FreezeAccount,
    TokenInstructionKind::ThawAccount,
    TokenInstructionKind::TransferChecked,
    TokenInstructionKind::ApproveChecked,
    TokenInstructionKind::MintToChecked,
    TokenInstructionKind::BurnChecked,
    TokenInstructionKind::InitializeAccount2,
    TokenInstructionKind::SyncNative,
    TokenInstructionKind::InitializeAccount3,
    TokenInstructionKind::InitializeMultisig2,
    TokenInstructionKind::InitializeMint2,
    TokenInstructionKind::GetAccountDataSize,
    TokenInstructionKind::InitializeImmutableOwner,
    TokenInstructionKind::AmountToUiAmount,
    TokenInstructionKind::UiAmountToAmount,
    TokenInstructionKind::InitializeMintCloseAuthority,
    TokenInstructionKind::TransferFeeExtension,
    TokenInstructionKind::ConfidentialTransferExtension,
    TokenInstructionKind::DefaultAccountStateExtension,
    TokenInstructionKind::Reallocate,
    TokenInstructionKind::MemoTransferExtension,
    TokenInstructionKind::CreateNativeMint,
    TokenInstructionKind::InitializeNonTransferableMint,
    TokenInstructionKind::InterestBearingMintExtension,
    TokenInstructionKind::CpiGuardExtension,
    TokenInstructionKind::InitializePermanentDelegate,
    TokenInstructionKind::TransferHookExtension,
];

impl TokenInstructionKind {
    pub fn from_discriminator(disc: Discriminator) -> Option<Self> {
        let Discriminator::Byte(tag) = disc else {
            return None;
        };
        TOKEN_INSTRUCTIONS.get(tag as usize).copied()
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Self::InitializeMint => "InitializeMint",
            Self::InitializeAccount => "InitializeAccount",
            Self::InitializeMultisig => "InitializeMultisig",
            Self::Transfer => "Transfer",
            Self::Approve => "Approve",
            Self::Revoke => "Revoke",
            Self::SetAuthority => "SetAuthority",
            Self::MintTo => "MintTo",
            Self::Burn => "Burn",
            Self::CloseAccount => "CloseAccount",
            Self::FreezeAccount => "FreezeAccount",
            Self::ThawAccount => "ThawAccount",
            Self::TransferChecked => "TransferChecked",
            Self::ApproveChecked => "ApproveChecked",
            Self::MintToChecked => "MintToChecked",
            Self::BurnChecked => "BurnChecked",
            Self::InitializeAccount2 => "InitializeAccount2",
            Self::SyncNative => "SyncNative",
            Self::InitializeAccount3 => "InitializeAccount3",
            Self::InitializeMultisig2 => "InitializeMultisig2",
            Self::InitializeMint2 => "InitializeMint2",
            Self::GetAccountDataSize => "GetAccountDataSize",
            Self::InitializeImmutableOwner => "InitializeImmutableOwner",
            Self::AmountToUiAmount => "AmountToUiAmount",
            Self::UiAmountToAmount => "UiAmountToAmount",
            Self::InitializeMintCloseAuthority => "InitializeMintCloseAuthority",
            Self::TransferFeeExtension => "TransferFeeExtension",
            Self::ConfidentialTransferExtension => "ConfidentialTransferExtension",
            Self::DefaultAccountStateExtension => "DefaultAccountStateExtension",
            Self::Reallocate => "Reallocate",
            Self::MemoTransferExtension => "MemoTransferExtension",
            Self::CreateNativeMint => "CreateNativeMint",
            Self::InitializeNonTransferableMint => "InitializeNonTransferableMint",
            Self::InterestBearingMintExtension => "InterestBearingMintExtension",
            Self::CpiGuardExtension => "CpiGuardExtension",
            Self::InitializePermanentDelegate => "InitializePermanentDelegate",
            Self::TransferHookExtension => "TransferHookExtension",
        }
    }
}

#[derive(Clone, Debug, PartialEq)]
pub struct TokenInstruction {
    pub instruction_type: TokenInstructionKind,
    pub program_id: String,
    pub data: TokenInstructionData,
}

#[derive(Clone, Debug, PartialEq)]
pub enum TokenInstructionData {
    InitializeMint {
        mint: String,
        decimals: u8,
        mint_authority: String,
        freeze_authority: Option<String>,
    },
    InitializeAccount {
        account: String,
        mint: String,
        owner: String,
    },
    InitializeMultisig {
        multisig: String,
        signers: Vec<String>,
        m: u8,
    },
    /// `destination_owner`, `mint` and `decimals` come from account lookups.
    Transfer {
        source: String,
        destination: String,
        authority: String,
        signers: Vec<String>,
        amount: u64,
        destination_owner: Option<String>,
        mint: Option<String>,
        decimals: Option<u8>,
    },
    TransferChecked {
        source: String,
        mint: String,
        destination: String,
        authority: String,
        signers: Vec<String>,
        amount: u64,
        decimals: u8,
        destination_owner: Option<String>,
    },
    Approve {
        source: String,
        delegate: String,
        owner: String,
        signers: Vec<String>,
        amount: u64,
        checked: Option<(String, u8)>,
    },
    Revoke {
        source: String,
        owner: String,
        signers: Vec<String>,
    },
    SetAuthority {
        account: String,
        current_authority: String,
        signers: Vec<String>,
        authority_type: u8,
        new_authority: Option<String>,
    },
    MintTo {
        mint: String,
        destination: String,
        authority: String,
        signers: Vec<String>,
        amount: u64,
        decimals: Option<u8>,
    },
    Burn {
        account: String,
        mint: String,
        authority: String,
        signers: Vec<String>,
        amount: u64,
        decimals: Option<u8>,
    },
    CloseAccount {
        account: String,
        destination: String,
        authority: String,
        signers: Vec<String>,
    },
    /// Freeze or thaw.
    AccountState {
        account: String,
        mint: String,
        authority: String,
        signers: Vec<String>,
    },
    SyncNative {
        account: String,
    },
    GetAccountDataSize {
        mint: String,
    },
    InitializeImmutableOwner {
        account: String,
    },
    AmountToUiAmount {
        mint: String,
        amount: u64,
    },
    UiAmountToAmount {
        mint: String,
        ui_amount: String,
    },
    InitializeMintCloseAuthority {
        mint: String,
        close_authority: Option<String>,
    },
    /// Extension instruction carried through by name only.
    Extension,
}

pub async fn decode(
    ix: &RawInstruction,
    disc: Discriminator,
    accounts: &dyn AccountSource,
) -> Result<DecodedInstruction, DecodeError> {
    let Some(kind) = TokenInstructionKind::from_discriminator(disc) else {
        return Ok(DecodedInstruction::unrecognized(disc.to_string()));
    };
    let mut reader = BinaryReader::after(&ix.data, 1)?;
    let wrap = |data: TokenInstructionData| {
        DecodedInstruction::SplToken(TokenInstruction {
            instruction_type: kind,
            program_id: ix.program_id.clone(),
            data,
        })
    };

    let data = match kind {
        TokenInstructionKind::InitializeMint | TokenInstructionKind::InitializeMint2 => {
            TokenInstructionData::InitializeMint {
                mint: account_at(ix, 0)?,
                decimals: reader.read_u8()?,
                mint_authority: reader.read_pubkey()?,
                freeze_authority: reader.read_option_pubkey()?,
            }
        }
        TokenInstructionKind::InitializeAccount => TokenInstructionData::InitializeAccount {
            account: account_at(ix, 0)?,
            mint: account_at(ix, 1)?,
            owner: account_at(ix, 2)?,
        },
        TokenInstructionKind::InitializeAccount2 | TokenInstructionKind::InitializeAccount3 => {
            TokenInstructionData::InitializeAccount {
                account: account_at(ix, 0)?,
                mint: account_at(ix, 1)?,
                owner: reader.read_pubkey()?,
            }
        }
        TokenInstructionKind::InitializeMultisig => TokenInstructionData::InitializeMultisig {
            multisig: account_at(ix, 0)?,
            signers: ix.trailing_accounts(2),
            m: reader.read_u8()?,
        },
        TokenInstructionKind::InitializeMultisig2 => TokenInstructionData::InitializeMultisig {
            multisig: account_at(ix, 0)?,
            signers: ix.trailing_accounts(1),
            m: reader.read_u8()?,
        },
        TokenInstructionKind::Transfer => {
            let partial = TokenInstructionData::Transfer {
                source: account_at(ix, 0)?,
                destination: account_at(ix, 1)?,
                authority: account_at(ix, 2)?,
                signers: ix.trailing_accounts(3),
                amount: reader.read_u64()?,
                destination_owner: None,
                mint: None,
                decimals: None,
            };
            return resolve_transfer(partial, accounts).await.map(wrap).map_err(
                |(error, partial)| DecodeError::lookup(error, wrap(partial)),
            );
        }
        TokenInstructionKind::TransferChecked => {
            let destination = account_at(ix, 2)?;
            let mut data = TokenInstructionData::TransferChecked {
                source: account_at(ix, 0)?,
                mint: account_at(ix, 1)?,
                authority: account_at(ix, 3)?,
                signers: ix.trailing_accounts(4),
                amount: reader.read_u64()?,
                decimals: reader.read_u8()?,
                destination_owner: None,
                destination: destination.clone(),
            };
            match lookup::token_account_details(accounts, &destination).await {
                Ok(details) => {
                    if let TokenInstructionData::TransferChecked {
                        destination_owner, ..
                    } = &mut data
                    {
                        *destination_owner = Some(details.owner);
                    }
                    data
                }
                Err(error) => return Err(DecodeError::lookup(error, wrap(data))),
            }
        }
        TokenInstructionKind::Approve => TokenInstructionData::Approve {
            source: account_at(ix, 0)?,
            delegate: account_at(ix, 1)?,
            owner: account_at(ix, 2)?,
            signers: ix.trailing_accounts(3),
            amount: reader.read_u64()?,
            checked: None,
        },
        TokenInstructionKind::ApproveChecked => TokenInstructionData::Approve {
            source: account_at(ix, 0)?,
            delegate: account_at(ix, 2)?,
            owner: account_at(ix, 3)?,
            signers: ix.trailing_accounts(4),
            amount: reader.read_u64()?,
            checked: Some((account_at(ix, 1)?, reader.read_u8()?)),
        },
        TokenInstructionKind::Revoke => TokenInstructionData::Revoke {
            source: account_at(ix, 0)?,
            owner: account_at(ix, 1)?,
            signers: ix.trailing_accounts(2),
        },
        TokenInstructionKind::SetAuthority => TokenInstructionData::SetAuthority {
            account: account_at(ix, 0)?,
            current_authority: account_at(ix, 1)?,
            signers: ix.trailing_accounts(2),
            authority_type: reader.read_u8()?,
            new_authority: reader.read_option_pubkey()?,
        },
        TokenInstructionKind::MintTo | TokenInstructionKind::MintToChecked => {
            TokenInstructionData::MintTo {
                mint: account_at(ix, 0)?,
                destination: account_at(ix, 1)?,
                authority: account_at(ix, 2)?,
                signers: ix.trailing_accounts(3),
                amount: reader.read_u64()?,
                decimals: read_checked_decimals(kind, &mut reader)?,
            }
        }
        TokenInstructionKind::Burn | TokenInstructionKind::BurnChecked => {
            TokenInstructionData::Burn {
                account: account_at(ix, 0)?,
                mint: account_at(ix, 1)?,
                authority: account_at(ix, 2)?,
                signers: ix.trailing_accounts(3),
                amount: reader.read_u64()?,
                decimals: read_checked_decimals(kind, &mut reader)?,
            }
        }
        TokenInstructionKind::CloseAccount => TokenInstructionData::CloseAccount {
            account: account_at(ix, 0)?,
            destination: account_at(ix, 1)?,
            authority: account_at(ix, 2)?,
            signers: ix.trailing_accounts(3),
        },
        TokenInstructionKind::FreezeAccount | TokenInstructionKind::ThawAccount => {
            TokenInstructionData::AccountState {
                account: account_at(ix, 0)?,
                mint: account_at(ix, 1)?,
                authority: account_at(ix, 2)?,
                signers: ix.trailing_accounts(3),
            }
        }
        TokenInstructionKind::SyncNative => TokenInstructionData::SyncNative {
            account: account_at(ix, 0)?,
        },
        TokenInstructionKind::GetAccountDataSize => TokenInstructionData::GetAccountDataSize {
            mint: account_at(ix, 0)?,
        },
        TokenInstructionKind::InitializeImmutableOwner => {
            TokenInstructionData::InitializeImmutableOwner {
                account: account_at(ix, 0)?,
            }
        }
        TokenInstructionKind::AmountToUiAmount => TokenInstructionData::AmountToUiAmount {
            mint: account_at(ix, 0)?,
            amount: reader.read_u64()?,
        },
        TokenInstructionKind::UiAmountToAmount => TokenInstructionData::UiAmountToAmount {
            mint: account_at(ix, 0)?,
            ui_amount: reader.read_remaining_string()?,
        },
        TokenInstructionKind::InitializeMintCloseAuthority => {
            TokenInstructionData::InitializeMintCloseAuthority {
                mint: account_at(ix, 0)?,
                close_authority: reader.read_option_pubkey()?,
            }
        }
        _ => TokenInstructionData::Extension,
    };

    Ok(wrap(data))
}

fn read_checked_decimals(
    kind: TokenInstructionKind,
    reader: &mut BinaryReader<'_>,
) -> Result<Option<u8>, DecodeError> {
    match kind {
        TokenInstructionKind::MintToChecked | TokenInstructionKind::BurnChecked => {
            Ok(Some(reader.read_u8()?))
        }
        _ => Ok(None),
    }
}

/// Fill in the destination owner, mint and decimals of a plain transfer.
///
/// On failure the partially resolved transfer is handed back with the error.
async fn resolve_transfer(
    mut data: TokenInstructionData,
    accounts: &dyn AccountSource,
) -> Result<TokenInstructionData, (lookup::LookupError, TokenInstructionData)> {
    let TokenInstructionData::Transfer {
        destination,
        destination_owner,
        mint,
        decimals,
        ..
    } = &mut data
    else {
        return Ok(data);
    };

    let details = match lookup::token_account_details(accounts, destination).await {
        Ok(details) => details,
        Err(error) => return Err((error, data)),
    };
    debug!(
        destination = %destination,
        mint = %details.mint,
        "resolved transfer destination"
    );
    *destination_owner = Some(details.owner);
    let resolved_mint = details.mint;

    match lookup::mint_decimals(accounts, &resolved_mint).await {
        Ok(value) => {
            *mint = Some(resolved_mint);
            *decimals = Some(value);
            Ok(data)
        }
        Err(error) => {
            *mint = Some(resolved_mint);
            Err((error, data))
        }
    }
}

fn multisig(signers: &[String]) -> Option<MiscValue> {
    if signers.is_empty() {
        None
    } else {
        Some(MiscValue::List(signers.to_vec()))
    }
}

fn amount_with_decimals(fields: &mut InstructionFields, amount: u64, decimals: Option<u8>) {
    match decimals {
        Some(decimals) => {
            token_amount(fields, amount, decimals);
            fields.misc2 = Some(decimals.into());
        }
        None => fields.amount = Some(amount),
    }
}

impl Project for TokenInstruction {
    fn name(&self) -> &'static str {
        self.instruction_type.as_str()
    }

    fn project(&self, fields: &mut InstructionFields) {
        fields.misc4 = Some(self.program_id.as_str().into());
        match &self.data {
            TokenInstructionData::InitializeMint {
                mint,
                decimals,
                mint_authority,
                freeze_authority,
            } => {
                fields.auth1 = Some(mint_authority.clone());
                fields.auth2 = freeze_authority.clone();
                fields.misc2 = Some((*decimals).into());
                fields.misc3 = Some(mint.as_str().into());
            }
            TokenInstructionData::InitializeAccount {
                account,
                mint,
                owner,
            } => {
                fields.auth1 = Some(owner.clone());
                fields.source = Some(account.clone());
                fields.misc3 = Some(mint.as_str().into());
            }
            TokenInstructionData::InitializeMultisig {
                multisig: account,
                signers,
                m,
            } => {
                fields.source = Some(account.clone());
                fields.misc1 = multisig(signers);
                fields.misc3 = Some((*m).into());
            }
            TokenInstructionData::Transfer {
                source,
                destination,
                authority,
                signers,
                amount,
                destination_owner,
                mint,
                decimals,
            } => {
                fields.auth1 = Some(authority.clone());
                fields.auth2 = destination_owner.clone();
                fields.source = Some(source.clone());
                fields.destination = Some(destination.clone());
                fields.misc1 = multisig(signers);
                fields.misc3 = mint.as_deref().map(MiscValue::from);
                amount_with_decimals(fields, *amount, *decimals);
            }
            TokenInstructionData::TransferChecked {
                source,
                mint,
                destination,
                authority,
                signers,
                amount,
                decimals,
                destination_owner,
            } => {
                fields.auth1 = Some(authority.clone());
                fields.auth2 = destination_owner.clone();
                fields.source = Some(source.clone());
                fields.destination = Some(destination.clone());
                fields.misc1 = multisig(signers);
                fields.misc3 = Some(mint.as_str().into());
                amount_with_decimals(fields, *amount, Some(*decimals));
            }
            TokenInstructionData::Approve {
                source,
                delegate,
                owner,
                signers,
                amount,
                checked,
            } => {
                fields.auth1 = Some(owner.clone());
                fields.source = Some(source.clone());
                fields.destination = Some(delegate.clone());
                fields.misc1 = multisig(signers);
                fields.misc3 = checked.as_ref().map(|(mint, _)| mint.as_str().into());
                amount_with_decimals(fields, *amount, checked.as_ref().map(|(_, d)| *d));
            }
            TokenInstructionData::Revoke {
                source,
                owner,
                signers,
            } => {
                fields.auth1 = Some(owner.clone());
                fields.source = Some(source.clone());
                fields.misc1 = multisig(signers);
            }
            TokenInstructionData::SetAuthority {
                account,
                current_authority,
                signers,
                authority_type,
                new_authority,
            } => {
                fields.auth1 = Some(current_authority.clone());
                fields.auth2 = new_authority.clone();
                fields.source = Some(account.clone());
                fields.misc1 = multisig(signers);
                fields.misc2 = Some((*authority_type).into());
            }
            TokenInstructionData::MintTo {
                mint,
                destination,
                authority,
                signers,
                amount,
                decimals,
            } => {
                fields.auth1 = Some(authority.clone());
                fields.destination = Some(destination.clone());
                fields.misc1 = multisig(signers);
                fields.misc3 = Some(mint.as_str().into());
                amount_with_decimals(fields, *amount, *decimals);
            }
            TokenInstructionData::Burn {
                account,
                mint,
                authority,
                signers,
                amount,
                decimals,
            } => {
                fields.auth1 = Some(authority.clone());
                fields.source = Some(account.clone());
                fields.misc1 = multisig(signers);
                fields.misc3 = Some(mint.as_str().into());
                amount_with_decimals(fields, *amount, *decimals);
            }
            TokenInstructionData::CloseAccount {
                account,
                destination,
                authority,
                signers,
            } => {
                fields.auth1 = Some(authority.clone());
                fields.source = Some(account.clone());
                fields.destination = Some(destination.clone());
                fields.misc1 = multisig(signers);
            }
            TokenInstructionData::AccountState {
                account,
                mint,
                authority,
                signers,
            } => {
                fields.auth1 = Some(authority.clone());
                fields.source = Some(account.clone());
                fields.misc1 = multisig(signers);
                fields.misc3 = Some(mint.as_str().into());
            }
            TokenInstructionData::SyncNative { account }
            | TokenInstructionData::InitializeImmutableOwner { account } => {
                fields.source = Some(account.clone());
            }
            TokenInstructionData::GetAccountDataSize { mint } => {
                fields.misc3 = Some(mint.as_str().into());
            }
            TokenInstructionData::AmountToUiAmount { mint, amount } => {
                fields.misc3 = Some(mint.as_str().into());
                fields.amount = Some(*amount);
            }
            TokenInstructionData::UiAmountToAmount { mint, ui_amount } => {
                fields.misc1 = Some(ui_amount.as_str().into());
                fields.misc3 = Some(mint.as_str().into());
            }
            TokenInstructionData::InitializeMintCloseAuthority {
                mint,
                close_authority,
            } => {
                fields.auth1 = close_authority.clone();
                fields.misc3 = Some(mint.as_str().into());
            }
            TokenInstructionData::Extension => {}
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::constants::{programs, ProgramKind};
    use crate::lookup::{LookupError, StaticAccounts};
    use crate::protocols::tests::instruction;

    const MINT: &str = "EPjFWdd5AufqSSqeM2qN1xzybapC8G4wEGGkZwyTDt1v";
    const WALLET: &str = "9WzDXwBbmkg8ZTbNMqUxvQRAyrZzDsGYdLVL9zYtAWWM";
    const DEST: &str = "Gh9ZwEmdLJ8DscKNTkTqPbNwLNNBjuSzaG9Vp2KGtKJr";

    async fn run(
        data: Vec<u8>,
        accounts: &[&str],
        source: &StaticAccounts,
    ) -> Result<DecodedInstruction, DecodeError> {
        let ix = instruction(programs::SPL_TOKEN, accounts, data);
        let disc = Discriminator::extract(ProgramKind::SplToken, &ix.data);
        decode(&ix, disc, source).await
    }

    fn transfer_data(amount: u64) -> Vec<u8> {
        let mut data = vec![3u8];
        data.extend(amount.to_le_bytes());
        data
    }

    #[tokio::test]
    async fn transfer_resolves_owner_mint_and_decimals() {
        let source = StaticAccounts::new()
            .with_token_account(DEST, MINT, WALLET)
            .with_mint(MINT, 6);
        let decoded = run(transfer_data(2_500_000), &["src", DEST, "owner"], &source)
            .await
            .unwrap();
        assert_eq!(decoded.name(), "Transfer");
        let fields = decoded.fields();
        assert_eq!(fields.auth1.as_deref(), Some("owner"));
        assert_eq!(fields.auth2.as_deref(), Some(WALLET));
        assert_eq!(fields.misc2, Some(MiscValue::Unsigned(6)));
        assert_eq!(fields.misc3, Some(MiscValue::Text(MINT.into())));
        assert_eq!(
            fields.misc4,
            Some(MiscValue::Text(programs::SPL_TOKEN.into()))
        );
        assert_eq!(fields.amount, Some(2_500_000));
        assert_eq!(fields.ui_amount, Some(2.5));
        assert_eq!(fields.misc1, None);
    }

    #[tokio::test]
    async fn transfer_lookup_failure_keeps_partial_decode() {
        let source = StaticAccounts::new().with_token_account(DEST, MINT, WALLET);
        let err = run(transfer_data(7), &["src", DEST, "owner"], &source)
            .await
            .unwrap_err();
        let DecodeError::Lookup { error, partial } = err else {
            panic!("expected lookup failure");
        };
        assert!(matches!(error, LookupError::NotFound(ref missing) if missing == MINT));
        let fields = partial.fields();
        assert_eq!(fields.auth2.as_deref(), Some(WALLET));
        assert_eq!(fields.amount, Some(7));
        assert_eq!(fields.ui_amount, None);
        assert_eq!(fields.misc2, None);
    }

    #[tokio::test]
    async fn transfer_checked_uses_instruction_decimals() {
        let source = StaticAccounts::new().with_token_account(DEST, MINT, WALLET);
        let mut data = vec![12u8];
        data.extend(1_000_000_000u64.to_le_bytes());
        data.push(9);
        let fields = run(data, &["src", MINT, DEST, "owner", "m1", "m2"], &source)
            .await
            .unwrap()
            .fields();
        assert_eq!(fields.auth2.as_deref(), Some(WALLET));
        assert_eq!(fields.ui_amount, Some(1.0));
        assert_eq!(
            fields.misc1,
            Some(MiscValue::List(vec!["m1".into(), "m2".into()]))
        );
    }

    #[tokio::test]
    async fn set_authority_and_extensions() {
        let empty = StaticAccounts::new();
        let mut data = vec![6u8, 2, 1];
        data.extend([0u8; 32]);
        let fields = run(data, &["account", "current"], &empty)
            .await
            .unwrap()
            .fields();
        assert_eq!(fields.auth1.as_deref(), Some("current"));
        assert_eq!(
            fields.auth2.as_deref(),
            Some("11111111111111111111111111111111")
        );
        assert_eq!(fields.misc2, Some(MiscValue::Unsigned(2)));

        let decoded = run(vec![26, 1, 2, 3], &["mint"], &empty).await.unwrap();
        assert_eq!(decoded.name(), "TransferFeeExtension");
        let fields = decoded.fields();
        assert_eq!(
            fields.misc4,
            Some(MiscValue::Text(programs::SPL_TOKEN.into()))
        );
        assert_eq!(fields.source, None);

        let decoded = run(vec![200], &["mint"], &empty).await.unwrap();
        assert_eq!(decoded, DecodedInstruction::unrecognized("200"));
    }

    #[tokio::test]
    async fn ui_amount_to_amount_keeps_text() {
        let mut data = vec![24u8];
        data.extend(b"1.25");
        let fields = run(data, &["mint"], &StaticAccounts::new())
            .await
            .unwrap()
            .fields();
        assert_eq!(fields.misc1, Some(MiscValue::Text("1.25".into())));
        assert_eq!(fields.misc3, Some(MiscValue::Text("mint".into())));
    }
}
