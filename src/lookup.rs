//! Account lookups used while decoding token instructions.

use std::collections::HashMap;

use arrayref::{array_ref, array_refs};
use async_trait::async_trait;
use thiserror::Error;

use crate::core::constants::{
    programs, MINT_DECIMALS_OFFSET, TOKEN_ACCOUNT_MIN_LEN, TOKEN_ACCOUNT_MINT_OFFSET,
};

/// Raw on-chain account: owning program and data bytes.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct AccountData {
    pub owner: String,
    pub data: Vec<u8>,
}

#[derive(Debug, Error)]
pub enum LookupError {
    #[error("account {0} not found")]
    NotFound(String),
    #[error("invalid account address {0}")]
    InvalidAddress(String),
    #[error("account {address} holds {len} bytes, expected at least {needed}")]
    TooShort {
        address: String,
        len: usize,
        needed: usize,
    },
    #[error("rpc request for {address} failed: {message}")]
    Rpc { address: String, message: String },
}

impl LookupError {
    pub fn rpc(address: impl Into<String>, message: impl Into<String>) -> Self {
        Self::Rpc {
            address: address.into(),
            message: message.into(),
        }
    }
}

/// Read-only access to account state, shared by all concurrent decodes.
#[async_trait]
pub trait AccountSource: Send + Sync {
    async fn get_account(&self, address: &str) -> Result<AccountData, LookupError>;
}

/// Mint and owner of a token account.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct TokenAccountDetails {
    pub mint: String,
    pub owner: String,
}

pub fn parse_token_account(address: &str, data: &[u8]) -> Result<TokenAccountDetails, LookupError> {
    if data.len() < TOKEN_ACCOUNT_MIN_LEN {
        return Err(LookupError::TooShort {
            address: address.to_string(),
            len: data.len(),
            needed: TOKEN_ACCOUNT_MIN_LEN,
        });
    }
    let head = array_ref![data, TOKEN_ACCOUNT_MINT_OFFSET, 64];
    let (mint, owner) = array_refs![head, 32, 32];
    Ok(TokenAccountDetails {
        mint: bs58::encode(mint).into_string(),
        owner: bs58::encode(owner).into_string(),
    })
}

pub fn parse_mint_decimals(address: &str, data: &[u8]) -> Result<u8, LookupError> {
    data.get(MINT_DECIMALS_OFFSET)
        .copied()
        .ok_or_else(|| LookupError::TooShort {
            address: address.to_string(),
            len: data.len(),
            needed: MINT_DECIMALS_OFFSET + 1,
        })
}

pub async fn token_account_details(
    source: &dyn AccountSource,
    address: &str,
) -> Result<TokenAccountDetails, LookupError> {
    let account = source.get_account(address).await?;
    parse_token_account(address, &account.data)
}

pub async fn mint_decimals(source: &dyn AccountSource, mint: &str) -> Result<u8, LookupError> {
    let account = source.get_account(mint).await?;
    parse_mint_decimals(mint, &account.data)
}

pub fn is_token_program(address: &str) -> bool {
    address == spl_token::id().to_string() || address == programs::TOKEN_2022
}

/// Wallet that owns `address`: the token account owner when `address` is a
/// token account, `address` itself otherwise (including when it does not exist).
pub async fn resolve_owner(
    source: &dyn AccountSource,
    address: &str,
) -> Result<String, LookupError> {
    let account = match source.get_account(address).await {
        Ok(account) => account,
        Err(LookupError::NotFound(_)) => return Ok(address.to_string()),
        Err(err) => return Err(err),
    };
    if !is_token_program(&account.owner) {
        return Ok(address.to_string());
    }
    parse_token_account(address, &account.data).map(|details| details.owner)
}

/// In-memory account source with canned data.
#[derive(Clone, Debug, Default)]
pub struct StaticAccounts {
    accounts: HashMap<String, AccountData>,
}

impl StaticAccounts {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&mut self, address: impl Into<String>, account: AccountData) {
        self.accounts.insert(address.into(), account);
    }

    /// Register a token account laid out as mint || owner || amount.
    pub fn with_token_account(mut self, address: &str, mint: &str, owner: &str) -> Self {
        let mut data = Vec::with_capacity(165);
        data.extend(decode_key(mint));
        data.extend(decode_key(owner));
        data.resize(165, 0);
        self.insert(
            address,
            AccountData {
                owner: programs::SPL_TOKEN.to_string(),
                data,
            },
        );
        self
    }

    pub fn with_mint(mut self, address: &str, decimals: u8) -> Self {
        let mut data = vec![0u8; 82];
        data[MINT_DECIMALS_OFFSET] = decimals;
        self.insert(
            address,
            AccountData {
                owner: programs::SPL_TOKEN.to_string(),
                data,
            },
        );
        self
    }
}

fn decode_key(address: &str) -> [u8; 32] {
    let mut key = [0u8; 32];
    if let Ok(bytes) = bs58::decode(address).into_vec() {
        let len = bytes.len().min(32);
        key[..len].copy_from_slice(&bytes[..len]);
    }
    key
}

#[async_trait]
impl AccountSource for StaticAccounts {
    async fn get_account(&self, address: &str) -> Result<AccountData, LookupError> {
        self.accounts
            .get(address)
            .cloned()
            .ok_or_else(|| LookupError::NotFound(address.to_string()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const MINT: &str = "EPjFWdd5AufqSSqeM2qN1xzybapC8G4wEGGkZwyTDt1v";
    const WALLET: &str = "9WzDXwBbmkg8ZTbNMqUxvQRAyrZzDsGYdLVL9zYtAWWM";
    const ATA: &str = "Gh9ZwEmdLJ8DscKNTkTqPbNwLNNBjuSzaG9Vp2KGtKJr";

    #[tokio::test]
    async fn reads_token_account_layout() {
        let accounts = StaticAccounts::new()
            .with_token_account(ATA, MINT, WALLET)
            .with_mint(MINT, 6);

        let details = token_account_details(&accounts, ATA).await.unwrap();
        assert_eq!(details.mint, MINT);
        assert_eq!(details.owner, WALLET);
        assert_eq!(mint_decimals(&accounts, MINT).await.unwrap(), 6);
    }

    #[tokio::test]
    async fn short_or_missing_accounts_fail() {
        let mut accounts = StaticAccounts::new();
        accounts.insert(
            ATA,
            AccountData {
                owner: programs::SPL_TOKEN.to_string(),
                data: vec![0; 40],
            },
        );
        assert!(matches!(
            token_account_details(&accounts, ATA).await,
            Err(LookupError::TooShort { len: 40, .. })
        ));
        assert!(matches!(
            mint_decimals(&accounts, MINT).await,
            Err(LookupError::NotFound(_))
        ));
    }

    #[tokio::test]
    async fn resolves_token_account_owner() {
        let accounts = StaticAccounts::new().with_token_account(ATA, MINT, WALLET);
        assert_eq!(resolve_owner(&accounts, ATA).await.unwrap(), WALLET);
        assert_eq!(resolve_owner(&accounts, WALLET).await.unwrap(), WALLET);
    }
}
