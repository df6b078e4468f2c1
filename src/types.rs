use base64_simd::STANDARD;
use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::core::utils::lamports_to_sol;

/* ----------------------------- input model ----------------------------- */

/// A confirmed transaction as returned by `getTransaction`.
#[derive(Clone, Debug, Default, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct RawTransaction {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub signature: Option<String>,
    #[serde(default)]
    pub slot: u64,
    #[serde(default)]
    pub block_time: Option<i64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub version: Option<TransactionVersion>,
    #[serde(default)]
    pub meta: Option<TransactionMeta>,
    pub transaction: TransactionEnvelope,
}

impl RawTransaction {
    /// Explicit signature if present, otherwise the first transaction signature.
    pub fn primary_signature(&self) -> String {
        self.signature
            .clone()
            .or_else(|| self.transaction.signatures.first().cloned())
            .unwrap_or_default()
    }
}

#[derive(Clone, Debug, Default, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct TransactionEnvelope {
    #[serde(default)]
    pub signatures: Vec<String>,
    pub message: TransactionMessage,
}

/// `"legacy"` or a numeric message version.
#[derive(Clone, Debug, Serialize, Deserialize, PartialEq, Eq)]
#[serde(untagged)]
pub enum TransactionVersion {
    Number(u64),
    Label(String),
}

/// The two message encodings found in the wild.
#[derive(Clone, Debug, Serialize, Deserialize, PartialEq)]
#[serde(untagged)]
pub enum TransactionMessage {
    Versioned(VersionedMessage),
    Legacy(LegacyMessage),
}

impl Default for TransactionMessage {
    fn default() -> Self {
        Self::Legacy(LegacyMessage::default())
    }
}

#[derive(Clone, Copy, Debug, Default, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct MessageHeader {
    pub num_required_signatures: u8,
    pub num_readonly_signed_accounts: u8,
    pub num_readonly_unsigned_accounts: u8,
}

#[derive(Clone, Debug, Default, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct LegacyMessage {
    pub header: MessageHeader,
    pub account_keys: Vec<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub recent_blockhash: Option<String>,
    pub instructions: Vec<LegacyInstruction>,
}

/// Instruction with base58 encoded data.
#[derive(Clone, Debug, Default, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct LegacyInstruction {
    pub program_id_index: u8,
    pub accounts: Vec<u8>,
    pub data: String,
}

#[derive(Clone, Debug, Default, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct VersionedMessage {
    pub header: MessageHeader,
    pub static_account_keys: Vec<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub recent_blockhash: Option<String>,
    pub compiled_instructions: Vec<CompiledInstruction>,
}

#[derive(Clone, Debug, Default, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct CompiledInstruction {
    pub program_id_index: u8,
    pub account_key_indexes: Vec<u8>,
    pub data: InstructionBytes,
}

/// Raw instruction payload: a byte array, a Node-style `{"type":"Buffer"}`
/// object or a base64 string.
#[derive(Clone, Debug, Serialize, Deserialize, PartialEq)]
#[serde(untagged)]
pub enum InstructionBytes {
    Bytes(Vec<u8>),
    Buffer { data: Vec<u8> },
    Base64(String),
}

impl Default for InstructionBytes {
    fn default() -> Self {
        Self::Bytes(Vec::new())
    }
}

impl InstructionBytes {
    pub fn to_vec(&self) -> Result<Vec<u8>, String> {
        match self {
            Self::Bytes(bytes) | Self::Buffer { data: bytes } => Ok(bytes.clone()),
            Self::Base64(encoded) if encoded.is_empty() => Ok(Vec::new()),
            Self::Base64(encoded) => STANDARD
                .decode_to_vec(encoded)
                .map_err(|err| format!("invalid base64 instruction data: {err}")),
        }
    }
}

#[derive(Clone, Debug, Default, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct TransactionMeta {
    #[serde(default)]
    pub err: Option<Value>,
    #[serde(default)]
    pub fee: u64,
    #[serde(default)]
    pub pre_balances: Vec<u64>,
    #[serde(default)]
    pub post_balances: Vec<u64>,
    #[serde(default)]
    pub pre_token_balances: Option<Vec<TokenBalance>>,
    #[serde(default)]
    pub post_token_balances: Option<Vec<TokenBalance>>,
    #[serde(default)]
    pub loaded_addresses: Option<LoadedAddresses>,
}

/// Addresses the node resolved from address lookup tables.
#[derive(Clone, Debug, Default, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct LoadedAddresses {
    #[serde(default)]
    pub writable: Vec<String>,
    #[serde(default)]
    pub readonly: Vec<String>,
}

/// Representation of a raw token amount and its UI value.
#[derive(Clone, Debug, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct TokenAmount {
    pub amount: String,
    #[serde(default)]
    pub ui_amount: Option<f64>,
    pub decimals: u8,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub ui_amount_string: Option<String>,
}

impl TokenAmount {
    pub fn new(amount: impl Into<String>, decimals: u8, ui_amount: Option<f64>) -> Self {
        Self {
            amount: amount.into(),
            ui_amount,
            decimals,
            ui_amount_string: None,
        }
    }

    /// Scaled value, falling back to `uiAmountString` and then to `amount`.
    pub fn ui_value(&self) -> f64 {
        if let Some(value) = self.ui_amount {
            return value;
        }
        if let Some(value) = self
            .ui_amount_string
            .as_deref()
            .and_then(|text| text.parse::<f64>().ok())
        {
            return value;
        }
        self.amount
            .parse::<u128>()
            .map(|raw| crate::core::utils::convert_to_ui_amount(raw, self.decimals))
            .unwrap_or(0.0)
    }
}

impl Default for TokenAmount {
    fn default() -> Self {
        Self::new("0", 0, Some(0.0))
    }
}

/// Snapshot of a token account balance from transaction meta.
#[derive(Clone, Debug, Default, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct TokenBalance {
    pub account_index: usize,
    pub mint: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub owner: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub program_id: Option<String>,
    pub ui_token_amount: TokenAmount,
}

/* ----------------------- canonical instruction view ----------------------- */

/// One account reference of an instruction with privileges resolved from the header.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct AccountMeta {
    pub pubkey: String,
    pub is_signer: bool,
    pub is_writable: bool,
}

/// A top-level instruction independent of the message encoding it came from.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct RawInstruction {
    pub index: usize,
    pub program_id: String,
    pub accounts: Vec<AccountMeta>,
    pub data: Vec<u8>,
}

impl RawInstruction {
    pub fn account(&self, position: usize) -> Option<&str> {
        self.accounts
            .get(position)
            .map(|meta| meta.pubkey.as_str())
    }

    /// Accounts from `start` onwards, used for multisig co-signers.
    pub fn trailing_accounts(&self, start: usize) -> Vec<String> {
        self.accounts
            .iter()
            .skip(start)
            .map(|meta| meta.pubkey.clone())
            .collect()
    }
}

/* ---------------------------- balance deltas ---------------------------- */

/// Native balance movement of the owner, in SOL.
#[derive(Clone, Debug, Default, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct NativeBalanceChange {
    pub owner: String,
    pub pre_balance: f64,
    pub post_balance: f64,
    pub change_balance: f64,
}

/// Token balance movement of one owner token account, in ui units.
#[derive(Clone, Debug, Default, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct TokenBalanceChange {
    pub account_index: usize,
    pub account: String,
    pub mint: String,
    pub pre_balance: f64,
    pub post_balance: f64,
    pub change_balance: f64,
}

/// Per-transaction data shared by every instruction record.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct TransactionContext {
    pub signature: String,
    pub slot: u64,
    pub block_time: Option<i64>,
    pub err: Option<Value>,
    /// Fee in SOL.
    pub fee: f64,
    pub signers: Vec<String>,
    pub owner: String,
    pub native_change: Option<NativeBalanceChange>,
    pub token_changes: Vec<TokenBalanceChange>,
    pub account_keys: Vec<String>,
    pub pre_balances: Vec<u64>,
    pub post_balances: Vec<u64>,
}

impl TransactionContext {
    /// Native balance change in SOL of the first account key equal to `address`.
    pub fn native_delta_of(&self, address: &str) -> Option<f64> {
        let index = self.account_keys.iter().position(|key| key == address)?;
        let pre = *self.pre_balances.get(index)?;
        let post = *self.post_balances.get(index)?;
        Some(lamports_to_sol(post as i128 - pre as i128))
    }
}

/* ------------------------------ output model ------------------------------ */

/// Value of a program-specific `misc` column.
#[derive(Clone, Debug, Serialize, Deserialize, PartialEq)]
#[serde(untagged)]
pub enum MiscValue {
    Unsigned(u64),
    Signed(i64),
    Text(String),
    List(Vec<String>),
}

impl From<u64> for MiscValue {
    fn from(value: u64) -> Self {
        Self::Unsigned(value)
    }
}

impl From<u32> for MiscValue {
    fn from(value: u32) -> Self {
        Self::Unsigned(value.into())
    }
}

impl From<u8> for MiscValue {
    fn from(value: u8) -> Self {
        Self::Unsigned(value.into())
    }
}

impl From<i64> for MiscValue {
    fn from(value: i64) -> Self {
        Self::Signed(value)
    }
}

impl From<String> for MiscValue {
    fn from(value: String) -> Self {
        Self::Text(value)
    }
}

impl From<&str> for MiscValue {
    fn from(value: &str) -> Self {
        Self::Text(value.to_string())
    }
}

impl From<Vec<String>> for MiscValue {
    fn from(value: Vec<String>) -> Self {
        Self::List(value)
    }
}

/// Program-specific slots a decoded instruction projects onto.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct InstructionFields {
    pub auth1: Option<String>,
    pub auth2: Option<String>,
    pub auth3: Option<String>,
    pub source: Option<String>,
    pub destination: Option<String>,
    pub misc1: Option<MiscValue>,
    pub misc2: Option<MiscValue>,
    pub misc3: Option<MiscValue>,
    pub misc4: Option<MiscValue>,
    pub amount: Option<u64>,
    pub ui_amount: Option<f64>,
}

/// One output row. Every instruction, whatever its program, fills this schema.
#[derive(Clone, Debug, Default, Serialize, Deserialize, PartialEq)]
pub struct NormalizedRecord {
    pub program: String,
    pub instruction: String,
    pub signature: String,
    pub err: Option<Value>,
    pub slot: u64,
    pub blocktime: Option<i64>,
    pub fee: f64,
    pub auth1: Option<String>,
    pub auth2: Option<String>,
    pub auth3: Option<String>,
    pub source: Option<String>,
    pub destination: Option<String>,
    pub misc1: Option<MiscValue>,
    pub misc2: Option<MiscValue>,
    pub misc3: Option<MiscValue>,
    pub misc4: Option<MiscValue>,
    pub amount: Option<u64>,
    #[serde(rename = "uiAmount")]
    pub ui_amount: Option<f64>,
    pub signers: Vec<String>,
    pub owner: Option<String>,
    #[serde(rename = "preBalance_sol")]
    pub pre_balance_sol: Option<f64>,
    #[serde(rename = "postBalance_sol")]
    pub post_balance_sol: Option<f64>,
    #[serde(rename = "changeBalance_sol")]
    pub change_balance_sol: Option<f64>,
    #[serde(rename = "accountIndex_inc")]
    pub account_index_inc: Option<usize>,
    pub account_inc: Option<String>,
    pub mint_inc: Option<String>,
    #[serde(rename = "preBalance_inc")]
    pub pre_balance_inc: Option<f64>,
    #[serde(rename = "postBalance_inc")]
    pub post_balance_inc: Option<f64>,
    #[serde(rename = "changeBalance_inc")]
    pub change_balance_inc: Option<f64>,
    #[serde(rename = "accountIndex_dec")]
    pub account_index_dec: Option<usize>,
    pub account_dec: Option<String>,
    pub mint_dec: Option<String>,
    #[serde(rename = "preBalance_dec")]
    pub pre_balance_dec: Option<f64>,
    #[serde(rename = "postBalance_dec")]
    pub post_balance_dec: Option<f64>,
    #[serde(rename = "changeBalance_dec")]
    pub change_balance_dec: Option<f64>,
    #[serde(rename = "ownerTokenBalanceChanges_overflow")]
    pub owner_token_balance_changes_overflow: Option<Vec<TokenBalanceChange>>,
    pub trade: u8,
}
