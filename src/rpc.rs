use std::str::FromStr;
use std::sync::Arc;

use anyhow::{anyhow, Context, Result};
use async_trait::async_trait;
use solana_client::nonblocking::rpc_client::RpcClient;
use solana_client::rpc_config::RpcTransactionConfig;
use solana_sdk::commitment_config::CommitmentConfig;
use solana_sdk::pubkey::Pubkey;
use solana_sdk::signature::Signature;
use solana_sdk::transaction::TransactionVersion as SdkTransactionVersion;
use solana_transaction_status::{
    EncodedConfirmedTransactionWithStatusMeta, EncodedTransaction, UiLoadedAddresses, UiMessage,
    UiTransactionEncoding, UiTransactionStatusMeta, UiTransactionTokenBalance,
};

use crate::lookup::{AccountData, AccountSource, LookupError};
use crate::types::{
    CompiledInstruction, InstructionBytes, LegacyInstruction, LegacyMessage, LoadedAddresses,
    MessageHeader, RawTransaction, TokenAmount, TokenBalance, TransactionEnvelope,
    TransactionMessage, TransactionMeta, TransactionVersion, VersionedMessage,
};

pub const DEFAULT_RPC_URL: &str = "https://api.mainnet-beta.solana.com";

/// RPC client at `confirmed` commitment, shared by the fetch and account lookups.
pub fn connect(rpc_url: &str) -> Arc<RpcClient> {
    Arc::new(RpcClient::new_with_commitment(
        rpc_url.to_string(),
        CommitmentConfig::confirmed(),
    ))
}

/// Account lookups served by `getAccountInfo`.
pub struct RpcAccountSource {
    client: Arc<RpcClient>,
}

impl RpcAccountSource {
    pub fn new(client: Arc<RpcClient>) -> Self {
        Self { client }
    }
}

#[async_trait]
impl AccountSource for RpcAccountSource {
    async fn get_account(&self, address: &str) -> Result<AccountData, LookupError> {
        let pubkey = Pubkey::from_str(address)
            .map_err(|_| LookupError::InvalidAddress(address.to_string()))?;
        let response = self
            .client
            .get_account_with_commitment(&pubkey, self.client.commitment())
            .await
            .map_err(|err| LookupError::rpc(address, err.to_string()))?;
        let account = response
            .value
            .ok_or_else(|| LookupError::NotFound(address.to_string()))?;
        Ok(AccountData {
            owner: account.owner.to_string(),
            data: account.data,
        })
    }
}

/// Fetch a transaction and convert it into the internal `RawTransaction`.
///
/// `Json` yields the legacy message shape with base58 data, `Base64` the
/// versioned shape with raw bytes.
pub async fn fetch_transaction(
    client: &RpcClient,
    signature: &str,
    encoding: UiTransactionEncoding,
) -> Result<RawTransaction> {
    let parsed = Signature::from_str(signature).context("invalid signature")?;
    let config = RpcTransactionConfig {
        encoding: Some(encoding),
        commitment: Some(client.commitment()),
        max_supported_transaction_version: Some(0),
    };

    let encoded = client
        .get_transaction_with_config(&parsed, config)
        .await
        .with_context(|| format!("failed to fetch transaction {signature}"))?;
    let mut tx = convert_transaction(encoded)?;
    tx.signature = Some(signature.to_string());
    Ok(tx)
}

fn convert_transaction(tx: EncodedConfirmedTransactionWithStatusMeta) -> Result<RawTransaction> {
    let meta = tx
        .transaction
        .meta
        .as_ref()
        .map(convert_meta)
        .transpose()?;
    let (signatures, message) = convert_message(&tx.transaction.transaction)?;
    let version = tx.transaction.version.as_ref().map(|version| match version {
        SdkTransactionVersion::Legacy(_) => TransactionVersion::Label("legacy".to_string()),
        SdkTransactionVersion::Number(number) => TransactionVersion::Number((*number).into()),
    });

    Ok(RawTransaction {
        signature: signatures.first().cloned(),
        slot: tx.slot,
        block_time: tx.block_time,
        version,
        meta,
        transaction: TransactionEnvelope {
            signatures,
            message,
        },
    })
}

fn convert_message(encoded: &EncodedTransaction) -> Result<(Vec<String>, TransactionMessage)> {
    if let EncodedTransaction::Json(ui_tx) = encoded {
        let UiMessage::Raw(raw) = &ui_tx.message else {
            return Err(anyhow!("expected a raw message, got a parsed one"));
        };
        let message = LegacyMessage {
            header: MessageHeader {
                num_required_signatures: raw.header.num_required_signatures,
                num_readonly_signed_accounts: raw.header.num_readonly_signed_accounts,
                num_readonly_unsigned_accounts: raw.header.num_readonly_unsigned_accounts,
            },
            account_keys: raw.account_keys.clone(),
            recent_blockhash: Some(raw.recent_blockhash.clone()),
            instructions: raw
                .instructions
                .iter()
                .map(|ix| LegacyInstruction {
                    program_id_index: ix.program_id_index,
                    accounts: ix.accounts.clone(),
                    data: ix.data.clone(),
                })
                .collect(),
        };
        return Ok((ui_tx.signatures.clone(), TransactionMessage::Legacy(message)));
    }

    let versioned = encoded
        .decode()
        .ok_or_else(|| anyhow!("failed to decode binary transaction"))?;
    let header = versioned.message.header();
    let message = VersionedMessage {
        header: MessageHeader {
            num_required_signatures: header.num_required_signatures,
            num_readonly_signed_accounts: header.num_readonly_signed_accounts,
            num_readonly_unsigned_accounts: header.num_readonly_unsigned_accounts,
        },
        static_account_keys: versioned
            .message
            .static_account_keys()
            .iter()
            .map(Pubkey::to_string)
            .collect(),
        recent_blockhash: Some(versioned.message.recent_blockhash().to_string()),
        compiled_instructions: versioned
            .message
            .instructions()
            .iter()
            .map(|ix| CompiledInstruction {
                program_id_index: ix.program_id_index,
                account_key_indexes: ix.accounts.clone(),
                data: InstructionBytes::Bytes(ix.data.clone()),
            })
            .collect(),
    };
    let signatures = versioned
        .signatures
        .iter()
        .map(Signature::to_string)
        .collect();
    Ok((signatures, TransactionMessage::Versioned(message)))
}

fn convert_meta(meta: &UiTransactionStatusMeta) -> Result<TransactionMeta> {
    let err = meta
        .err
        .as_ref()
        .map(serde_json::to_value)
        .transpose()
        .context("failed to encode transaction error")?;
    let loaded_addresses = Option::<&UiLoadedAddresses>::from(meta.loaded_addresses.as_ref())
        .map(|loaded| LoadedAddresses {
            writable: loaded.writable.clone(),
            readonly: loaded.readonly.clone(),
        });

    Ok(TransactionMeta {
        err,
        fee: meta.fee,
        pre_balances: meta.pre_balances.clone(),
        post_balances: meta.post_balances.clone(),
        pre_token_balances: convert_token_balances(meta.pre_token_balances.as_ref().into()),
        post_token_balances: convert_token_balances(meta.post_token_balances.as_ref().into()),
        loaded_addresses,
    })
}

fn convert_token_balances(
    balances: Option<&Vec<UiTransactionTokenBalance>>,
) -> Option<Vec<TokenBalance>> {
    balances.map(|items| {
        items
            .iter()
            .map(|balance| {
                let amount = &balance.ui_token_amount;
                let mut ui_token_amount =
                    TokenAmount::new(amount.amount.clone(), amount.decimals, amount.ui_amount);
                ui_token_amount.ui_amount_string = Some(amount.ui_amount_string.clone());
                TokenBalance {
                    account_index: balance.account_index as usize,
                    mint: balance.mint.clone(),
                    owner: balance.owner.clone().into(),
                    program_id: balance.program_id.clone().into(),
                    ui_token_amount,
                }
            })
            .collect()
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use solana_account_decoder::parse_token::UiTokenAmount;
    use solana_transaction_status::option_serializer::OptionSerializer;

    #[test]
    fn token_balances_keep_owner_and_ui_string() {
        let balances = vec![UiTransactionTokenBalance {
            account_index: 3,
            mint: "mint".to_string(),
            ui_token_amount: UiTokenAmount {
                ui_amount: None,
                decimals: 6,
                amount: "1500000".to_string(),
                ui_amount_string: "1.5".to_string(),
            },
            owner: OptionSerializer::Some("owner".to_string()),
            program_id: OptionSerializer::None,
        }];

        let converted = convert_token_balances(Some(&balances)).unwrap();
        assert_eq!(converted[0].account_index, 3);
        assert_eq!(converted[0].owner.as_deref(), Some("owner"));
        assert_eq!(converted[0].program_id, None);
        assert_eq!(converted[0].ui_token_amount.ui_value(), 1.5);
        assert_eq!(convert_token_balances(None), None);
    }
}
