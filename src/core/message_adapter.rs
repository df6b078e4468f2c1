use crate::core::error::NormalizerError;
use crate::types::{
    AccountMeta, MessageHeader, RawInstruction, RawTransaction, TransactionMessage,
    TransactionVersion,
};

/// Instruction with account indexes and decoded payload, before key resolution.
#[derive(Clone, Debug)]
struct CompiledView {
    program_id_index: usize,
    account_indexes: Vec<usize>,
    data: Vec<u8>,
}

/// Uniform access to a transaction message regardless of its encoding.
///
/// Legacy messages carry `accountKeys` and base58 instruction data, versioned
/// ones carry `staticAccountKeys` and raw bytes. Both resolve signer and
/// writable flags from the privilege header and the account position.
#[derive(Clone, Debug)]
pub struct MessageAdapter {
    header: MessageHeader,
    account_keys: Vec<String>,
    static_count: usize,
    loaded_writable_count: usize,
    compiled: Vec<CompiledView>,
}

impl MessageAdapter {
    pub fn new(tx: &RawTransaction) -> Result<Self, NormalizerError> {
        check_version(tx.version.as_ref())?;

        let (header, mut account_keys, compiled) = match &tx.transaction.message {
            TransactionMessage::Legacy(message) => {
                let compiled = message
                    .instructions
                    .iter()
                    .enumerate()
                    .map(|(position, ix)| {
                        let data = bs58::decode(&ix.data).into_vec().map_err(|err| {
                            NormalizerError::message(format!(
                                "instruction {position} has invalid base58 data: {err}"
                            ))
                        })?;
                        Ok(CompiledView {
                            program_id_index: ix.program_id_index as usize,
                            account_indexes: ix.accounts.iter().map(|i| *i as usize).collect(),
                            data,
                        })
                    })
                    .collect::<Result<Vec<_>, NormalizerError>>()?;
                (message.header, message.account_keys.clone(), compiled)
            }
            TransactionMessage::Versioned(message) => {
                let compiled = message
                    .compiled_instructions
                    .iter()
                    .enumerate()
                    .map(|(position, ix)| {
                        let data = ix.data.to_vec().map_err(|err| {
                            NormalizerError::message(format!("instruction {position}: {err}"))
                        })?;
                        Ok(CompiledView {
                            program_id_index: ix.program_id_index as usize,
                            account_indexes: ix
                                .account_key_indexes
                                .iter()
                                .map(|i| *i as usize)
                                .collect(),
                            data,
                        })
                    })
                    .collect::<Result<Vec<_>, NormalizerError>>()?;
                (
                    message.header,
                    message.static_account_keys.clone(),
                    compiled,
                )
            }
        };

        let static_count = account_keys.len();
        let mut loaded_writable_count = 0;
        if let Some(loaded) = tx.meta.as_ref().and_then(|meta| meta.loaded_addresses.as_ref()) {
            loaded_writable_count = loaded.writable.len();
            account_keys.extend(loaded.writable.iter().cloned());
            account_keys.extend(loaded.readonly.iter().cloned());
        }

        Ok(Self {
            header,
            account_keys,
            static_count,
            loaded_writable_count,
            compiled,
        })
    }

    pub fn header(&self) -> MessageHeader {
        self.header
    }

    /// Static keys followed by loaded writable and loaded readonly addresses.
    pub fn account_keys(&self) -> &[String] {
        &self.account_keys
    }

    pub fn signers(&self) -> Vec<String> {
        self.account_keys
            .iter()
            .take(self.signer_count())
            .cloned()
            .collect()
    }

    pub fn is_signer(&self, index: usize) -> bool {
        index < self.signer_count()
    }

    /// Readonly signers are the trailing `numReadonlySignedAccounts` of the
    /// signer range; readonly non-signers are the trailing
    /// `numReadonlyUnsignedAccounts` of the static keys.
    pub fn is_writable(&self, index: usize) -> bool {
        let signers = self.signer_count();
        if index < signers {
            let readonly = self.header.num_readonly_signed_accounts as usize;
            return index < signers.saturating_sub(readonly);
        }
        if index < self.static_count {
            let readonly = self.header.num_readonly_unsigned_accounts as usize;
            return index < self.static_count.saturating_sub(readonly);
        }
        index < self.static_count + self.loaded_writable_count
    }

    fn signer_count(&self) -> usize {
        (self.header.num_required_signatures as usize).min(self.static_count)
    }

    fn account_meta(&self, index: usize) -> AccountMeta {
        AccountMeta {
            // unresolved lookup-table entries surface as empty addresses
            pubkey: self.account_keys.get(index).cloned().unwrap_or_default(),
            is_signer: self.is_signer(index),
            is_writable: self.is_writable(index),
        }
    }

    /// Canonical top-level instruction list in message order.
    pub fn instructions(&self) -> Result<Vec<RawInstruction>, NormalizerError> {
        self.compiled
            .iter()
            .enumerate()
            .map(|(index, ix)| {
                let program_id = self
                    .account_keys
                    .get(ix.program_id_index)
                    .cloned()
                    .ok_or_else(|| {
                        NormalizerError::message(format!(
                            "instruction {index} references program index {} of {} keys",
                            ix.program_id_index,
                            self.account_keys.len()
                        ))
                    })?;
                Ok(RawInstruction {
                    index,
                    program_id,
                    accounts: ix
                        .account_indexes
                        .iter()
                        .map(|account| self.account_meta(*account))
                        .collect(),
                    data: ix.data.clone(),
                })
            })
            .collect()
    }
}

fn check_version(version: Option<&TransactionVersion>) -> Result<(), NormalizerError> {
    match version {
        None | Some(TransactionVersion::Number(0)) => Ok(()),
        Some(TransactionVersion::Label(label)) if label == "legacy" => Ok(()),
        Some(TransactionVersion::Number(other)) => {
            Err(NormalizerError::unsupported_version(other.to_string()))
        }
        Some(TransactionVersion::Label(other)) => {
            Err(NormalizerError::unsupported_version(other.clone()))
        }
    }
}
