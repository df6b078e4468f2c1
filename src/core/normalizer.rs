use std::sync::Arc;
use std::time::Instant;

use futures::stream::{FuturesUnordered, StreamExt};

use crate::config::NormalizeConfig;
use crate::core::balance_changes::{native_balance_change, token_balance_changes};
use crate::core::constants::ProgramKind;
use crate::core::discriminator::Discriminator;
use crate::core::error::NormalizerError;
use crate::core::message_adapter::MessageAdapter;
use crate::core::record_assembler::{assemble, OwnerSummary};
use crate::core::utils::{lamports_to_sol, sort_by_idx, HasIdx};
use crate::lookup::{self, AccountSource};
use crate::protocols::{decode_instruction, variant_name, DecodeError, DecodedInstruction};
use crate::types::{NormalizedRecord, RawInstruction, RawTransaction, TransactionContext};

/// Result of decoding one instruction, tagged with its message position.
struct DecodeOutcome {
    idx: usize,
    kind: ProgramKind,
    disc: Discriminator,
    result: Result<DecodedInstruction, DecodeError>,
}

impl HasIdx for DecodeOutcome {
    fn idx(&self) -> usize {
        self.idx
    }
}

/// Turns a raw transaction into one normalized record per top-level instruction.
pub struct TransactionNormalizer {
    accounts: Arc<dyn AccountSource>,
    config: NormalizeConfig,
}

impl TransactionNormalizer {
    pub fn new(accounts: Arc<dyn AccountSource>, config: NormalizeConfig) -> Self {
        Self { accounts, config }
    }

    pub fn config(&self) -> &NormalizeConfig {
        &self.config
    }

    /// Normalize `tx`, tracking balances of `owner` (first signer when `None` or empty).
    pub async fn normalize(
        &self,
        tx: &RawTransaction,
        owner: Option<&str>,
    ) -> Result<Vec<NormalizedRecord>, NormalizerError> {
        let start = Instant::now();
        let adapter = MessageAdapter::new(tx)?;
        let instructions = adapter.instructions()?;

        let owner = self.resolve_owner(&adapter, owner).await;
        let context = build_context(tx, &adapter, owner);
        let summary = OwnerSummary::new(&context, self.config.trade_threshold_sol);
        tracing::debug!(
            "context built: signature={}, owner={}, token_changes={}, trade={}",
            context.signature,
            context.owner,
            context.token_changes.len(),
            summary.trade
        );

        let outcomes = self.decode_all(&instructions, &context).await;

        let mut records = Vec::with_capacity(outcomes.len());
        for outcome in outcomes {
            let DecodeOutcome {
                idx,
                kind,
                disc,
                result,
            } = outcome;
            let decoded = match result {
                Ok(decoded) => decoded,
                Err(error) if self.config.throw_error => {
                    return Err(NormalizerError::Instruction {
                        index: idx,
                        program: kind.tag(),
                        error,
                    });
                }
                Err(DecodeError::Lookup { error, partial }) => {
                    tracing::warn!(
                        "instruction {} ({}): account lookup failed, lookup fields left empty: {}",
                        idx,
                        kind.tag(),
                        error
                    );
                    *partial
                }
                Err(error) => {
                    tracing::warn!(
                        "instruction {} ({}): decode failed, emitting context only: {}",
                        idx,
                        kind.tag(),
                        error
                    );
                    DecodedInstruction::unrecognized(variant_name(kind, disc))
                }
            };

            let fields = decoded.fields();
            records.push(assemble(&context, &summary, kind, decoded.name(), fields));
        }

        tracing::info!(
            "normalized {}: instructions={}, elapsed={:.3}ms",
            context.signature,
            records.len(),
            start.elapsed().as_secs_f64() * 1000.0
        );
        Ok(records)
    }

    /// Decode every instruction concurrently; output is back in message order.
    async fn decode_all(
        &self,
        instructions: &[RawInstruction],
        context: &TransactionContext,
    ) -> Vec<DecodeOutcome> {
        let accounts = self.accounts.as_ref();
        let mut pending = FuturesUnordered::new();

        for ix in instructions {
            pending.push(async move {
                let kind = ProgramKind::from_address(&ix.program_id);
                let disc = Discriminator::extract(kind, &ix.data);
                tracing::debug!(
                    "decoding instruction {}: program={}, discriminator={}",
                    ix.index,
                    kind.tag(),
                    disc
                );
                let result = decode_instruction(kind, ix, disc, context, accounts).await;
                DecodeOutcome {
                    idx: ix.index,
                    kind,
                    disc,
                    result,
                }
            });
        }

        let mut outcomes = Vec::with_capacity(instructions.len());
        while let Some(outcome) = pending.next().await {
            outcomes.push(outcome);
        }
        sort_by_idx(outcomes)
    }

    /// A supplied token account stands for its owning wallet.
    async fn resolve_owner(&self, adapter: &MessageAdapter, owner: Option<&str>) -> String {
        let fallback = || adapter.signers().into_iter().next().unwrap_or_default();
        let Some(address) = owner.filter(|address| !address.is_empty()) else {
            return fallback();
        };

        match lookup::resolve_owner(self.accounts.as_ref(), address).await {
            Ok(resolved) => {
                if resolved != address {
                    tracing::info!("owner {} is a token account of {}", address, resolved);
                }
                resolved
            }
            Err(error) => {
                tracing::warn!("could not resolve owner {}, using it as given: {}", address, error);
                address.to_string()
            }
        }
    }
}

fn build_context(tx: &RawTransaction, adapter: &MessageAdapter, owner: String) -> TransactionContext {
    let account_keys = adapter.account_keys().to_vec();
    let meta = tx.meta.clone().unwrap_or_default();

    let native_change =
        native_balance_change(&account_keys, &meta.pre_balances, &meta.post_balances, &owner);
    let token_changes = token_balance_changes(
        meta.pre_token_balances.as_deref(),
        meta.post_token_balances.as_deref(),
        &owner,
        &account_keys,
    );

    TransactionContext {
        signature: tx.primary_signature(),
        slot: tx.slot,
        block_time: tx.block_time,
        err: meta.err,
        fee: lamports_to_sol(meta.fee.into()),
        signers: adapter.signers(),
        owner,
        native_change,
        token_changes,
        account_keys,
        pre_balances: meta.pre_balances,
        post_balances: meta.post_balances,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::constants::programs;
    use crate::lookup::StaticAccounts;
    use crate::types::{
        LegacyInstruction, LegacyMessage, MessageHeader, TransactionEnvelope, TransactionMessage,
        TransactionMeta,
    };

    const A: &str = "9WzDXwBbmkg8ZTbNMqUxvQRAyrZzDsGYdLVL9zYtAWWM";
    const B: &str = "Gh9ZwEmdLJ8DscKNTkTqPbNwLNNBjuSzaG9Vp2KGtKJr";

    fn transaction(instructions: Vec<LegacyInstruction>, keys: Vec<&str>) -> RawTransaction {
        RawTransaction {
            signature: Some("sig".to_string()),
            slot: 42,
            block_time: Some(1_700_000_000),
            meta: Some(TransactionMeta {
                fee: 5_000,
                pre_balances: vec![10_000_000_000, 0, 1, 1],
                post_balances: vec![8_499_995_000, 1_500_000_000, 1, 1],
                ..TransactionMeta::default()
            }),
            transaction: TransactionEnvelope {
                signatures: vec!["sig".to_string()],
                message: TransactionMessage::Legacy(LegacyMessage {
                    header: MessageHeader {
                        num_required_signatures: 1,
                        num_readonly_signed_accounts: 0,
                        num_readonly_unsigned_accounts: 2,
                    },
                    account_keys: keys.into_iter().map(str::to_string).collect(),
                    recent_blockhash: None,
                    instructions,
                }),
            },
            ..RawTransaction::default()
        }
    }

    fn transfer(lamports: u64) -> LegacyInstruction {
        let mut data = 2u32.to_le_bytes().to_vec();
        data.extend(lamports.to_le_bytes());
        LegacyInstruction {
            program_id_index: 2,
            accounts: vec![0, 1],
            data: bs58::encode(data).into_string(),
        }
    }

    fn normalizer(config: NormalizeConfig) -> TransactionNormalizer {
        TransactionNormalizer::new(Arc::new(StaticAccounts::new()), config)
    }

    #[tokio::test]
    async fn records_follow_message_order() {
        let unknown = LegacyInstruction {
            program_id_index: 3,
            accounts: vec![0],
            data: bs58::encode([7u8, 0, 0, 0]).into_string(),
        };
        let tx = transaction(
            vec![transfer(1_500_000_000), unknown, transfer(1)],
            vec![A, B, programs::SYSTEM, "Prog111111111111111111111111111111111111111"],
        );
        let records = normalizer(NormalizeConfig::default())
            .normalize(&tx, None)
            .await
            .unwrap();

        let names: Vec<&str> = records.iter().map(|r| r.instruction.as_str()).collect();
        assert_eq!(names, vec!["Transfer", "7", "Transfer"]);
        assert_eq!(records[0].ui_amount, Some(1.5));
        assert_eq!(records[1].program, "unknown");
        assert_eq!(records[2].amount, Some(1));
        assert_eq!(records[0].owner.as_deref(), Some(A));
        assert_eq!(records[0].fee, 0.000005);
        assert_eq!(records[0].signers, vec![A.to_string()]);
    }

    #[tokio::test]
    async fn malformed_payload_is_context_only_unless_strict() {
        let short = LegacyInstruction {
            program_id_index: 2,
            accounts: vec![0, 1],
            data: bs58::encode([2u8, 0, 0, 0, 1]).into_string(),
        };
        let tx = transaction(vec![short], vec![A, B, programs::SYSTEM, "X"]);

        let records = normalizer(NormalizeConfig::default())
            .normalize(&tx, Some(""))
            .await
            .unwrap();
        assert_eq!(records.len(), 1);
        assert_eq!(records[0].instruction, "Transfer");
        assert_eq!(records[0].program, "system");
        assert_eq!(records[0].source, None);
        assert_eq!(records[0].slot, 42);

        let err = normalizer(NormalizeConfig::strict())
            .normalize(&tx, None)
            .await
            .unwrap_err();
        assert!(matches!(
            err,
            NormalizerError::Instruction {
                index: 0,
                program: "system",
                ..
            }
        ));
    }

    #[tokio::test]
    async fn explicit_owner_is_tracked() {
        let tx = transaction(vec![transfer(1_500_000_000)], vec![A, B, programs::SYSTEM, "X"]);
        let records = normalizer(NormalizeConfig::default())
            .normalize(&tx, Some(B))
            .await
            .unwrap();
        assert_eq!(records[0].owner.as_deref(), Some(B));
        assert_eq!(records[0].change_balance_sol, Some(1.5));
        assert_eq!(records[0].trade, 0);
    }
}
