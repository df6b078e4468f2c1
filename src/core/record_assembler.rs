use crate::core::constants::ProgramKind;
use crate::types::{
    InstructionFields, NativeBalanceChange, NormalizedRecord, TokenBalanceChange,
    TransactionContext,
};

/// Owner deltas folded into the per-record balance columns.
///
/// Computed once per transaction and shared by every record of it.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct OwnerSummary {
    pub native: Option<NativeBalanceChange>,
    pub increase: Option<TokenBalanceChange>,
    pub decrease: Option<TokenBalanceChange>,
    pub overflow: Option<Vec<TokenBalanceChange>>,
    pub trade: bool,
}

impl OwnerSummary {
    pub fn new(context: &TransactionContext, trade_threshold_sol: f64) -> Self {
        let (increase, decrease, overflow) = split_token_changes(&context.token_changes);
        let native_change = context
            .native_change
            .as_ref()
            .map_or(0.0, |change| change.change_balance);
        let trade = is_trade(
            increase.is_some(),
            decrease.is_some(),
            native_change,
            trade_threshold_sol,
        );

        Self {
            native: context.native_change.clone(),
            increase,
            decrease,
            overflow,
            trade,
        }
    }
}

/// Pick the largest increase and the largest decrease; everything else overflows.
fn split_token_changes(
    changes: &[TokenBalanceChange],
) -> (
    Option<TokenBalanceChange>,
    Option<TokenBalanceChange>,
    Option<Vec<TokenBalanceChange>>,
) {
    let mut increase: Option<usize> = None;
    let mut decrease: Option<usize> = None;
    for (position, change) in changes.iter().enumerate() {
        if change.change_balance > 0.0
            && increase.map_or(true, |best| change.change_balance > changes[best].change_balance)
        {
            increase = Some(position);
        }
        if change.change_balance < 0.0
            && decrease.map_or(true, |best| change.change_balance < changes[best].change_balance)
        {
            decrease = Some(position);
        }
    }

    let overflow: Vec<TokenBalanceChange> = changes
        .iter()
        .enumerate()
        .filter(|(position, _)| Some(*position) != increase && Some(*position) != decrease)
        .map(|(_, change)| change.clone())
        .collect();

    (
        increase.map(|position| changes[position].clone()),
        decrease.map(|position| changes[position].clone()),
        (!overflow.is_empty()).then_some(overflow),
    )
}

/// Best-effort trade classifier.
///
/// A swap shows up as tokens moving both ways for the owner, or tokens moving
/// one way while at least `threshold` SOL moves. Fees, rent and wrapped SOL
/// make this a heuristic only.
pub fn is_trade(has_increase: bool, has_decrease: bool, native_change: f64, threshold: f64) -> bool {
    match (has_increase, has_decrease) {
        (true, true) => true,
        (true, false) | (false, true) => native_change.abs() >= threshold,
        (false, false) => false,
    }
}

/// Build one output record from the transaction context, the owner summary and
/// the projected instruction fields.
pub fn assemble(
    context: &TransactionContext,
    summary: &OwnerSummary,
    program: ProgramKind,
    instruction: String,
    fields: InstructionFields,
) -> NormalizedRecord {
    let native = summary.native.as_ref();
    let inc = summary.increase.as_ref();
    let dec = summary.decrease.as_ref();

    NormalizedRecord {
        program: program.tag().to_string(),
        instruction,
        signature: context.signature.clone(),
        err: context.err.clone(),
        slot: context.slot,
        blocktime: context.block_time,
        fee: context.fee,
        auth1: fields.auth1,
        auth2: fields.auth2,
        auth3: fields.auth3,
        source: fields.source,
        destination: fields.destination,
        misc1: fields.misc1,
        misc2: fields.misc2,
        misc3: fields.misc3,
        misc4: fields.misc4,
        amount: fields.amount,
        ui_amount: fields.ui_amount,
        signers: context.signers.clone(),
        owner: native.map(|change| change.owner.clone()),
        pre_balance_sol: native.map(|change| change.pre_balance),
        post_balance_sol: native.map(|change| change.post_balance),
        change_balance_sol: native.map(|change| change.change_balance),
        account_index_inc: inc.map(|change| change.account_index),
        account_inc: inc.map(|change| change.account.clone()),
        mint_inc: inc.map(|change| change.mint.clone()),
        pre_balance_inc: inc.map(|change| change.pre_balance),
        post_balance_inc: inc.map(|change| change.post_balance),
        change_balance_inc: inc.map(|change| change.change_balance),
        account_index_dec: dec.map(|change| change.account_index),
        account_dec: dec.map(|change| change.account.clone()),
        mint_dec: dec.map(|change| change.mint.clone()),
        pre_balance_dec: dec.map(|change| change.pre_balance),
        post_balance_dec: dec.map(|change| change.post_balance),
        change_balance_dec: dec.map(|change| change.change_balance),
        owner_token_balance_changes_overflow: summary.overflow.clone(),
        trade: u8::from(summary.trade),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::MiscValue;

    fn change(account_index: usize, change_balance: f64) -> TokenBalanceChange {
        TokenBalanceChange {
            account_index,
            account: format!("acct{account_index}"),
            mint: "mint".to_string(),
            pre_balance: 10.0,
            post_balance: 10.0 + change_balance,
            change_balance,
        }
    }

    fn context(token_changes: Vec<TokenBalanceChange>, sol: f64) -> TransactionContext {
        TransactionContext {
            signature: "sig".to_string(),
            slot: 7,
            owner: "A".to_string(),
            native_change: Some(NativeBalanceChange {
                owner: "A".to_string(),
                pre_balance: 5.0,
                post_balance: 5.0 + sol,
                change_balance: sol,
            }),
            token_changes,
            ..TransactionContext::default()
        }
    }

    #[test]
    fn largest_moves_win_and_rest_overflow() {
        let ctx = context(vec![change(1, 2.0), change(2, 5.0), change(3, -1.0)], 0.0);
        let summary = OwnerSummary::new(&ctx, 0.005);
        assert_eq!(summary.increase.as_ref().map(|c| c.account_index), Some(2));
        assert_eq!(summary.decrease.as_ref().map(|c| c.account_index), Some(3));
        let overflow = summary.overflow.as_ref().unwrap();
        assert_eq!(overflow.len(), 1);
        assert_eq!(overflow[0].account_index, 1);
        assert!(summary.trade);
    }

    #[test]
    fn one_sided_move_needs_sol() {
        let below = context(vec![change(1, 3.0)], -0.001);
        assert!(!OwnerSummary::new(&below, 0.005).trade);

        let above = context(vec![change(1, 3.0)], -0.5);
        let summary = OwnerSummary::new(&above, 0.005);
        assert!(summary.trade);
        assert_eq!(summary.overflow, None);

        assert!(!is_trade(false, false, 10.0, 0.005));
    }

    #[test]
    fn record_merges_context_fields_and_deltas() {
        let ctx = context(vec![change(4, -2.0)], 1.5);
        let summary = OwnerSummary::new(&ctx, 0.005);
        let fields = InstructionFields {
            source: Some("A".to_string()),
            misc4: Some(MiscValue::Text("program".to_string())),
            ..InstructionFields::default()
        };
        let record = assemble(
            &ctx,
            &summary,
            ProgramKind::System,
            "Transfer".to_string(),
            fields,
        );
        assert_eq!(record.program, "system");
        assert_eq!(record.slot, 7);
        assert_eq!(record.owner.as_deref(), Some("A"));
        assert_eq!(record.change_balance_sol, Some(1.5));
        assert_eq!(record.account_index_dec, Some(4));
        assert_eq!(record.account_inc, None);
        assert_eq!(record.source.as_deref(), Some("A"));
        assert_eq!(record.trade, 1);
    }
}
