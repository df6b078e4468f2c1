use std::collections::BTreeMap;

use crate::core::utils::lamports_to_sol;
use crate::types::{NativeBalanceChange, TokenBalance, TokenBalanceChange};

/// Native balance change of `owner`, taken from the first account key equal to it.
pub fn native_balance_change(
    account_keys: &[String],
    pre_balances: &[u64],
    post_balances: &[u64],
    owner: &str,
) -> Option<NativeBalanceChange> {
    let index = account_keys.iter().position(|key| key == owner)?;
    let pre = *pre_balances.get(index)?;
    let post = *post_balances.get(index)?;
    Some(NativeBalanceChange {
        owner: owner.to_string(),
        pre_balance: lamports_to_sol(pre.into()),
        post_balance: lamports_to_sol(post.into()),
        change_balance: lamports_to_sol(post as i128 - pre as i128),
    })
}

#[derive(Default)]
struct PairedBalance<'a> {
    mint: &'a str,
    pre: Option<f64>,
    post: Option<f64>,
}

/// Token balance changes of accounts owned by `owner`, paired by account index.
///
/// Accounts opened during the transaction count from zero and accounts closed
/// during it count down to zero. Pairs that did not move are dropped. Output
/// is ordered by account index.
pub fn token_balance_changes(
    pre_token_balances: Option<&[TokenBalance]>,
    post_token_balances: Option<&[TokenBalance]>,
    owner: &str,
    account_keys: &[String],
) -> Vec<TokenBalanceChange> {
    let mut paired: BTreeMap<usize, PairedBalance<'_>> = BTreeMap::new();

    for balance in owned_by(pre_token_balances, owner) {
        let entry = paired.entry(balance.account_index).or_default();
        entry.mint = &balance.mint;
        entry.pre = Some(balance.ui_token_amount.ui_value());
    }
    for balance in owned_by(post_token_balances, owner) {
        let entry = paired.entry(balance.account_index).or_default();
        entry.mint = &balance.mint;
        entry.post = Some(balance.ui_token_amount.ui_value());
    }

    paired
        .into_iter()
        .filter_map(|(account_index, balance)| {
            let pre_balance = balance.pre.unwrap_or(0.0);
            let post_balance = balance.post.unwrap_or(0.0);
            let change_balance = post_balance - pre_balance;
            if change_balance == 0.0 {
                return None;
            }
            Some(TokenBalanceChange {
                account_index,
                account: account_keys
                    .get(account_index)
                    .cloned()
                    .unwrap_or_default(),
                mint: balance.mint.to_string(),
                pre_balance,
                post_balance,
                change_balance,
            })
        })
        .collect()
}

fn owned_by<'a>(
    balances: Option<&'a [TokenBalance]>,
    owner: &'a str,
) -> impl Iterator<Item = &'a TokenBalance> + 'a {
    balances
        .unwrap_or_default()
        .iter()
        .filter(move |balance| balance.owner.as_deref() == Some(owner))
}
