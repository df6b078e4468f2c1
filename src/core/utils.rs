use solana_sdk::native_token::LAMPORTS_PER_SOL;

pub const SOL_DECIMALS: u8 = 9;

/// Scale a raw integer amount by `10^-decimals`.
pub fn convert_to_ui_amount(amount: impl Into<u128>, decimals: u8) -> f64 {
    let value: u128 = amount.into();
    if decimals == 0 {
        return value as f64;
    }

    // SPL mints stay within 0..=9, the table covers a little more
    const POW10: [f64; 20] = [
        1.0,
        10.0,
        100.0,
        1_000.0,
        10_000.0,
        100_000.0,
        1_000_000.0,
        10_000_000.0,
        100_000_000.0,
        1_000_000_000.0,
        10_000_000_000.0,
        100_000_000_000.0,
        1_000_000_000_000.0,
        10_000_000_000_000.0,
        100_000_000_000_000.0,
        1_000_000_000_000_000.0,
        10_000_000_000_000_000.0,
        100_000_000_000_000_000.0,
        1_000_000_000_000_000_000.0,
        10_000_000_000_000_000_000.0,
    ];

    let d = decimals as usize;
    let scale = if d < POW10.len() {
        POW10[d]
    } else {
        10f64.powi(decimals as i32)
    };

    (value as f64) / scale
}

/// Signed lamport quantity expressed in SOL.
#[inline]
pub fn lamports_to_sol(lamports: i128) -> f64 {
    lamports as f64 / LAMPORTS_PER_SOL as f64
}

/// Items that remember the instruction position they were produced for.
pub trait HasIdx {
    fn idx(&self) -> usize;
}

/// Restore instruction order after out-of-order completion.
pub fn sort_by_idx<T>(mut items: Vec<T>) -> Vec<T>
where
    T: HasIdx,
{
    items.sort_by_key(|item| item.idx());
    items
}
