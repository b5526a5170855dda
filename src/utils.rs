// Utility functions for the trading dashboard

use rust_decimal::{Decimal, RoundingStrategy};

/// Round a decimal to a specific number of decimal places, halves away from zero
pub fn round_decimal(value: Decimal, decimals: u32) -> Decimal {
    value
        .round_dp_with_strategy(decimals, RoundingStrategy::MidpointAwayFromZero)
        .normalize()
}

/// Format a decimal as a rupee amount with thousands separators, e.g. `₹1,234.50`
pub fn format_currency(value: Decimal) -> String {
    let rounded = round_decimal(value, 2);
    let sign = if rounded.is_sign_negative() && !rounded.is_zero() { "-" } else { "" };
    let text = format!("{:.2}", rounded.abs());
    let (whole, fraction) = text.split_once('.').unwrap_or((text.as_str(), "00"));

    let mut grouped = String::with_capacity(whole.len() + whole.len() / 3);
    for (i, ch) in whole.chars().enumerate() {
        if i > 0 && (whole.len() - i) % 3 == 0 {
            grouped.push(',');
        }
        grouped.push(ch);
    }

    format!("{}₹{}.{}", sign, grouped, fraction)
}

/// Symbol hash that is stable across runs, for deterministic demo data.
pub fn stable_hash(symbol: &str) -> u64 {
    // FNV-1a
    symbol.bytes().fold(0xcbf2_9ce4_8422_2325_u64, |hash, byte| {
        (hash ^ u64::from(byte)).wrapping_mul(0x0100_0000_01b3)
    })
}
