//! Settlement-token amounts.
//!
//! Amounts are unsigned integers in the token's base unit (18 decimals).
//! All engine arithmetic stays in base units; [`to_tbtc`] exists only to
//! render an amount for humans.

use rust_decimal::Decimal;

use crate::constants::TBTC_DECIMALS;

/// Settlement-token amount in base units.
pub type Amount = u128;

/// One whole TBTC in base units.
pub const ONE_TBTC: Amount = 10u128.pow(TBTC_DECIMALS);

/// Render a base-unit amount as a whole-token decimal.
///
/// Returns `None` when the amount does not fit `Decimal`'s 96-bit mantissa.
#[must_use]
pub fn to_tbtc(amount: Amount) -> Option<Decimal> {
    let raw = i128::try_from(amount).ok()?;
    Decimal::try_from_i128_with_scale(raw, TBTC_DECIMALS)
        .ok()
        .map(|d| d.normalize())
}

/// Display helper for log fields: whole-token decimal, or raw base units
/// when the amount is too large to convert.
#[must_use]
pub fn display_tbtc(amount: Amount) -> String {
    match to_tbtc(amount) {
        Some(d) => format!("{d} TBTC"),
        None => format!("{amount} base units"),
    }
}
