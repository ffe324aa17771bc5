//! Fill pricing.
//!
//! ```text
//! fill_fee   = lot_size / fee_divisor          (truncating)
//! amount_due = lot_size - signer_fee - fill_fee
//! ```
//!
//! Unsigned arithmetic throughout. If the fees exceed the lot the quote
//! fails with [`TurbomintError::PricingUnderflow`] instead of wrapping.

use turbomint_ledgers::DepositParameterSource;
use turbomint_types::{Amount, Result, TdtId, TurbomintError};

/// Price breakdown for filling one TDT.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Quote {
    pub lot_size: Amount,
    pub signer_fee: Amount,
    /// The filler's incentive.
    pub fill_fee: Amount,
    /// What the filler pays the requester.
    pub amount_due: Amount,
}

/// Price a fill from raw deposit parameters.
///
/// # Errors
/// `Configuration` for a zero divisor, `PricingUnderflow` when
/// `signer_fee + fill_fee > lot_size`.
pub fn quote(lot_size: Amount, signer_fee: Amount, fee_divisor: u64) -> Result<Quote> {
    let fill_fee = lot_size
        .checked_div(Amount::from(fee_divisor))
        .ok_or_else(|| TurbomintError::Configuration("fee_divisor must be positive".to_string()))?;

    let amount_due = lot_size
        .checked_sub(signer_fee)
        .and_then(|rest| rest.checked_sub(fill_fee))
        .ok_or(TurbomintError::PricingUnderflow {
            lot_size,
            signer_fee,
            fill_fee,
        })?;

    Ok(Quote {
        lot_size,
        signer_fee,
        fill_fee,
        amount_due,
    })
}

/// Price a fill of `tdt_id` using `deposits` for the inputs.
pub fn quote_deposit<P: DepositParameterSource + ?Sized>(
    deposits: &P,
    tdt_id: TdtId,
    fee_divisor: u64,
) -> Result<Quote> {
    let lot_size = deposits.lot_size(tdt_id)?;
    let signer_fee = deposits.signer_fee(tdt_id)?;
    quote(lot_size, signer_fee, fee_divisor)
}
