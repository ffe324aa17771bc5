//! Deposit parameter source.
//!
//! The TDT id doubles as the handle of the deposit it represents; the source
//! resolves that handle to the deposit's lot size and signer fee.

use std::collections::HashMap;

use turbomint_types::{constants, Amount, Result, TdtId, TurbomintError};

/// Read-only pricing inputs for a deposit.
pub trait DepositParameterSource {
    /// Size of the underlying deposit, in settlement-token base units.
    fn lot_size(&self, tdt_id: TdtId) -> Result<Amount>;

    /// Fee owed to the deposit's signers, in settlement-token base units.
    fn signer_fee(&self, tdt_id: TdtId) -> Result<Amount>;
}

/// Lot size and signer fee of one deposit.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DepositTerms {
    pub lot_size: Amount,
    pub signer_fee: Amount,
}

impl DepositTerms {
    #[must_use]
    pub fn new(lot_size: Amount, signer_fee: Amount) -> Self {
        Self {
            lot_size,
            signer_fee,
        }
    }

    /// Terms whose signer fee is `lot_size / divisor`. A zero divisor means
    /// no signer fee.
    #[must_use]
    pub fn with_signer_fee_divisor(lot_size: Amount, divisor: u64) -> Self {
        let signer_fee = lot_size
            .checked_div(Amount::from(divisor))
            .unwrap_or_default();
        Self::new(lot_size, signer_fee)
    }

    /// Terms with the standard signer fee.
    #[must_use]
    pub fn standard(lot_size: Amount) -> Self {
        Self::with_signer_fee_divisor(lot_size, constants::DEFAULT_SIGNER_FEE_DIVISOR)
    }
}

/// Fixed table of deposit terms.
#[derive(Debug, Clone, Default)]
pub struct StaticDepositParameters {
    deposits: HashMap<TdtId, DepositTerms>,
}

impl StaticDepositParameters {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Register or replace the terms for `tdt_id`.
    pub fn insert(&mut self, tdt_id: TdtId, terms: DepositTerms) {
        self.deposits.insert(tdt_id, terms);
    }

    #[must_use]
    pub fn get(&self, tdt_id: TdtId) -> Option<DepositTerms> {
        self.deposits.get(&tdt_id).copied()
    }

    fn terms(&self, tdt_id: TdtId) -> Result<DepositTerms> {
        self.get(tdt_id)
            .ok_or(TurbomintError::UnknownDeposit(tdt_id))
    }
}

impl DepositParameterSource for StaticDepositParameters {
    fn lot_size(&self, tdt_id: TdtId) -> Result<Amount> {
        Ok(self.terms(tdt_id)?.lot_size)
    }

    fn signer_fee(&self, tdt_id: TdtId) -> Result<Amount> {
        Ok(self.terms(tdt_id)?.signer_fee)
    }
}
