//! Engine configuration.
//!
//! Fixed at construction. Loadable from JSON; `fee_divisor` falls back to
//! [`constants::DEFAULT_FEE_DIVISOR`] when omitted.

use serde::{Deserialize, Serialize};

use crate::{constants, AccountId, Result, TurbomintError};

/// Immutable configuration of one escrow engine.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EngineConfig {
    /// Handle of the settlement token ledger.
    pub settlement_token: AccountId,
    /// Handle of the fee-rebate token.
    pub rebate_token: AccountId,
    /// Handle of the deposit-receipt token registry.
    pub receipt_token: AccountId,
    /// Fill fee is `lot_size / fee_divisor`.
    #[serde(default = "default_fee_divisor")]
    pub fee_divisor: u64,
}

fn default_fee_divisor() -> u64 {
    constants::DEFAULT_FEE_DIVISOR
}

impl EngineConfig {
    /// Config with the default fee divisor.
    #[must_use]
    pub fn new(settlement_token: AccountId, rebate_token: AccountId, receipt_token: AccountId) -> Self {
        Self {
            settlement_token,
            rebate_token,
            receipt_token,
            fee_divisor: constants::DEFAULT_FEE_DIVISOR,
        }
    }

    #[must_use]
    pub fn with_fee_divisor(mut self, fee_divisor: u64) -> Self {
        self.fee_divisor = fee_divisor;
        self
    }

    /// Parse and validate a JSON config.
    pub fn from_json(json: &str) -> Result<Self> {
        let cfg: Self = serde_json::from_str(json)?;
        cfg.validate()?;
        Ok(cfg)
    }

    /// Reject a zero divisor, zero handles, and handles that collide.
    pub fn validate(&self) -> Result<()> {
        if self.fee_divisor == 0 {
            return Err(TurbomintError::Configuration(
                "fee_divisor must be positive".to_string(),
            ));
        }

        let handles = [
            ("settlement_token", self.settlement_token),
            ("rebate_token", self.rebate_token),
            ("receipt_token", self.receipt_token),
        ];
        for (name, handle) in handles {
            if handle.is_zero() {
                return Err(TurbomintError::Configuration(format!(
                    "{name} must not be the zero address"
                )));
            }
        }
        for (i, (a_name, a)) in handles.iter().enumerate() {
            for (b_name, b) in &handles[i + 1..] {
                if a == b {
                    return Err(TurbomintError::Configuration(format!(
                        "{a_name} and {b_name} share handle {a}"
                    )));
                }
            }
        }
        Ok(())
    }

    /// Fill fee as a percentage of the lot, for display.
    #[must_use]
    #[allow(clippy::cast_precision_loss)]
    pub fn fill_fee_percent(&self) -> f64 {
        if self.fee_divisor == 0 {
            return 0.0;
        }
        100.0 / self.fee_divisor as f64
    }
}
