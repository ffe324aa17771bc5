//! Custody invariant checker.
//!
//! ```text
//! ∀ tdt_id: order open for tdt_id  ⇔  registry.owner_of(tdt_id) == engine
//! ```
//!
//! The engine maintains this by construction; the audit exists so hosts and
//! tests can verify it against the live registry.

use std::collections::HashSet;

use turbomint_ledgers::ReceiptRegistry;
use turbomint_types::{Result, TdtId, TurbomintError};

use crate::engine::EscrowEngine;

impl<R: ReceiptRegistry, L, P> EscrowEngine<R, L, P> {
    /// Check that the registry reports the engine as owner of every TDT
    /// with an open order.
    ///
    /// # Errors
    /// Returns [`TurbomintError::CustodyInvariantViolation`] naming the first
    /// order whose TDT the engine does not hold.
    pub fn audit_custody(&self) -> Result<()> {
        for order in self.orders.iter() {
            let owner = self.registry.owner_of(order.tdt_id).map_err(|e| {
                TurbomintError::CustodyInvariantViolation {
                    reason: format!("open order {} unreadable in registry: {e}", order.tdt_id),
                }
            })?;
            if owner != self.address {
                return Err(TurbomintError::CustodyInvariantViolation {
                    reason: format!(
                        "open order {} is held by {owner}, not the engine {}",
                        order.tdt_id, self.address
                    ),
                });
            }
        }
        Ok(())
    }

    /// Check the reverse direction: every TDT in `held` (what the registry
    /// says the engine owns) has an open order.
    ///
    /// # Errors
    /// Returns [`TurbomintError::CustodyInvariantViolation`] listing the
    /// TDTs held without an order.
    pub fn audit_holdings(&self, held: impl IntoIterator<Item = TdtId>) -> Result<()> {
        let orphaned: HashSet<TdtId> = held
            .into_iter()
            .filter(|id| !self.orders.is_open(*id))
            .collect();
        if orphaned.is_empty() {
            return Ok(());
        }
        let mut ids: Vec<String> = orphaned.iter().map(ToString::to_string).collect();
        ids.sort();
        Err(TurbomintError::CustodyInvariantViolation {
            reason: format!("engine holds TDTs without an open order: {}", ids.join(", ")),
        })
    }
}
