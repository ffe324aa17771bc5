//! Custody orchestration.
//!
//! Turns engine transitions into registry and ledger calls, and wraps each
//! transition in a single transaction boundary: begin on every mutable
//! collaborator plus the order store, run the steps, then commit all of them
//! or roll all of them back. No partial transfer survives a failed operation.

use turbomint_ledgers::{DepositParameterSource, ReceiptRegistry, SettlementLedger, Transactional};
use turbomint_types::{AccountId, Amount, Result, TdtId, TxId};

use crate::engine::EscrowEngine;

impl<R, L, P> EscrowEngine<R, L, P>
where
    R: ReceiptRegistry + Transactional,
    L: SettlementLedger + Transactional,
    P: DepositParameterSource,
{
    /// Run `steps` as one all-or-nothing operation.
    pub(crate) fn atomically<T>(
        &mut self,
        op: &'static str,
        tx_id: TxId,
        steps: impl FnOnce(&mut Self) -> Result<T>,
    ) -> Result<T> {
        self.registry.begin();
        self.ledger.begin();
        self.orders.begin();
        tracing::debug!(%tx_id, op, "transaction opened");

        match steps(self) {
            Ok(value) => {
                self.registry.commit();
                self.ledger.commit();
                self.orders.commit();
                Ok(value)
            }
            Err(err) => {
                self.registry.rollback();
                self.ledger.rollback();
                self.orders.rollback();
                tracing::warn!(%tx_id, op, error = %err, "escrow operation rolled back");
                Err(err)
            }
        }
    }

    /// Pull `tdt_id` from `from` into the engine's custody.
    pub(crate) fn take_custody(&mut self, from: AccountId, tdt_id: TdtId) -> Result<()> {
        self.registry
            .transfer_from(self.address, from, self.address, tdt_id)
    }

    /// Hand an escrowed `tdt_id` to `to`.
    pub(crate) fn release_custody(&mut self, to: AccountId, tdt_id: TdtId) -> Result<()> {
        self.registry
            .transfer_from(self.address, self.address, to, tdt_id)
    }

    /// Pull `amount` settlement tokens from the filler into the engine.
    pub(crate) fn collect_payment(&mut self, filler: AccountId, amount: Amount) -> Result<()> {
        self.ledger
            .transfer_from(self.address, filler, self.address, amount)
    }

    /// Forward `amount` settlement tokens from the engine to the requester.
    pub(crate) fn pay_out(&mut self, requester: AccountId, amount: Amount) -> Result<()> {
        self.ledger.transfer(self.address, requester, amount)
    }
}
