//! Outside-account calls on the in-memory services.
//!
//! Once an engine owns its registry and ledger, hosts still need to mint
//! TDTs, grant approvals, and fund fillers. These pass-throughs cover those
//! calls and refuse any that would have the engine's own custody account
//! act: an escrowed TDT or the engine's float can only move through
//! `request`, `cancel`, and `provide`.

use turbomint_ledgers::{InMemoryReceiptRegistry, InMemorySettlementLedger};
use turbomint_types::{AccountId, Amount, Result, TdtId};

use crate::engine::EscrowEngine;

impl<P> EscrowEngine<InMemoryReceiptRegistry, InMemorySettlementLedger, P> {
    /// Mint `tdt_id` to `to` on the receipt registry.
    ///
    /// # Errors
    /// `EngineAsCaller` if `to` is the engine; registry errors
    /// (`TokenAlreadyMinted`, `TransferNotAuthorized`) are passed through.
    pub fn mint_tdt(&mut self, to: AccountId, tdt_id: TdtId) -> Result<()> {
        self.ensure_outside_caller(to)?;
        self.registry.mint(to, tdt_id)?;
        tracing::debug!(tdt_id = %tdt_id.short(), to = %to.short(), "TDT minted");
        Ok(())
    }

    /// `caller` approves `approved` to move `tdt_id`.
    ///
    /// # Errors
    /// `EngineAsCaller` if `caller` is the engine; `NonexistentToken` or
    /// `ApprovalNotAllowed` from the registry.
    pub fn approve_tdt(
        &mut self,
        caller: AccountId,
        approved: AccountId,
        tdt_id: TdtId,
    ) -> Result<()> {
        self.ensure_outside_caller(caller)?;
        self.registry.approve(caller, approved, tdt_id)
    }

    /// `owner` grants or revokes `operator` over all of its TDTs.
    ///
    /// # Errors
    /// `EngineAsCaller` if `owner` is the engine.
    pub fn set_tdt_operator(
        &mut self,
        owner: AccountId,
        operator: AccountId,
        approved: bool,
    ) -> Result<()> {
        self.ensure_outside_caller(owner)?;
        self.registry.set_approval_for_all(owner, operator, approved);
        Ok(())
    }

    /// Mint `amount` settlement tokens to `to`.
    ///
    /// # Errors
    /// `EngineAsCaller` if `to` is the engine; `BalanceOverflow` from the
    /// ledger.
    pub fn mint_settlement(&mut self, to: AccountId, amount: Amount) -> Result<()> {
        self.ensure_outside_caller(to)?;
        self.ledger.mint(to, amount)
    }

    /// `owner` lets `spender` pull up to `amount` settlement tokens.
    ///
    /// # Errors
    /// `EngineAsCaller` if `owner` is the engine.
    pub fn approve_settlement(
        &mut self,
        owner: AccountId,
        spender: AccountId,
        amount: Amount,
    ) -> Result<()> {
        self.ensure_outside_caller(owner)?;
        self.ledger.approve(owner, spender, amount);
        Ok(())
    }

    /// Burn `account`'s whole settlement balance. Returns the amount burned.
    ///
    /// # Errors
    /// `EngineAsCaller` if `account` is the engine.
    pub fn burn_settlement(&mut self, account: AccountId) -> Result<Amount> {
        self.ensure_outside_caller(account)?;
        Ok(self.ledger.burn_all(account))
    }
}
