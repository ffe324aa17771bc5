//! Settlement ledger — the fungible settlement token.
//!
//! [`SettlementLedger`] is the narrow interface the escrow engine consumes.
//! [`InMemorySettlementLedger`] is a reference implementation with
//! allowance-based pulls. All mutations are atomic: either the full
//! operation succeeds or the balances are unchanged.

use std::collections::HashMap;

use turbomint_types::{AccountId, Amount, Result, TurbomintError};

use crate::transactional::{Transactional, UndoJournal};

/// Fungible settlement-token balances and allowances.
pub trait SettlementLedger {
    /// Handle of this token.
    fn address(&self) -> AccountId;

    /// Balance held by `account`.
    fn balance_of(&self, account: AccountId) -> Amount;

    /// How much `spender` may pull from `owner`.
    fn allowance(&self, owner: AccountId, spender: AccountId) -> Amount;

    /// Move `amount` from `from` to `to`, authorized by `from` itself.
    ///
    /// # Errors
    /// `InsufficientBalance` if `from` holds less than `amount`.
    fn transfer(&mut self, from: AccountId, to: AccountId, amount: Amount) -> Result<()>;

    /// Move `amount` from `from` to `to` on behalf of `spender`, consuming
    /// allowance.
    ///
    /// # Errors
    /// `InsufficientAllowance` if `spender` is not approved for `amount`,
    /// `InsufficientBalance` if `from` holds less than `amount`.
    fn transfer_from(
        &mut self,
        spender: AccountId,
        from: AccountId,
        to: AccountId,
        amount: Amount,
    ) -> Result<()>;
}

/// In-memory settlement token.
#[derive(Debug, Clone)]
pub struct InMemorySettlementLedger {
    address: AccountId,
    balances: HashMap<AccountId, Amount>,
    allowances: HashMap<(AccountId, AccountId), Amount>,
    total_supply: Amount,
    journal: UndoJournal<LedgerUndo>,
}

/// Value a ledger key held before a write. Zero means "no entry".
#[derive(Debug, Clone, Copy)]
enum LedgerUndo {
    Balance(AccountId, Amount),
    Allowance(AccountId, AccountId, Amount),
    TotalSupply(Amount),
}

impl InMemorySettlementLedger {
    /// Create an empty ledger living at `address`.
    #[must_use]
    pub fn new(address: AccountId) -> Self {
        Self {
            address,
            balances: HashMap::new(),
            allowances: HashMap::new(),
            total_supply: 0,
            journal: UndoJournal::new(),
        }
    }

    /// Create new tokens for `to`.
    ///
    /// # Errors
    /// `BalanceOverflow` if the total supply would overflow.
    pub fn mint(&mut self, to: AccountId, amount: Amount) -> Result<()> {
        let supply = self
            .total_supply
            .checked_add(amount)
            .ok_or(TurbomintError::BalanceOverflow)?;
        // Balance <= supply, so this add cannot overflow once supply didn't.
        let balance = self.balance_of(to) + amount;
        self.set_balance(to, balance);
        self.set_total_supply(supply);
        Ok(())
    }

    /// Destroy `account`'s whole balance. Returns the amount burned.
    pub fn burn_all(&mut self, account: AccountId) -> Amount {
        let burned = self.balance_of(account);
        self.set_balance(account, 0);
        self.set_total_supply(self.total_supply - burned);
        burned
    }

    /// Set how much `spender` may pull from `owner`. Overwrites any prior
    /// allowance.
    pub fn approve(&mut self, owner: AccountId, spender: AccountId, amount: Amount) {
        self.set_allowance(owner, spender, amount);
    }

    /// Sum of all balances.
    #[must_use]
    pub fn total_supply(&self) -> Amount {
        self.total_supply
    }

    fn debit(&mut self, from: AccountId, amount: Amount) -> Result<()> {
        let available = self.balance_of(from);
        if available < amount {
            return Err(TurbomintError::InsufficientBalance {
                needed: amount,
                available,
            });
        }
        self.set_balance(from, available - amount);
        Ok(())
    }

    fn credit(&mut self, to: AccountId, amount: Amount) {
        if amount > 0 {
            let balance = self.balance_of(to) + amount;
            self.set_balance(to, balance);
        }
    }

    // -- journaled writes ---------------------------------------------------

    fn set_balance(&mut self, account: AccountId, amount: Amount) {
        let prior = if amount == 0 {
            self.balances.remove(&account)
        } else {
            self.balances.insert(account, amount)
        };
        self.journal
            .record(LedgerUndo::Balance(account, prior.unwrap_or_default()));
    }

    fn set_allowance(&mut self, owner: AccountId, spender: AccountId, amount: Amount) {
        let prior = if amount == 0 {
            self.allowances.remove(&(owner, spender))
        } else {
            self.allowances.insert((owner, spender), amount)
        };
        self.journal.record(LedgerUndo::Allowance(
            owner,
            spender,
            prior.unwrap_or_default(),
        ));
    }

    fn set_total_supply(&mut self, supply: Amount) {
        self.journal.record(LedgerUndo::TotalSupply(self.total_supply));
        self.total_supply = supply;
    }
}

impl SettlementLedger for InMemorySettlementLedger {
    fn address(&self) -> AccountId {
        self.address
    }

    fn balance_of(&self, account: AccountId) -> Amount {
        self.balances.get(&account).copied().unwrap_or_default()
    }

    fn allowance(&self, owner: AccountId, spender: AccountId) -> Amount {
        self.allowances
            .get(&(owner, spender))
            .copied()
            .unwrap_or_default()
    }

    fn transfer(&mut self, from: AccountId, to: AccountId, amount: Amount) -> Result<()> {
        self.debit(from, amount)?;
        self.credit(to, amount);
        Ok(())
    }

    fn transfer_from(
        &mut self,
        spender: AccountId,
        from: AccountId,
        to: AccountId,
        amount: Amount,
    ) -> Result<()> {
        let allowed = self.allowance(from, spender);
        if allowed < amount {
            return Err(TurbomintError::InsufficientAllowance {
                needed: amount,
                allowed,
            });
        }
        // Debit first: on failure the allowance is untouched.
        self.debit(from, amount)?;
        self.credit(to, amount);
        self.approve(from, spender, allowed - amount);
        Ok(())
    }
}

impl Transactional for InMemorySettlementLedger {
    fn begin(&mut self) {
        self.journal.begin();
    }

    fn commit(&mut self) {
        self.journal.commit();
    }

    fn rollback(&mut self) {
        // The journal is closed by `unwind`, so the restoring writes below
        // are not themselves recorded.
        for entry in self.journal.unwind() {
            match entry {
                LedgerUndo::Balance(account, amount) => self.set_balance(account, amount),
                LedgerUndo::Allowance(owner, spender, amount) => {
                    self.set_allowance(owner, spender, amount);
                }
                LedgerUndo::TotalSupply(supply) => self.total_supply = supply,
            }
        }
    }
}
