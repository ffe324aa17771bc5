//! Receipt registry — ownership of deposit-receipt tokens.
//!
//! Each [`TdtId`] has exactly one owner. An owner can approve one account
//! per token, or approve an operator for all of its tokens. A transfer
//! clears the per-token approval.

use std::collections::{HashMap, HashSet};

use turbomint_types::{AccountId, Result, TdtId, TurbomintError};

use crate::transactional::{Transactional, UndoJournal};

/// Non-fungible ownership of TDTs.
pub trait ReceiptRegistry {
    /// Handle of this registry.
    fn address(&self) -> AccountId;

    /// Current owner of `tdt_id`.
    ///
    /// # Errors
    /// `NonexistentToken` if the token was never minted.
    fn owner_of(&self, tdt_id: TdtId) -> Result<AccountId>;

    /// Move `tdt_id` from `from` to `to` on behalf of `operator`.
    ///
    /// # Errors
    /// `NonexistentToken` for unknown ids, `TransferNotAuthorized` when
    /// `from` is not the owner or `operator` is neither owner nor approved.
    fn transfer_from(
        &mut self,
        operator: AccountId,
        from: AccountId,
        to: AccountId,
        tdt_id: TdtId,
    ) -> Result<()>;
}

/// In-memory receipt registry.
#[derive(Debug, Clone)]
pub struct InMemoryReceiptRegistry {
    address: AccountId,
    owners: HashMap<TdtId, AccountId>,
    token_approvals: HashMap<TdtId, AccountId>,
    operator_approvals: HashSet<(AccountId, AccountId)>,
    journal: UndoJournal<RegistryUndo>,
}

/// What a registry key held before a write.
#[derive(Debug, Clone, Copy)]
enum RegistryUndo {
    Owner(TdtId, Option<AccountId>),
    TokenApproval(TdtId, Option<AccountId>),
    Operator(AccountId, AccountId, bool),
}

impl InMemoryReceiptRegistry {
    #[must_use]
    pub fn new(address: AccountId) -> Self {
        Self {
            address,
            owners: HashMap::new(),
            token_approvals: HashMap::new(),
            operator_approvals: HashSet::new(),
            journal: UndoJournal::new(),
        }
    }

    /// Mint `tdt_id` to `to`.
    ///
    /// # Errors
    /// `TokenAlreadyMinted` if the id exists, `TransferNotAuthorized` when
    /// minting to the zero address.
    pub fn mint(&mut self, to: AccountId, tdt_id: TdtId) -> Result<()> {
        if to.is_zero() {
            return Err(TurbomintError::TransferNotAuthorized {
                tdt_id,
                operator: to,
            });
        }
        if self.owners.contains_key(&tdt_id) {
            return Err(TurbomintError::TokenAlreadyMinted(tdt_id));
        }
        self.set_owner(tdt_id, Some(to));
        Ok(())
    }

    /// Approve `approved` to transfer `tdt_id`. `caller` must be the owner or
    /// an operator approved by the owner.
    ///
    /// # Errors
    /// `NonexistentToken`, or `ApprovalNotAllowed` for any other caller.
    pub fn approve(&mut self, caller: AccountId, approved: AccountId, tdt_id: TdtId) -> Result<()> {
        let owner = self.owner_of(tdt_id)?;
        if caller != owner && !self.is_approved_for_all(owner, caller) {
            return Err(TurbomintError::ApprovalNotAllowed(tdt_id));
        }
        self.set_token_approval(tdt_id, Some(approved));
        Ok(())
    }

    /// Grant or revoke `operator` over all of `owner`'s tokens.
    pub fn set_approval_for_all(&mut self, owner: AccountId, operator: AccountId, approved: bool) {
        let prior = if approved {
            !self.operator_approvals.insert((owner, operator))
        } else {
            self.operator_approvals.remove(&(owner, operator))
        };
        self.journal
            .record(RegistryUndo::Operator(owner, operator, prior));
    }

    /// The account approved for `tdt_id`, if any.
    #[must_use]
    pub fn get_approved(&self, tdt_id: TdtId) -> Option<AccountId> {
        self.token_approvals.get(&tdt_id).copied()
    }

    #[must_use]
    pub fn is_approved_for_all(&self, owner: AccountId, operator: AccountId) -> bool {
        self.operator_approvals.contains(&(owner, operator))
    }

    /// All tokens currently held by `owner`.
    pub fn tokens_of(&self, owner: AccountId) -> impl Iterator<Item = TdtId> + '_ {
        self.owners
            .iter()
            .filter(move |(_, o)| **o == owner)
            .map(|(id, _)| *id)
    }

    fn is_approved_or_owner(&self, operator: AccountId, owner: AccountId, tdt_id: TdtId) -> bool {
        operator == owner
            || self.get_approved(tdt_id) == Some(operator)
            || self.is_approved_for_all(owner, operator)
    }

    // -- journaled writes ---------------------------------------------------

    fn set_owner(&mut self, tdt_id: TdtId, owner: Option<AccountId>) {
        let prior = match owner {
            Some(owner) => self.owners.insert(tdt_id, owner),
            None => self.owners.remove(&tdt_id),
        };
        self.journal.record(RegistryUndo::Owner(tdt_id, prior));
    }

    fn set_token_approval(&mut self, tdt_id: TdtId, approved: Option<AccountId>) {
        let prior = match approved {
            Some(approved) => self.token_approvals.insert(tdt_id, approved),
            None => self.token_approvals.remove(&tdt_id),
        };
        self.journal
            .record(RegistryUndo::TokenApproval(tdt_id, prior));
    }
}

impl ReceiptRegistry for InMemoryReceiptRegistry {
    fn address(&self) -> AccountId {
        self.address
    }

    fn owner_of(&self, tdt_id: TdtId) -> Result<AccountId> {
        self.owners
            .get(&tdt_id)
            .copied()
            .ok_or(TurbomintError::NonexistentToken(tdt_id))
    }

    fn transfer_from(
        &mut self,
        operator: AccountId,
        from: AccountId,
        to: AccountId,
        tdt_id: TdtId,
    ) -> Result<()> {
        let owner = self.owner_of(tdt_id)?;
        if owner != from || !self.is_approved_or_owner(operator, owner, tdt_id) || to.is_zero() {
            return Err(TurbomintError::TransferNotAuthorized { tdt_id, operator });
        }
        self.set_token_approval(tdt_id, None);
        self.set_owner(tdt_id, Some(to));
        tracing::trace!(tdt_id = %tdt_id.short(), from = %from.short(), to = %to.short(), "TDT transferred");
        Ok(())
    }
}

impl Transactional for InMemoryReceiptRegistry {
    fn begin(&mut self) {
        self.journal.begin();
    }

    fn commit(&mut self) {
        self.journal.commit();
    }

    fn rollback(&mut self) {
        for entry in self.journal.unwind() {
            match entry {
                RegistryUndo::Owner(tdt_id, owner) => self.set_owner(tdt_id, owner),
                RegistryUndo::TokenApproval(tdt_id, approved) => {
                    self.set_token_approval(tdt_id, approved);
                }
                RegistryUndo::Operator(owner, operator, approved) => {
                    self.set_approval_for_all(owner, operator, approved);
                }
            }
        }
    }
}
