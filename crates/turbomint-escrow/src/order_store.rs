//! Order store — the set of open escrow orders.
//!
//! Keyed by [`TdtId`]; at most one order per id. Closing an order removes
//! it, so an id is open exactly while it has an entry. This is the only
//! state the engine persists between operations.
//!
//! Inside a transaction each open/close records the entry it replaced, so a
//! rollback restores exactly the orders the operation touched.

use std::collections::HashMap;

use turbomint_ledgers::{Transactional, UndoJournal};
use turbomint_types::{AccountId, EscrowOrder, Result, TdtId, TurbomintError};

/// Open orders keyed by TDT id.
#[derive(Debug, Clone, Default)]
pub struct OrderStore {
    orders: HashMap<TdtId, EscrowOrder>,
    journal: UndoJournal<(TdtId, Option<EscrowOrder>)>,
}

impl OrderStore {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Open an order for `tdt_id` on behalf of `requester`.
    ///
    /// # Errors
    /// Returns [`TurbomintError::OrderAlreadyOpen`] if `tdt_id` is already open.
    pub fn open(&mut self, tdt_id: TdtId, requester: AccountId) -> Result<EscrowOrder> {
        if self.orders.contains_key(&tdt_id) {
            return Err(TurbomintError::OrderAlreadyOpen(tdt_id));
        }
        let order = EscrowOrder::new(tdt_id, requester);
        self.orders.insert(tdt_id, order);
        self.journal.record((tdt_id, None));
        Ok(order)
    }

    /// Remove and return the open order for `tdt_id`.
    ///
    /// # Errors
    /// Returns [`TurbomintError::NoOpenOrder`] if nothing is open for `tdt_id`.
    pub fn close(&mut self, tdt_id: TdtId) -> Result<EscrowOrder> {
        let order = self
            .orders
            .remove(&tdt_id)
            .ok_or(TurbomintError::NoOpenOrder(tdt_id))?;
        self.journal.record((tdt_id, Some(order)));
        Ok(order)
    }

    /// The open order for `tdt_id`.
    ///
    /// # Errors
    /// Returns [`TurbomintError::NoOpenOrder`] if nothing is open for `tdt_id`.
    pub fn require(&self, tdt_id: TdtId) -> Result<EscrowOrder> {
        self.get(tdt_id).ok_or(TurbomintError::NoOpenOrder(tdt_id))
    }

    #[must_use]
    pub fn get(&self, tdt_id: TdtId) -> Option<EscrowOrder> {
        self.orders.get(&tdt_id).copied()
    }

    #[must_use]
    pub fn is_open(&self, tdt_id: TdtId) -> bool {
        self.orders.contains_key(&tdt_id)
    }

    /// All open orders, in no particular order.
    pub fn iter(&self) -> impl Iterator<Item = &EscrowOrder> {
        self.orders.values()
    }

    pub fn len(&self) -> usize {
        self.orders.len()
    }

    pub fn is_empty(&self) -> bool {
        self.orders.is_empty()
    }
}

impl Transactional for OrderStore {
    fn begin(&mut self) {
        self.journal.begin();
    }

    fn commit(&mut self) {
        self.journal.commit();
    }

    fn rollback(&mut self) {
        for (tdt_id, prior) in self.journal.unwind() {
            match prior {
                Some(order) => self.orders.insert(tdt_id, order),
                None => self.orders.remove(&tdt_id),
            };
        }
    }
}
