//! Escrow order model.
//!
//! An order exists only while it is open. Cancelling or filling removes it,
//! so the order carries no status field: presence is the state.
//!
//! ```text
//!             request              cancel (requester only)
//!   NoOrder ───────────▶ Open ─────────────────────────▶ NoOrder
//!                          │
//!                          └──── provide (any filler) ──▶ NoOrder
//! ```

use serde::{Deserialize, Serialize};

use crate::{AccountId, TdtId};

/// An open escrow position: the engine holds `tdt_id` for `requester`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct EscrowOrder {
    /// The escrowed deposit-receipt token.
    pub tdt_id: TdtId,
    /// Who deposited the TDT and is paid on fill.
    pub requester: AccountId,
}

impl EscrowOrder {
    #[must_use]
    pub fn new(tdt_id: TdtId, requester: AccountId) -> Self {
        Self { tdt_id, requester }
    }

    /// Whether `account` may cancel this order.
    #[must_use]
    pub fn is_owned_by(&self, account: AccountId) -> bool {
        self.requester == account
    }
}
