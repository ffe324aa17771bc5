//! # turbomint-ledgers
//!
//! The external services the escrow engine talks to, as narrow traits, plus
//! in-memory reference implementations.
//!
//! ## Services
//!
//! 1. **ReceiptRegistry**: who owns each deposit-receipt token (TDT)
//! 2. **SettlementLedger**: fungible settlement-token balances and allowances
//! 3. **DepositParameterSource**: lot size and signer fee per TDT
//!
//! Mutable services also implement [`Transactional`] so the engine can
//! roll them back when an operation fails part-way.

pub mod deposits;
pub mod registry;
pub mod settlement;
pub mod transactional;

pub use deposits::{DepositParameterSource, DepositTerms, StaticDepositParameters};
pub use registry::{InMemoryReceiptRegistry, ReceiptRegistry};
pub use settlement::{InMemorySettlementLedger, SettlementLedger};
pub use transactional::{Transactional, UndoJournal};
