//! # turbomint-escrow
//!
//! **Escrow engine**: instant settlement-token liquidity for deposit-receipt
//! tokens (TDTs).
//!
//! ## Flow
//!
//! ```text
//! requester ── request ──▶ engine holds TDT, order open
//!                              │
//!            ┌── cancel ───────┤ (requester only) TDT back to requester
//!            │                 │
//!            └── provide ──────┘ (any filler) filler pays amount_due to
//!                                requester, filler receives TDT
//! ```
//!
//! ## Pricing
//!
//! `amount_due = lot_size - signer_fee - lot_size / fee_divisor`, read from
//! the deposit parameter source at fill time.
//!
//! Every transition is atomic: a failure anywhere rolls back the order
//! store, the receipt registry, and the settlement ledger together.
//!
//! The engine's custody account never acts as a caller: transitions and the
//! in-memory pass-throughs reject it with `EngineAsCaller`.

mod audit;
mod custody;
pub mod engine;
mod host;
pub mod order_store;
pub mod pricing;

pub use engine::EscrowEngine;
pub use order_store::OrderStore;
pub use pricing::Quote;
