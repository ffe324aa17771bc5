//! # turbomint-types
//!
//! Shared types, errors, and configuration for the **Turbomint** escrow.
//!
//! This crate is the leaf dependency of the workspace — every other crate
//! depends on it. It defines:
//!
//! - **Identifiers**: [`AccountId`], [`TdtId`], [`TxId`]
//! - **Amounts**: [`Amount`] in settlement-token base units
//! - **Order model**: [`EscrowOrder`]
//! - **Receipts**: [`Receipt`], [`ReceiptType`]
//! - **Configuration**: [`EngineConfig`]
//! - **Errors**: [`TurbomintError`] with `TM_ERR_` prefix codes
//! - **Constants**: fee divisors, token decimals

pub mod amount;
pub mod config;
pub mod constants;
pub mod error;
pub mod ids;
pub mod order;
pub mod receipt;

pub use amount::*;
pub use config::*;
pub use error::*;
pub use ids::*;
pub use order::*;
pub use receipt::*;

// Constants are accessed via `turbomint_types::constants::FOO`
// (not re-exported to avoid name collisions).
