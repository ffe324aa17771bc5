//! Error types for the Turbomint escrow.
//!
//! All errors use the `TM_ERR_` prefix convention for easy grepping in logs.
//! Error codes are grouped by subsystem:
//! - 1xx: Order errors
//! - 2xx: Pricing errors
//! - 3xx: Receipt registry errors
//! - 4xx: Settlement ledger errors
//! - 8xx: Safety errors
//! - 9xx: General / internal errors

use thiserror::Error;

use crate::{AccountId, Amount, TdtId};

/// Central error enum for all Turbomint operations.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum TurbomintError {
    // =================================================================
    // Order Errors (1xx)
    // =================================================================
    /// An order for this TDT is already open.
    #[error("TM_ERR_100: Order already open for TDT {0}")]
    OrderAlreadyOpen(TdtId),

    /// Cancel or provide on a TDT with no open order.
    #[error("TM_ERR_101: No open order for the given TDT id: {0}")]
    NoOpenOrder(TdtId),

    /// Cancel attempted by someone other than the requester.
    #[error("TM_ERR_102: Only the original TDT holder can cancel (requester {requester}, caller {caller})")]
    NotOrderOwner { requester: AccountId, caller: AccountId },

    /// The engine's own custody account cannot act as a requester, filler,
    /// or outside account.
    #[error("TM_ERR_103: Engine custody account {0} cannot act as a caller")]
    EngineAsCaller(AccountId),

    // =================================================================
    // Pricing Errors (2xx)
    // =================================================================
    /// Signer fee plus fill fee exceed the lot size.
    #[error(
        "TM_ERR_200: Pricing underflow: lot size {lot_size} < signer fee {signer_fee} + fill fee {fill_fee}"
    )]
    PricingUnderflow {
        lot_size: Amount,
        signer_fee: Amount,
        fill_fee: Amount,
    },

    /// The deposit parameter source has no record for this TDT.
    #[error("TM_ERR_201: Unknown deposit for TDT {0}")]
    UnknownDeposit(TdtId),

    // =================================================================
    // Receipt Registry Errors (3xx)
    // =================================================================
    /// The operator is neither the owner nor approved for this token.
    #[error("TM_ERR_300: transfer caller is not owner nor approved (TDT {tdt_id}, operator {operator})")]
    TransferNotAuthorized { tdt_id: TdtId, operator: AccountId },

    /// The token has never been minted.
    #[error("TM_ERR_301: Nonexistent token {0}")]
    NonexistentToken(TdtId),

    /// A token with this id already exists.
    #[error("TM_ERR_302: Token already minted {0}")]
    TokenAlreadyMinted(TdtId),

    /// Approve called by an account that does not own the token.
    #[error("TM_ERR_303: Approve caller is not owner nor approved for all (TDT {0})")]
    ApprovalNotAllowed(TdtId),

    // =================================================================
    // Settlement Ledger Errors (4xx)
    // =================================================================
    /// The spender's allowance does not cover the transfer.
    #[error("TM_ERR_400: transfer amount exceeds allowance: need {needed}, allowed {allowed}")]
    InsufficientAllowance { needed: Amount, allowed: Amount },

    /// The sender's balance does not cover the transfer.
    #[error("TM_ERR_401: transfer amount exceeds balance: need {needed}, have {available}")]
    InsufficientBalance { needed: Amount, available: Amount },

    /// Crediting would overflow a balance or the total supply.
    #[error("TM_ERR_402: Balance overflow")]
    BalanceOverflow,

    // =================================================================
    // Safety Errors (8xx)
    // =================================================================
    /// Open orders and registry ownership disagree.
    #[error("TM_ERR_800: Custody invariant violation: {reason}")]
    CustodyInvariantViolation { reason: String },

    // =================================================================
    // General / Internal (9xx)
    // =================================================================
    /// Configuration error (invalid config, mismatched collaborators, etc.).
    #[error("TM_ERR_900: Configuration error: {0}")]
    Configuration(String),

    /// Serialization / deserialization error.
    #[error("TM_ERR_901: Serialization error: {0}")]
    Serialization(String),

    /// Unrecoverable internal error.
    #[error("TM_ERR_902: Internal error: {0}")]
    Internal(String),
}

/// Coarse classification of a failure, for callers that only need to know
/// what kind of problem they hit.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ErrorCategory {
    /// There is nothing to act on (no open order).
    NothingToDo,
    /// The caller is not allowed to do this.
    NotPermitted,
    /// Insufficient funds or approval on the settlement ledger.
    Funds,
    /// The price cannot be computed.
    Pricing,
    /// Bad configuration or input encoding.
    Configuration,
    /// A broken internal invariant.
    Internal,
}

impl TurbomintError {
    #[must_use]
    pub fn category(&self) -> ErrorCategory {
        match self {
            Self::NoOpenOrder(_) => ErrorCategory::NothingToDo,
            Self::OrderAlreadyOpen(_)
            | Self::NotOrderOwner { .. }
            | Self::EngineAsCaller(_)
            | Self::TransferNotAuthorized { .. }
            | Self::ApprovalNotAllowed(_)
            | Self::NonexistentToken(_)
            | Self::TokenAlreadyMinted(_) => ErrorCategory::NotPermitted,
            Self::InsufficientAllowance { .. }
            | Self::InsufficientBalance { .. }
            | Self::BalanceOverflow => ErrorCategory::Funds,
            Self::PricingUnderflow { .. } | Self::UnknownDeposit(_) => ErrorCategory::Pricing,
            Self::Configuration(_) | Self::Serialization(_) => ErrorCategory::Configuration,
            Self::CustodyInvariantViolation { .. } | Self::Internal(_) => ErrorCategory::Internal,
        }
    }
}

/// Crate-wide `Result` alias.
pub type Result<T> = std::result::Result<T, TurbomintError>;

impl From<serde_json::Error> for TurbomintError {
    fn from(err: serde_json::Error) -> Self {
        Self::Serialization(err.to_string())
    }
}
