//! Receipts for successful escrow operations.
//!
//! Every operation that changes the order store returns a [`Receipt`]
//! describing what happened. The engine hands receipts back to the caller
//! and keeps no copy; hosts that want an audit trail persist them.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};

use crate::{constants, AccountId, Amount, TdtId, TxId};

/// The operation a receipt records.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ReceiptType {
    /// A TDT entered escrow and an order opened.
    OrderRequested,
    /// The requester took the TDT back.
    OrderCancelled,
    /// A filler paid the requester and took the TDT.
    OrderFilled,
}

impl ReceiptType {
    fn tag(self) -> u8 {
        match self {
            Self::OrderRequested => 1,
            Self::OrderCancelled => 2,
            Self::OrderFilled => 3,
        }
    }
}

impl std::fmt::Display for ReceiptType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::OrderRequested => write!(f, "ORDER_REQUESTED"),
            Self::OrderCancelled => write!(f, "ORDER_CANCELLED"),
            Self::OrderFilled => write!(f, "ORDER_FILLED"),
        }
    }
}

/// Record of one successful escrow operation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Receipt {
    pub receipt_type: ReceiptType,
    /// The operation that produced this receipt.
    pub tx_id: TxId,
    pub tdt_id: TdtId,
    pub requester: AccountId,
    /// The filler, for fills.
    pub counterparty: Option<AccountId>,
    /// Settlement tokens paid to the requester, for fills.
    pub amount: Option<Amount>,
    pub issued_at: DateTime<Utc>,
}

impl Receipt {
    #[must_use]
    pub fn requested(tx_id: TxId, tdt_id: TdtId, requester: AccountId) -> Self {
        Self::build(ReceiptType::OrderRequested, tx_id, tdt_id, requester, None, None)
    }

    #[must_use]
    pub fn cancelled(tx_id: TxId, tdt_id: TdtId, requester: AccountId) -> Self {
        Self::build(ReceiptType::OrderCancelled, tx_id, tdt_id, requester, None, None)
    }

    #[must_use]
    pub fn filled(
        tx_id: TxId,
        tdt_id: TdtId,
        requester: AccountId,
        filler: AccountId,
        amount: Amount,
    ) -> Self {
        Self::build(
            ReceiptType::OrderFilled,
            tx_id,
            tdt_id,
            requester,
            Some(filler),
            Some(amount),
        )
    }

    fn build(
        receipt_type: ReceiptType,
        tx_id: TxId,
        tdt_id: TdtId,
        requester: AccountId,
        counterparty: Option<AccountId>,
        amount: Option<Amount>,
    ) -> Self {
        Self {
            receipt_type,
            tx_id,
            tdt_id,
            requester,
            counterparty,
            amount,
            issued_at: Utc::now(),
        }
    }

    /// Canonical byte encoding hashed by [`Receipt::digest`].
    ///
    /// Format: `domain || type || tx_id || tdt_id || requester || counterparty? || amount? || issued_at_ms`
    #[must_use]
    pub fn canonical_bytes(&self) -> Vec<u8> {
        let mut out = Vec::with_capacity(160);
        out.extend_from_slice(constants::RECEIPT_DOMAIN);
        out.push(self.receipt_type.tag());
        out.extend_from_slice(self.tx_id.0.as_bytes());
        out.extend_from_slice(self.tdt_id.as_bytes());
        out.extend_from_slice(self.requester.as_bytes());
        match self.counterparty {
            Some(c) => {
                out.push(1);
                out.extend_from_slice(c.as_bytes());
            }
            None => out.push(0),
        }
        match self.amount {
            Some(a) => {
                out.push(1);
                out.extend_from_slice(&a.to_be_bytes());
            }
            None => out.push(0),
        }
        out.extend_from_slice(&self.issued_at.timestamp_millis().to_be_bytes());
        out
    }

    /// SHA-256 over the canonical encoding.
    #[must_use]
    pub fn digest(&self) -> [u8; 32] {
        Sha256::digest(self.canonical_bytes()).into()
    }

    #[must_use]
    pub fn digest_hex(&self) -> String {
        hex::encode(self.digest())
    }
}
