//! Identifiers used throughout Turbomint.
//!
//! Accounts and TDTs are opaque byte handles: an [`AccountId`] is a 20-byte
//! address, a [`TdtId`] is the 32-byte handle of the deposit the token
//! represents. Neither is assumed to be ordered or dense; they are only ever
//! used as hash keys. Engine operations are tagged with a UUIDv7 [`TxId`].

use std::fmt;

use serde::{Deserialize, Serialize};
use uuid::Uuid;

// ---------------------------------------------------------------------------
// AccountId
// ---------------------------------------------------------------------------

/// An address-like account handle (20 bytes).
///
/// Used for requesters, fillers, the engine's own custody account, and the
/// handles of the collaborator token services.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct AccountId(pub [u8; 20]);

impl AccountId {
    /// The all-zero address. Never a valid owner or service handle.
    pub const ZERO: Self = Self([0u8; 20]);

    #[must_use]
    pub fn as_bytes(&self) -> &[u8; 20] {
        &self.0
    }

    #[must_use]
    pub fn is_zero(&self) -> bool {
        self.0 == [0u8; 20]
    }

    /// Parse a `0x`-prefixed (or bare) 40-character hex string.
    pub fn from_hex(s: &str) -> crate::Result<Self> {
        let raw = s.strip_prefix("0x").unwrap_or(s);
        let bytes = hex::decode(raw)
            .map_err(|e| crate::TurbomintError::Serialization(format!("bad account hex: {e}")))?;
        let arr: [u8; 20] = bytes.try_into().map_err(|_| {
            crate::TurbomintError::Serialization("account id must be 20 bytes".to_string())
        })?;
        Ok(Self(arr))
    }

    /// Short form for log lines (first 4 bytes).
    #[must_use]
    pub fn short(&self) -> String {
        format!("0x{}", hex::encode(&self.0[..4]))
    }
}

impl fmt::Display for AccountId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "0x{}", hex::encode(self.0))
    }
}

// ---------------------------------------------------------------------------
// TdtId
// ---------------------------------------------------------------------------

/// Identifier of a deposit-receipt token.
///
/// The id is the handle of the deposit record it represents: a deposit
/// address left-padded to 32 bytes, read as a big-endian word.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct TdtId(pub [u8; 32]);

impl TdtId {
    /// The TDT id of the deposit living at `deposit`.
    #[must_use]
    pub fn from_deposit(deposit: AccountId) -> Self {
        let mut bytes = [0u8; 32];
        bytes[12..].copy_from_slice(deposit.as_bytes());
        Self(bytes)
    }

    /// A TDT id from a small integer, big-endian in the low bytes.
    #[must_use]
    pub fn from_u64(n: u64) -> Self {
        let mut bytes = [0u8; 32];
        bytes[24..].copy_from_slice(&n.to_be_bytes());
        Self(bytes)
    }

    #[must_use]
    pub fn as_bytes(&self) -> &[u8; 32] {
        &self.0
    }

    #[must_use]
    pub fn short(&self) -> String {
        format!("0x{}", hex::encode(&self.0[28..]))
    }
}

impl fmt::Display for TdtId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "0x{}", hex::encode(self.0))
    }
}

// ---------------------------------------------------------------------------
// TxId
// ---------------------------------------------------------------------------

/// Identifier of one engine operation. UUIDv7, so ids sort by issue time.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Ord, PartialOrd, Serialize, Deserialize)]
pub struct TxId(pub Uuid);

impl TxId {
    #[must_use]
    pub fn new() -> Self {
        Self(Uuid::now_v7())
    }
}

impl Default for TxId {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Display for TxId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "tx:{}", self.0)
    }
}

/// Random identifiers for tests. **Never use in production.**
#[cfg(any(test, feature = "test-helpers"))]
impl AccountId {
    #[must_use]
    pub fn random() -> Self {
        Self(rand::random::<[u8; 20]>())
    }
}

#[cfg(any(test, feature = "test-helpers"))]
impl TdtId {
    #[must_use]
    pub fn random() -> Self {
        Self::from_deposit(AccountId::random())
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
