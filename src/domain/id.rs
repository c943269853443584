//! Identifier types with proper encapsulation.

use std::fmt;

use serde::{Deserialize, Serialize};

const NULL_ADDRESS: &str = "0x0000000000000000000000000000000000000000";

/// Account or contract address.
///
/// Treated as an opaque key: no checksum normalization, equality is exact
/// string equality.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Address(String);

impl Address {
    /// Create a new `Address` from a string.
    pub fn new(address: impl Into<String>) -> Self {
        Self(address.into())
    }

    /// The all-zero address, used as the fee recipient of fee-less orders.
    #[must_use]
    pub fn null() -> Self {
        Self::new(NULL_ADDRESS)
    }

    #[must_use]
    pub fn is_null(&self) -> bool {
        self.0 == NULL_ADDRESS
    }

    /// Get the address as a string slice.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for Address {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl From<String> for Address {
    fn from(s: String) -> Self {
        Self::new(s)
    }
}

impl From<&str> for Address {
    fn from(s: &str) -> Self {
        Self::new(s)
    }
}

/// Handle for a submitted transaction, awaited with
/// [`ExchangeClient::await_mined`](crate::port::ExchangeClient::await_mined).
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct TxHash(String);

impl TxHash {
    pub fn new(hash: impl Into<String>) -> Self {
        Self(hash.into())
    }

    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for TxHash {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl From<String> for TxHash {
    fn from(s: String) -> Self {
        Self::new(s)
    }
}
