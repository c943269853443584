//! Token reference data.

use serde::{Deserialize, Serialize};

use super::id::Address;

/// A token contract known to the fixture.
///
/// Loaded once from configuration or supplied by the caller; never mutated.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Token {
    /// Contract address.
    pub address: Address,
    /// Ticker symbol, e.g. "WETH".
    pub symbol: String,
    /// Number of decimals in one whole unit.
    #[serde(default = "default_decimals")]
    pub decimals: u32,
    /// Optional display name.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
}

fn default_decimals() -> u32 {
    18
}

impl Token {
    pub fn new(address: impl Into<Address>, symbol: impl Into<String>, decimals: u32) -> Self {
        Self {
            address: address.into(),
            symbol: symbol.into(),
            decimals,
            name: None,
        }
    }

    #[must_use]
    pub fn with_name(mut self, name: impl Into<String>) -> Self {
        self.name = Some(name.into());
        self
    }
}
