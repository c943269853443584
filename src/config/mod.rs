//! Fixture configuration loaded from TOML.
//!
//! ```toml
//! [fixture]
//! fee_token_symbol = "WETH"
//! exchange_address = "0x90fe2af704b34e0224bf2299c838e04d4dcf1364"
//! user_addresses = ["0x5409ed021d9299bf6814279a6a1411a7e866a631"]
//!
//! [[tokens]]
//! address = "0x1d7022f5b17d2f8b695918fb48fa1089c9f85401"
//! symbol = "WETH"
//! decimals = 18
//! ```

mod logging;

use std::path::Path;

use serde::Deserialize;

use crate::domain::{Address, Token};
use crate::error::{ConfigError, Result};

pub use logging::LoggingConfig;

/// Default symbol of the protocol's fee token.
pub const DEFAULT_FEE_TOKEN_SYMBOL: &str = "WETH";

#[derive(Debug, Clone, Deserialize)]
pub struct Config {
    pub fixture: FixtureConfig,
    #[serde(default)]
    pub logging: LoggingConfig,
    #[serde(default)]
    pub tokens: Vec<Token>,
}

/// Accounts and contracts the fixture operates on.
#[derive(Debug, Clone, Deserialize)]
pub struct FixtureConfig {
    #[serde(default = "default_fee_token_symbol")]
    pub fee_token_symbol: String,
    #[serde(default)]
    pub exchange_address: Option<Address>,
    /// Test accounts; the first one funds every transfer.
    #[serde(default)]
    pub user_addresses: Vec<Address>,
    /// Check the fee-token balance after each deposit.
    #[serde(default)]
    pub verify_deposits: bool,
}

fn default_fee_token_symbol() -> String {
    DEFAULT_FEE_TOKEN_SYMBOL.into()
}

impl Config {
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self> {
        let content = std::fs::read_to_string(path).map_err(ConfigError::ReadFile)?;
        Self::parse(&content)
    }

    pub fn parse(content: &str) -> Result<Self> {
        let config: Config = toml::from_str(content).map_err(ConfigError::Parse)?;
        config.validate()?;
        Ok(config)
    }

    fn validate(&self) -> Result<()> {
        if self.fixture.fee_token_symbol.trim().is_empty() {
            return Err(ConfigError::InvalidValue {
                field: "fee_token_symbol",
                reason: "cannot be empty".into(),
            }
            .into());
        }
        match &self.fixture.exchange_address {
            None => {
                return Err(ConfigError::MissingField {
                    field: "exchange_address",
                }
                .into())
            }
            Some(address) if address.as_str().trim().is_empty() => {
                return Err(ConfigError::InvalidValue {
                    field: "exchange_address",
                    reason: "cannot be empty".into(),
                }
                .into())
            }
            Some(_) => {}
        }
        if self.fixture.user_addresses.is_empty() {
            return Err(ConfigError::MissingField {
                field: "user_addresses",
            }
            .into());
        }
        Ok(())
    }

    /// The exchange contract address. Present after validation.
    pub fn exchange_address(&self) -> Result<&Address> {
        self.fixture.exchange_address.as_ref().ok_or_else(|| {
            ConfigError::MissingField {
                field: "exchange_address",
            }
            .into()
        })
    }
}
