use thiserror::Error;

use crate::domain::error::DomainError;
use crate::domain::{Address, Amount};

/// Configuration-related errors with structured variants.
#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("missing required field: {field}")]
    MissingField { field: &'static str },

    #[error("invalid value for {field}: {reason}")]
    InvalidValue { field: &'static str, reason: String },

    #[error("failed to read config file: {0}")]
    ReadFile(#[source] std::io::Error),

    #[error("failed to parse config: {0}")]
    Parse(#[source] toml::de::Error),
}

/// Errors surfaced by an exchange client implementation.
///
/// Fixture code never translates these; they reach the calling test as-is.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ExchangeError {
    #[error("insufficient balance of {token} for {owner}: have {available}, need {required}")]
    InsufficientBalance {
        token: Address,
        owner: Address,
        available: Amount,
        required: Amount,
    },

    #[error("insufficient allowance of {token} for {owner}: have {available}, need {required}")]
    InsufficientAllowance {
        token: Address,
        owner: Address,
        available: Amount,
        required: Amount,
    },

    #[error("fill of {requested} exceeds remaining {remaining}")]
    FillExceedsRemaining { requested: Amount, remaining: Amount },

    #[error("transaction reverted: {0}")]
    Reverted(String),

    #[error("unknown transaction: {0}")]
    UnknownTransaction(String),

    #[error("network error: {0}")]
    Network(String),

    #[error("{0}")]
    Other(String),
}

#[derive(Error, Debug)]
pub enum Error {
    #[error("token with symbol '{symbol}' not found in registry")]
    TokenNotFound { symbol: String },

    /// Fee-token balance after a deposit, in wei, fell short of the balance
    /// before it plus the deposited amount.
    #[error(
        "deposit shortfall for {account}: expected at least {expected} wei, balance is {actual} wei"
    )]
    DepositShortfall {
        account: Address,
        expected: Amount,
        actual: Amount,
    },

    #[error(transparent)]
    Config(#[from] ConfigError),

    #[error(transparent)]
    Domain(#[from] DomainError),

    #[error(transparent)]
    Exchange(#[from] ExchangeError),

    #[error("failed to sign order: {0}")]
    Signing(String),
}

pub type Result<T> = std::result::Result<T, Error>;
