//! Domain validation errors for core domain types.
//!
//! This module defines errors that occur when domain invariants are violated.
//! These errors are returned by `try_new` constructors and checked arithmetic.
//!
//! # Examples
//!
//! ```
//! use fill_scenarios::domain::error::DomainError;
//! use fill_scenarios::domain::Amount;
//! use rust_decimal_macros::dec;
//!
//! let result = Amount::try_new(dec!(-1));
//! assert!(matches!(result, Err(DomainError::NegativeAmount { .. })));
//! ```

use thiserror::Error;

/// Errors that occur when domain invariants are violated.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum DomainError {
    /// Token amounts are base-unit quantities and can never be negative.
    #[error("amount must be non-negative, got {amount}")]
    NegativeAmount {
        /// The invalid amount that was provided.
        amount: rust_decimal::Decimal,
    },

    /// Arithmetic exceeded the representable decimal range.
    #[error("amount overflow: {lhs} {op} {rhs}")]
    AmountOverflow {
        lhs: rust_decimal::Decimal,
        op: &'static str,
        rhs: rust_decimal::Decimal,
    },

    /// Subtraction would take an amount below zero.
    #[error("amount underflow: {lhs} - {rhs}")]
    AmountUnderflow {
        lhs: rust_decimal::Decimal,
        rhs: rust_decimal::Decimal,
    },

    /// Proportional scaling against a zero total.
    #[error("cannot scale against a zero total")]
    ZeroTotal,
}
