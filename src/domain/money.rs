//! Exact, non-negative token quantities.

use std::fmt;

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use super::error::DomainError;

/// Number of decimals in the base asset (wei per ether).
pub const BASE_ASSET_DECIMALS: u32 = 18;

/// Non-negative token quantity, usually expressed in base units.
///
/// Backed by [`Decimal`] so additions are exact; floating point never
/// touches token accounting.
#[derive(
    Debug, Clone, Copy, Default, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize,
)]
#[serde(try_from = "Decimal", into = "Decimal")]
pub struct Amount(Decimal);

impl Amount {
    pub const ZERO: Self = Self(Decimal::ZERO);

    /// Create an amount, rejecting negative values.
    pub fn try_new(value: Decimal) -> Result<Self, DomainError> {
        if value.is_sign_negative() && !value.is_zero() {
            return Err(DomainError::NegativeAmount { amount: value });
        }
        Ok(Self(value))
    }

    #[must_use]
    pub fn value(&self) -> Decimal {
        self.0
    }

    #[must_use]
    pub fn is_zero(&self) -> bool {
        self.0.is_zero()
    }

    pub fn checked_add(self, rhs: Self) -> Result<Self, DomainError> {
        self.0
            .checked_add(rhs.0)
            .map(Self)
            .ok_or(DomainError::AmountOverflow {
                lhs: self.0,
                op: "+",
                rhs: rhs.0,
            })
    }

    /// Subtract, refusing to go below zero.
    pub fn checked_sub(self, rhs: Self) -> Result<Self, DomainError> {
        if rhs.0 > self.0 {
            return Err(DomainError::AmountUnderflow {
                lhs: self.0,
                rhs: rhs.0,
            });
        }
        Ok(Self(self.0 - rhs.0))
    }

    /// Multiply by `10^decimals`, e.g. whole units to base units.
    pub fn scale_up(self, decimals: u32) -> Result<Self, DomainError> {
        let ten = Decimal::from(10u64);
        let mut factor = Decimal::ONE;
        for _ in 0..decimals {
            factor = factor
                .checked_mul(ten)
                .ok_or(DomainError::AmountOverflow {
                    lhs: factor,
                    op: "*",
                    rhs: ten,
                })?;
        }
        self.0
            .checked_mul(factor)
            .map(Self)
            .ok_or(DomainError::AmountOverflow {
                lhs: self.0,
                op: "*",
                rhs: factor,
            })
    }

    /// `self * part / total`, used to charge fees and counter-amounts
    /// in proportion to a partial fill.
    pub fn pro_rata(self, part: Self, total: Self) -> Result<Self, DomainError> {
        if total.is_zero() {
            return Err(DomainError::ZeroTotal);
        }
        let product = self
            .0
            .checked_mul(part.0)
            .ok_or(DomainError::AmountOverflow {
                lhs: self.0,
                op: "*",
                rhs: part.0,
            })?;
        Ok(Self(product / total.0))
    }
}

impl TryFrom<Decimal> for Amount {
    type Error = DomainError;

    fn try_from(value: Decimal) -> Result<Self, Self::Error> {
        Self::try_new(value)
    }
}

impl From<Amount> for Decimal {
    fn from(amount: Amount) -> Self {
        amount.0
    }
}

impl From<u64> for Amount {
    fn from(value: u64) -> Self {
        Self(Decimal::from(value))
    }
}

impl fmt::Display for Amount {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}
