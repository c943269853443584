//! Fee-token vs. tradable-token classification.

use crate::domain::Token;
use crate::error::{Error, Result};

/// Splits a fixed token registry into the protocol fee token and the rest.
#[derive(Debug, Clone)]
pub struct TokenClassifier {
    tokens: Vec<Token>,
    fee_token_symbol: String,
}

impl TokenClassifier {
    pub fn new(tokens: Vec<Token>, fee_token_symbol: impl Into<String>) -> Self {
        Self {
            tokens,
            fee_token_symbol: fee_token_symbol.into(),
        }
    }

    #[must_use]
    pub fn fee_token_symbol(&self) -> &str {
        &self.fee_token_symbol
    }

    /// The token whose symbol is the configured fee-token symbol.
    ///
    /// # Errors
    ///
    /// Returns [`Error::TokenNotFound`] when the registry has no such token.
    pub fn fee_token_or_fail(&self) -> Result<&Token> {
        self.find_by_symbol(&self.fee_token_symbol)
            .ok_or_else(|| Error::TokenNotFound {
                symbol: self.fee_token_symbol.clone(),
            })
    }

    /// Every token except the fee token, in registry order.
    #[must_use]
    pub fn tradable_tokens(&self) -> Vec<Token> {
        self.tokens
            .iter()
            .filter(|token| token.symbol != self.fee_token_symbol)
            .cloned()
            .collect()
    }

    #[must_use]
    pub fn find_by_symbol(&self, symbol: &str) -> Option<&Token> {
        self.tokens.iter().find(|token| token.symbol == symbol)
    }
}
