//! Builders for domain primitives used across tests.

use crate::domain::{Address, Token};

/// Create an [`Address`] from a string.
pub fn addr(address: &str) -> Address {
    Address::from(address)
}

/// Create an 18-decimal [`Token`] whose address is derived from its symbol.
pub fn token(symbol: &str) -> Token {
    Token::new(format!("0x{}", symbol.to_lowercase()), symbol, 18)
}

/// Build a registry of tokens with the given symbols, in order.
pub fn registry(symbols: &[&str]) -> Vec<Token> {
    symbols.iter().map(|symbol| token(symbol)).collect()
}
