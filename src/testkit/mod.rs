//! Shared test utilities available to both unit and integration tests.
//!
//! Enabled via `#[cfg(test)]` (unit tests) or the `testkit` feature
//! (integration tests).
//!
//! # Modules
//!
//! - [`exchange`] - [`InMemoryExchange`](exchange::InMemoryExchange), a
//!   call-recording token ledger implementing
//!   [`ExchangeClient`](crate::port::ExchangeClient).
//! - [`factory`] - [`StubOrderFactory`](factory::StubOrderFactory), a
//!   deterministic order signer.
//! - [`domain`] - Builders for addresses, tokens, and registries.

pub mod domain;
pub mod exchange;
pub mod factory;
