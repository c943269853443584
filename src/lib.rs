//! Fill Scenarios - funded, approved, signed orders for exchange tests.
//!
//! Protocol tests need orders that can be filled immediately: the maker and
//! taker must already hold the traded tokens, the exchange must be allowed to
//! move them, and any fees must be funded in the protocol's fee token. This
//! crate does that setup and hands back a signed order.
//!
//! # Modules
//!
//! - [`config`] - Fixture configuration loaded from TOML
//! - [`domain`] - Addresses, amounts, tokens, and orders
//! - [`error`] - Error types for the crate
//! - [`port`] - [`ExchangeClient`](port::ExchangeClient) and
//!   [`OrderFactory`](port::OrderFactory) collaborator traits
//! - [`service`] - Token classification, provisioning, and order building
//! - [`testkit`] - In-memory collaborators (requires `testkit` feature)
//!
//! # Example
//!
//! ```
//! use std::sync::Arc;
//!
//! use fill_scenarios::domain::{Address, Amount};
//! use fill_scenarios::service::FillScenarios;
//! use fill_scenarios::testkit::exchange::InMemoryExchange;
//! use fill_scenarios::testkit::factory::StubOrderFactory;
//!
//! # tokio_test::block_on(async {
//! let coinbase = Address::from("0xcoinbase");
//! let (a, b) = (Address::from("0xa"), Address::from("0xb"));
//! let exchange = Arc::new(
//!     InMemoryExchange::new(Address::from("0xweth"))
//!         .with_balance(&a, &coinbase, Amount::from(1_000))
//!         .with_balance(&b, &coinbase, Amount::from(1_000)),
//! );
//! let scenarios = FillScenarios::new(
//!     exchange,
//!     Arc::new(StubOrderFactory::new()),
//!     vec![coinbase, Address::from("0xmaker"), Address::from("0xtaker")],
//!     Address::from("0xweth"),
//!     Address::from("0xexchange"),
//! )
//! .unwrap();
//!
//! let order = scenarios
//!     .fillable_order(&a, &b, &Address::from("0xmaker"), &Address::from("0xtaker"), Amount::from(100), None)
//!     .await
//!     .unwrap();
//! assert_eq!(order.maker_token_amount, Amount::from(100));
//! # });
//! ```

pub mod config;
pub mod domain;
pub mod error;
pub mod port;
pub mod service;

#[cfg(any(test, feature = "testkit"))]
pub mod testkit;
