//! Trait definitions (hexagonal ports). Depend only on domain.
//!
//! The fixture services drive two outbound collaborators:
//!
//! - [`ExchangeClient`] - token transfers, allowances, deposits, fills
//! - [`OrderFactory`] - order signing

mod exchange;
mod factory;

pub use exchange::ExchangeClient;
pub use factory::OrderFactory;
