//! Exchange-agnostic domain types.

pub mod error;
mod id;
mod money;
mod order;
mod token;

pub use id::{Address, TxHash};
pub use money::{Amount, BASE_ASSET_DECIMALS};
pub use order::{EcSignature, OrderParams, SignedOrder};
pub use token::Token;
