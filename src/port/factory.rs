//! Order factory port.

use async_trait::async_trait;

use crate::domain::{OrderParams, SignedOrder};
use crate::error::Result;

/// Produces signed orders. Owns the signing scheme and any default
/// expiration policy.
#[async_trait]
pub trait OrderFactory: Send + Sync {
    async fn sign_order(&self, params: &OrderParams) -> Result<SignedOrder>;
}
