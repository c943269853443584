//! Deterministic [`OrderFactory`] for tests.
//!
//! Orders get an increasing salt and a keccak-256 hash over their fields.
//! The signature is a placeholder derived from the hash; nothing verifies it.

use std::sync::atomic::{AtomicU64, Ordering};

use alloy_primitives::{keccak256, B256};
use async_trait::async_trait;
use parking_lot::Mutex;

use crate::domain::{EcSignature, OrderParams, SignedOrder};
use crate::error::{Error, Result};
use crate::port::OrderFactory;

/// Expiration used when the request leaves it open (2050-01-01T00:00:00Z).
pub const DEFAULT_EXPIRATION_SEC: u64 = 2_524_608_000;

pub struct StubOrderFactory {
    next_salt: AtomicU64,
    requests: Mutex<Vec<OrderParams>>,
    failure: Mutex<Option<String>>,
}

impl StubOrderFactory {
    pub fn new() -> Self {
        Self {
            next_salt: AtomicU64::new(1),
            requests: Mutex::new(Vec::new()),
            failure: Mutex::new(None),
        }
    }

    /// Make every subsequent signing request fail.
    pub fn fail_with(&self, reason: impl Into<String>) {
        *self.failure.lock() = Some(reason.into());
    }

    /// Parameters of every signing request, in order.
    #[must_use]
    pub fn requests(&self) -> Vec<OrderParams> {
        self.requests.lock().clone()
    }

    /// Hash the order fields together with the salt and expiration.
    #[must_use]
    pub fn order_hash(params: &OrderParams, expiration: u64, salt: u64) -> B256 {
        let preimage = format!(
            "{}|{}|{}|{}|{}|{}|{}|{}|{}|{}|{}|{}",
            params.exchange_contract_address,
            params.maker,
            params.taker,
            params.maker_token_address,
            params.taker_token_address,
            params.fee_recipient,
            params.maker_token_amount,
            params.taker_token_amount,
            params.maker_fee,
            params.taker_fee,
            expiration,
            salt,
        );
        keccak256(preimage.as_bytes())
    }
}

impl Default for StubOrderFactory {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl OrderFactory for StubOrderFactory {
    async fn sign_order(&self, params: &OrderParams) -> Result<SignedOrder> {
        self.requests.lock().push(params.clone());
        if let Some(reason) = self.failure.lock().clone() {
            return Err(Error::Signing(reason));
        }

        let salt = self.next_salt.fetch_add(1, Ordering::SeqCst);
        let expiration = params
            .expiration_unix_timestamp_sec
            .unwrap_or(DEFAULT_EXPIRATION_SEC);
        let order_hash = Self::order_hash(params, expiration, salt);
        let ec_signature = EcSignature {
            v: 27,
            r: order_hash,
            s: keccak256(order_hash),
        };

        Ok(SignedOrder::from_params(
            params,
            expiration,
            salt,
            order_hash,
            ec_signature,
        ))
    }
}
