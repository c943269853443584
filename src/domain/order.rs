//! Order request and signed order types.

use alloy_primitives::B256;
use serde::{Deserialize, Serialize};

use super::id::Address;
use super::money::Amount;

/// Everything the order factory needs to produce a [`SignedOrder`].
///
/// `expiration_unix_timestamp_sec` stays `None` when the caller did not pick
/// one; the factory decides what "no expiration" means.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct OrderParams {
    pub maker: Address,
    pub taker: Address,
    pub maker_fee: Amount,
    pub taker_fee: Amount,
    pub maker_token_amount: Amount,
    pub maker_token_address: Address,
    pub taker_token_amount: Amount,
    pub taker_token_address: Address,
    pub exchange_contract_address: Address,
    pub fee_recipient: Address,
    pub expiration_unix_timestamp_sec: Option<u64>,
}

/// ECDSA signature components.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct EcSignature {
    pub v: u8,
    pub r: B256,
    pub s: B256,
}

/// A signed order ready to be filled.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SignedOrder {
    pub maker: Address,
    pub taker: Address,
    pub maker_fee: Amount,
    pub taker_fee: Amount,
    pub maker_token_amount: Amount,
    pub maker_token_address: Address,
    pub taker_token_amount: Amount,
    pub taker_token_address: Address,
    pub exchange_contract_address: Address,
    pub fee_recipient: Address,
    pub expiration_unix_timestamp_sec: u64,
    pub salt: u64,
    pub order_hash: B256,
    pub ec_signature: EcSignature,
}

impl SignedOrder {
    /// Assemble a signed order from its request and the values the signer
    /// chose (expiration, salt, hash, signature).
    #[must_use]
    pub fn from_params(
        params: &OrderParams,
        expiration_unix_timestamp_sec: u64,
        salt: u64,
        order_hash: B256,
        ec_signature: EcSignature,
    ) -> Self {
        Self {
            maker: params.maker.clone(),
            taker: params.taker.clone(),
            maker_fee: params.maker_fee,
            taker_fee: params.taker_fee,
            maker_token_amount: params.maker_token_amount,
            maker_token_address: params.maker_token_address.clone(),
            taker_token_amount: params.taker_token_amount,
            taker_token_address: params.taker_token_address.clone(),
            exchange_contract_address: params.exchange_contract_address.clone(),
            fee_recipient: params.fee_recipient.clone(),
            expiration_unix_timestamp_sec,
            salt,
            order_hash,
            ec_signature,
        }
    }
}
