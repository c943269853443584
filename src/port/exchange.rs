//! Exchange client port.
//!
//! Everything the fixture needs from the chain: token transfers, exchange
//! allowances, fee-token deposits, transaction confirmation, balances, and
//! order fills. Implementations own the wire protocol, signing keys, and any
//! timeout policy.

use async_trait::async_trait;

use crate::domain::{Address, Amount, SignedOrder, TxHash, BASE_ASSET_DECIMALS};
use crate::error::Result;

/// Client for the token and exchange contracts under test.
#[async_trait]
pub trait ExchangeClient: Send + Sync {
    /// Transfer `amount` of `token` from `from` to `to`.
    async fn transfer(
        &self,
        token: &Address,
        from: &Address,
        to: &Address,
        amount: Amount,
    ) -> Result<()>;

    /// Current amount of `token` the exchange may move on behalf of `owner`.
    async fn get_allowance(&self, token: &Address, owner: &Address) -> Result<Amount>;

    /// Overwrite the exchange allowance of `owner` for `token`.
    async fn set_allowance(&self, token: &Address, owner: &Address, amount: Amount)
        -> Result<()>;

    /// Wrap `wei_amount` of the base asset into the fee token for `account`.
    async fn deposit_to_fee_token(&self, wei_amount: Amount, account: &Address) -> Result<TxHash>;

    /// Block until the transaction is mined.
    async fn await_mined(&self, tx_hash: &TxHash) -> Result<()>;

    async fn get_balance(&self, token: &Address, account: &Address) -> Result<Amount>;

    /// Fill `fill_amount` (in taker-token units) of `order` as `taker`.
    ///
    /// With `fail_on_insufficient_funds` set, a fill larger than the order's
    /// remaining taker amount is rejected; unset, it is clamped to the
    /// remainder. A fill the parties cannot settle (short balance or
    /// allowance) fails either way.
    async fn submit_fill(
        &self,
        order: &SignedOrder,
        fill_amount: Amount,
        taker: &Address,
        fail_on_insufficient_funds: bool,
    ) -> Result<()>;

    /// Convert whole base-asset units to wei.
    fn to_base_units(&self, amount: Amount) -> Result<Amount> {
        Ok(amount.scale_up(BASE_ASSET_DECIMALS)?)
    }

    /// Get the client name for logging/debugging.
    fn client_name(&self) -> &'static str;
}
