//! Fillable order construction.
//!
//! [`FillScenarios`] turns a description of an order into a signed order
//! whose maker and taker already hold the balances and exchange allowances
//! needed to fill it, fees included.

use std::sync::Arc;

use tracing::info;

use super::provision::Provisioner;
use super::token::TokenClassifier;
use crate::config::Config;
use crate::domain::{Address, Amount, OrderParams, SignedOrder};
use crate::error::{ConfigError, Result};
use crate::port::{ExchangeClient, OrderFactory};

/// Arguments for [`FillScenarios::build_fillable_order`].
///
/// Fees default to zero, the fee recipient to the null address, and the
/// expiration to none.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FillableOrderRequest {
    pub maker_token: Address,
    pub taker_token: Address,
    pub maker: Address,
    pub taker: Address,
    pub maker_amount: Amount,
    pub taker_amount: Amount,
    pub maker_fee: Amount,
    pub taker_fee: Amount,
    pub fee_recipient: Address,
    pub expiration_unix_timestamp_sec: Option<u64>,
}

impl FillableOrderRequest {
    pub fn new(
        maker_token: Address,
        taker_token: Address,
        maker: Address,
        taker: Address,
        maker_amount: Amount,
        taker_amount: Amount,
    ) -> Self {
        Self {
            maker_token,
            taker_token,
            maker,
            taker,
            maker_amount,
            taker_amount,
            maker_fee: Amount::ZERO,
            taker_fee: Amount::ZERO,
            fee_recipient: Address::null(),
            expiration_unix_timestamp_sec: None,
        }
    }

    #[must_use]
    pub fn with_fees(mut self, maker_fee: Amount, taker_fee: Amount, fee_recipient: Address) -> Self {
        self.maker_fee = maker_fee;
        self.taker_fee = taker_fee;
        self.fee_recipient = fee_recipient;
        self
    }

    #[must_use]
    pub fn with_expiration(mut self, expiration_unix_timestamp_sec: Option<u64>) -> Self {
        self.expiration_unix_timestamp_sec = expiration_unix_timestamp_sec;
        self
    }
}

/// Builds funded, approved, signed orders for exchange tests.
pub struct FillScenarios {
    exchange: Arc<dyn ExchangeClient>,
    factory: Arc<dyn OrderFactory>,
    provisioner: Provisioner,
    user_addresses: Vec<Address>,
    fee_token: Address,
    exchange_address: Address,
}

impl FillScenarios {
    /// Create a scenario builder.
    ///
    /// The first entry of `user_addresses` funds every trade-token transfer
    /// and makes partially filled orders.
    ///
    /// # Errors
    ///
    /// Returns an error if `user_addresses` is empty.
    pub fn new(
        exchange: Arc<dyn ExchangeClient>,
        factory: Arc<dyn OrderFactory>,
        user_addresses: Vec<Address>,
        fee_token: Address,
        exchange_address: Address,
    ) -> Result<Self> {
        let coinbase = user_addresses
            .first()
            .cloned()
            .ok_or(ConfigError::MissingField {
                field: "user_addresses",
            })?;

        Ok(Self {
            provisioner: Provisioner::new(exchange.clone(), coinbase),
            exchange,
            factory,
            user_addresses,
            fee_token,
            exchange_address,
        })
    }

    /// Create a scenario builder from configuration, resolving the fee token
    /// from the configured registry.
    ///
    /// # Errors
    ///
    /// Returns [`Error::TokenNotFound`](crate::error::Error::TokenNotFound)
    /// when the registry lacks the fee token.
    pub fn from_config(
        config: &Config,
        exchange: Arc<dyn ExchangeClient>,
        factory: Arc<dyn OrderFactory>,
    ) -> Result<Self> {
        let classifier =
            TokenClassifier::new(config.tokens.clone(), config.fixture.fee_token_symbol.clone());
        let fee_token = classifier.fee_token_or_fail()?.address.clone();
        let scenarios = Self::new(
            exchange,
            factory,
            config.fixture.user_addresses.clone(),
            fee_token,
            config.exchange_address()?.clone(),
        )?;
        Ok(scenarios.with_deposit_verification(config.fixture.verify_deposits))
    }

    /// Check the fee-token balance after every deposit.
    #[must_use]
    pub fn with_deposit_verification(mut self, enabled: bool) -> Self {
        self.provisioner = self.provisioner.with_deposit_verification(enabled);
        self
    }

    #[must_use]
    pub fn coinbase(&self) -> &Address {
        self.provisioner.coinbase()
    }

    #[must_use]
    pub fn user_addresses(&self) -> &[Address] {
        &self.user_addresses
    }

    #[must_use]
    pub fn fee_token(&self) -> &Address {
        &self.fee_token
    }

    /// Symmetric order without fees.
    pub async fn fillable_order(
        &self,
        maker_token: &Address,
        taker_token: &Address,
        maker: &Address,
        taker: &Address,
        fillable_amount: Amount,
        expiration_unix_timestamp_sec: Option<u64>,
    ) -> Result<SignedOrder> {
        self.asymmetric_fillable_order(
            maker_token,
            taker_token,
            maker,
            taker,
            fillable_amount,
            fillable_amount,
            expiration_unix_timestamp_sec,
        )
        .await
    }

    /// Symmetric order with maker and taker fees paid in the fee token.
    #[allow(clippy::too_many_arguments)]
    pub async fn fillable_order_with_fees(
        &self,
        maker_token: &Address,
        taker_token: &Address,
        maker_fee: Amount,
        taker_fee: Amount,
        maker: &Address,
        taker: &Address,
        fillable_amount: Amount,
        fee_recipient: &Address,
        expiration_unix_timestamp_sec: Option<u64>,
    ) -> Result<SignedOrder> {
        let request = FillableOrderRequest::new(
            maker_token.clone(),
            taker_token.clone(),
            maker.clone(),
            taker.clone(),
            fillable_amount,
            fillable_amount,
        )
        .with_fees(maker_fee, taker_fee, fee_recipient.clone())
        .with_expiration(expiration_unix_timestamp_sec);
        self.build_fillable_order(request).await
    }

    /// Order with different maker and taker amounts, without fees.
    #[allow(clippy::too_many_arguments)]
    pub async fn asymmetric_fillable_order(
        &self,
        maker_token: &Address,
        taker_token: &Address,
        maker: &Address,
        taker: &Address,
        maker_amount: Amount,
        taker_amount: Amount,
        expiration_unix_timestamp_sec: Option<u64>,
    ) -> Result<SignedOrder> {
        let request = FillableOrderRequest::new(
            maker_token.clone(),
            taker_token.clone(),
            maker.clone(),
            taker.clone(),
            maker_amount,
            taker_amount,
        )
        .with_expiration(expiration_unix_timestamp_sec);
        self.build_fillable_order(request).await
    }

    /// Symmetric order made by the first user and already filled by
    /// `partial_fill_amount` from `taker`.
    pub async fn partially_filled_order(
        &self,
        maker_token: &Address,
        taker_token: &Address,
        taker: &Address,
        fillable_amount: Amount,
        partial_fill_amount: Amount,
    ) -> Result<SignedOrder> {
        let maker = self.coinbase().clone();
        let order = self
            .asymmetric_fillable_order(
                maker_token,
                taker_token,
                &maker,
                taker,
                fillable_amount,
                fillable_amount,
                None,
            )
            .await?;

        let fail_on_insufficient_funds = false;
        self.exchange
            .submit_fill(&order, partial_fill_amount, taker, fail_on_insufficient_funds)
            .await?;
        info!(
            order_hash = %order.order_hash,
            taker = %taker,
            fill = %partial_fill_amount,
            exchange = self.exchange.client_name(),
            "Partially filled order"
        );
        Ok(order)
    }

    /// Fund and approve both sides, then sign.
    ///
    /// Trade tokens for maker and taker are provisioned concurrently, then
    /// fee tokens for both. Any failure aborts the build and is returned
    /// unchanged.
    pub async fn build_fillable_order(&self, request: FillableOrderRequest) -> Result<SignedOrder> {
        tokio::try_join!(
            self.provisioner
                .ensure_funded(&request.maker_token, &request.maker, request.maker_amount),
            self.provisioner
                .ensure_funded(&request.taker_token, &request.taker, request.taker_amount),
        )?;
        tokio::try_join!(
            self.provisioner
                .ensure_fee_funded(&self.fee_token, &request.maker, request.maker_fee),
            self.provisioner
                .ensure_fee_funded(&self.fee_token, &request.taker, request.taker_fee),
        )?;

        let params = OrderParams {
            maker: request.maker,
            taker: request.taker,
            maker_fee: request.maker_fee,
            taker_fee: request.taker_fee,
            maker_token_amount: request.maker_amount,
            maker_token_address: request.maker_token,
            taker_token_amount: request.taker_amount,
            taker_token_address: request.taker_token,
            exchange_contract_address: self.exchange_address.clone(),
            fee_recipient: request.fee_recipient,
            expiration_unix_timestamp_sec: request.expiration_unix_timestamp_sec,
        };
        let order = self.factory.sign_order(&params).await?;

        info!(
            order_hash = %order.order_hash,
            maker = %order.maker,
            taker = %order.taker,
            maker_amount = %order.maker_token_amount,
            taker_amount = %order.taker_token_amount,
            "Signed fillable order"
        );
        Ok(order)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::{Error, ExchangeError};
    use crate::testkit::domain::addr;
    use crate::testkit::exchange::{CallKind, InMemoryExchange};
    use crate::testkit::factory::{StubOrderFactory, DEFAULT_EXPIRATION_SEC};

    const A: &str = "0xa";
    const B: &str = "0xb";
    const FEE: &str = "0xfee";

    struct Harness {
        exchange: Arc<InMemoryExchange>,
        factory: Arc<StubOrderFactory>,
        scenarios: FillScenarios,
    }

    fn harness() -> Harness {
        let coinbase = addr("0xcoinbase");
        let exchange = Arc::new(
            InMemoryExchange::new(addr(FEE))
                .with_balance(&addr(A), &coinbase, Amount::from(1_000_000))
                .with_balance(&addr(B), &coinbase, Amount::from(1_000_000))
                .with_base_balance(&addr("0xmaker"), Amount::from(100).scale_up(18).unwrap())
                .with_base_balance(&addr("0xtaker"), Amount::from(100).scale_up(18).unwrap()),
        );
        let factory = Arc::new(StubOrderFactory::new());
        let scenarios = FillScenarios::new(
            exchange.clone(),
            factory.clone(),
            vec![coinbase, addr("0xmaker"), addr("0xtaker")],
            addr(FEE),
            addr("0xexchange"),
        )
        .unwrap();
        Harness {
            exchange,
            factory,
            scenarios,
        }
    }

    #[test]
    fn empty_user_list_is_rejected() {
        let result = FillScenarios::new(
            Arc::new(InMemoryExchange::new(addr(FEE))),
            Arc::new(StubOrderFactory::new()),
            vec![],
            addr(FEE),
            addr("0xexchange"),
        );
        assert!(matches!(
            result,
            Err(Error::Config(ConfigError::MissingField { .. }))
        ));
    }

    #[test]
    fn request_defaults_to_no_fees_and_no_expiration() {
        let request = FillableOrderRequest::new(
            addr(A),
            addr(B),
            addr("0xmaker"),
            addr("0xtaker"),
            Amount::from(1),
            Amount::from(2),
        );
        assert!(request.maker_fee.is_zero());
        assert!(request.taker_fee.is_zero());
        assert!(request.fee_recipient.is_null());
        assert_eq!(request.expiration_unix_timestamp_sec, None);
    }

    #[tokio::test]
    async fn symmetric_order_funds_both_sides_without_fees() {
        let h = harness();

        let order = h
            .scenarios
            .fillable_order(&addr(A), &addr(B), &addr("0xmaker"), &addr("0xtaker"), Amount::from(100), None)
            .await
            .unwrap();

        assert_eq!(order.maker_token_amount, Amount::from(100));
        assert_eq!(order.taker_token_amount, Amount::from(100));
        assert!(order.maker_fee.is_zero());
        assert!(order.taker_fee.is_zero());
        assert!(order.fee_recipient.is_null());
        assert_eq!(order.exchange_contract_address, addr("0xexchange"));
        assert_eq!(h.exchange.count(CallKind::Deposit), 0);
        assert_eq!(h.exchange.balance(&addr(A), &addr("0xmaker")), Amount::from(100));
        assert_eq!(h.exchange.allowance(&addr(A), &addr("0xmaker")), Amount::from(100));
        assert_eq!(h.exchange.balance(&addr(B), &addr("0xtaker")), Amount::from(100));
        assert_eq!(h.exchange.allowance(&addr(B), &addr("0xtaker")), Amount::from(100));
    }

    #[tokio::test]
    async fn asymmetric_amounts_are_provisioned_independently() {
        let h = harness();

        let order = h
            .scenarios
            .asymmetric_fillable_order(
                &addr(A),
                &addr(B),
                &addr("0xmaker"),
                &addr("0xtaker"),
                Amount::from(30),
                Amount::from(70),
                Some(1_800_000_000),
            )
            .await
            .unwrap();

        assert_eq!(order.maker_token_amount, Amount::from(30));
        assert_eq!(order.taker_token_amount, Amount::from(70));
        assert_eq!(order.expiration_unix_timestamp_sec, 1_800_000_000);
        assert_eq!(h.exchange.balance(&addr(A), &addr("0xmaker")), Amount::from(30));
        assert_eq!(h.exchange.balance(&addr(B), &addr("0xtaker")), Amount::from(70));
    }

    #[tokio::test]
    async fn fee_bearing_order_deposits_and_approves_fee_token() {
        let h = harness();

        let order = h
            .scenarios
            .fillable_order_with_fees(
                &addr(A),
                &addr(B),
                Amount::from(2),
                Amount::from(3),
                &addr("0xmaker"),
                &addr("0xtaker"),
                Amount::from(50),
                &addr("0xrelayer"),
                None,
            )
            .await
            .unwrap();

        assert_eq!(order.maker_fee, Amount::from(2));
        assert_eq!(order.taker_fee, Amount::from(3));
        assert_eq!(order.fee_recipient, addr("0xrelayer"));
        assert_eq!(h.exchange.count(CallKind::Deposit), 2);
        assert_eq!(h.exchange.count(CallKind::AwaitMined), 2);
        assert_eq!(h.exchange.allowance(&addr(FEE), &addr("0xmaker")), Amount::from(2));
        assert_eq!(h.exchange.allowance(&addr(FEE), &addr("0xtaker")), Amount::from(3));
    }

    #[tokio::test]
    async fn zero_fee_on_one_side_skips_only_that_deposit() {
        let h = harness();

        h.scenarios
            .fillable_order_with_fees(
                &addr(A),
                &addr(B),
                Amount::ZERO,
                Amount::from(1),
                &addr("0xmaker"),
                &addr("0xtaker"),
                Amount::from(10),
                &addr("0xrelayer"),
                None,
            )
            .await
            .unwrap();

        let deposits: Vec<_> = h
            .exchange
            .calls()
            .into_iter()
            .filter(|call| call.kind() == CallKind::Deposit)
            .collect();
        assert_eq!(deposits.len(), 1);
        assert!(matches!(
            &deposits[0],
            crate::testkit::exchange::ExchangeCall::Deposit { account, .. } if account == &addr("0xtaker")
        ));
    }

    #[tokio::test]
    async fn omitted_expiration_is_passed_through_as_none() {
        let h = harness();

        let order = h
            .scenarios
            .fillable_order(&addr(A), &addr(B), &addr("0xmaker"), &addr("0xtaker"), Amount::from(1), None)
            .await
            .unwrap();

        assert_eq!(h.factory.requests()[0].expiration_unix_timestamp_sec, None);
        assert_eq!(order.expiration_unix_timestamp_sec, DEFAULT_EXPIRATION_SEC);
    }

    #[tokio::test]
    async fn provisioning_failure_prevents_signing() {
        let h = harness();
        h.exchange
            .fail_on(CallKind::SetAllowance, ExchangeError::Reverted("approve failed".into()));

        let err = h
            .scenarios
            .fillable_order(&addr(A), &addr(B), &addr("0xmaker"), &addr("0xtaker"), Amount::from(5), None)
            .await
            .unwrap_err();

        assert!(matches!(err, Error::Exchange(ExchangeError::Reverted(_))));
        assert!(h.factory.requests().is_empty());
    }

    #[tokio::test]
    async fn signing_failure_propagates() {
        let h = harness();
        h.factory.fail_with("maker key unavailable");

        let err = h
            .scenarios
            .fillable_order(&addr(A), &addr(B), &addr("0xmaker"), &addr("0xtaker"), Amount::from(5), None)
            .await
            .unwrap_err();

        assert!(matches!(err, Error::Signing(_)));
    }

    #[tokio::test]
    async fn partially_filled_order_is_made_by_coinbase() {
        let h = harness();

        let order = h
            .scenarios
            .partially_filled_order(&addr(A), &addr(B), &addr("0xtaker"), Amount::from(100), Amount::from(40))
            .await
            .unwrap();

        assert_eq!(order.maker, addr("0xcoinbase"));
        assert_eq!(order.taker_token_amount, Amount::from(100));
        assert_eq!(h.exchange.filled_amount(&order.order_hash), Amount::from(40));
        assert!(h.exchange.calls().contains(&crate::testkit::exchange::ExchangeCall::SubmitFill {
            order_hash: order.order_hash,
            fill_amount: Amount::from(40),
            taker: addr("0xtaker"),
            fail_on_insufficient_funds: false,
        }));
    }
}
