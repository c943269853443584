//! Balance and allowance provisioning.
//!
//! Tops up a participant so an order can be filled against them right away:
//! the token balance comes from the coinbase account (or, for the fee token,
//! from wrapping the base asset) and the exchange allowance is raised by the
//! same amount.

use std::sync::Arc;

use tracing::debug;

use crate::domain::{Address, Amount};
use crate::error::{Error, Result};
use crate::port::ExchangeClient;

pub struct Provisioner {
    exchange: Arc<dyn ExchangeClient>,
    coinbase: Address,
    verify_deposits: bool,
}

impl Provisioner {
    /// Create a provisioner funding transfers from `coinbase`.
    pub fn new(exchange: Arc<dyn ExchangeClient>, coinbase: Address) -> Self {
        Self {
            exchange,
            coinbase,
            verify_deposits: false,
        }
    }

    /// Check the fee-token balance after every deposit.
    #[must_use]
    pub fn with_deposit_verification(mut self, enabled: bool) -> Self {
        self.verify_deposits = enabled;
        self
    }

    #[must_use]
    pub fn coinbase(&self) -> &Address {
        &self.coinbase
    }

    /// Raise `account`'s balance and exchange allowance of `token` by
    /// `amount`. A zero amount makes no exchange calls.
    ///
    /// The transfer and the allowance update run concurrently; the first
    /// failure is returned unchanged.
    pub async fn ensure_funded(&self, token: &Address, account: &Address, amount: Amount) -> Result<()> {
        if amount.is_zero() {
            debug!(token = %token, account = %account, "Zero amount, skipping funding");
            return Ok(());
        }

        debug!(token = %token, account = %account, amount = %amount, "Funding account");
        tokio::try_join!(
            self.increase_balance(token, account, amount),
            self.increase_allowance(token, account, amount),
        )?;
        Ok(())
    }

    /// Fee-token variant of [`ensure_funded`](Self::ensure_funded): wraps the
    /// base asset into `fee_token` for `account`, waits for the deposit to be
    /// mined, then raises the allowance. A zero amount makes no exchange calls.
    ///
    /// With deposit verification on, the fee-token balance must have grown by
    /// the full deposit in wei before the allowance is touched.
    pub async fn ensure_fee_funded(
        &self,
        fee_token: &Address,
        account: &Address,
        amount: Amount,
    ) -> Result<()> {
        if amount.is_zero() {
            debug!(token = %fee_token, account = %account, "Zero fee, skipping deposit");
            return Ok(());
        }

        let wei_amount = self.exchange.to_base_units(amount)?;
        debug!(
            token = %fee_token,
            account = %account,
            amount = %amount,
            wei = %wei_amount,
            "Depositing into fee token"
        );

        let pre_balance = if self.verify_deposits {
            Some(self.exchange.get_balance(fee_token, account).await?)
        } else {
            None
        };

        let tx_hash = self.exchange.deposit_to_fee_token(wei_amount, account).await?;
        self.exchange.await_mined(&tx_hash).await?;

        if let Some(pre_balance) = pre_balance {
            let expected = pre_balance.checked_add(wei_amount)?;
            let balance = self.exchange.get_balance(fee_token, account).await?;
            debug!(
                account = %account,
                balance = %balance,
                expected = %expected,
                tx_hash = %tx_hash,
                "Fee token balance after deposit"
            );
            if balance < expected {
                return Err(Error::DepositShortfall {
                    account: account.clone(),
                    expected,
                    actual: balance,
                });
            }
        }

        self.increase_allowance(fee_token, account, amount).await
    }

    async fn increase_balance(&self, token: &Address, account: &Address, amount: Amount) -> Result<()> {
        self.exchange
            .transfer(token, &self.coinbase, account, amount)
            .await
    }

    async fn increase_allowance(
        &self,
        token: &Address,
        account: &Address,
        amount: Amount,
    ) -> Result<()> {
        let current = self.exchange.get_allowance(token, account).await?;
        let updated = current.checked_add(amount)?;
        self.exchange.set_allowance(token, account, updated).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::ExchangeError;
    use crate::testkit::domain::addr;
    use crate::testkit::exchange::{CallKind, InMemoryExchange};
    use rust_decimal_macros::dec;

    const FEE: &str = "0xfee";
    const TKN: &str = "0xa";

    fn setup() -> (Arc<InMemoryExchange>, Provisioner) {
        let exchange = Arc::new(
            InMemoryExchange::new(addr(FEE)).with_balance(&addr(TKN), &addr("0xcoinbase"), Amount::from(1_000)),
        );
        let provisioner = Provisioner::new(exchange.clone(), addr("0xcoinbase"));
        (exchange, provisioner)
    }

    #[tokio::test]
    async fn zero_amount_makes_no_calls() {
        let (exchange, provisioner) = setup();

        provisioner
            .ensure_funded(&addr(TKN), &addr("0xmaker"), Amount::ZERO)
            .await
            .unwrap();
        provisioner
            .ensure_fee_funded(&addr(FEE), &addr("0xmaker"), Amount::ZERO)
            .await
            .unwrap();

        assert!(exchange.calls().is_empty());
    }

    #[tokio::test]
    async fn funds_balance_and_allowance_from_zero_exactly() {
        let (exchange, provisioner) = setup();
        let amount = Amount::try_new(dec!(12.5)).unwrap();

        provisioner
            .ensure_funded(&addr(TKN), &addr("0xmaker"), amount)
            .await
            .unwrap();

        assert_eq!(exchange.balance(&addr(TKN), &addr("0xmaker")), amount);
        assert_eq!(exchange.allowance(&addr(TKN), &addr("0xmaker")), amount);
        assert_eq!(
            exchange.balance(&addr(TKN), &addr("0xcoinbase")),
            Amount::try_new(dec!(987.5)).unwrap()
        );
    }

    #[tokio::test]
    async fn allowance_is_raised_on_top_of_existing() {
        let (exchange, provisioner) = setup();
        exchange.seed_allowance(&addr(TKN), &addr("0xmaker"), Amount::from(7));

        provisioner
            .ensure_funded(&addr(TKN), &addr("0xmaker"), Amount::from(3))
            .await
            .unwrap();

        assert_eq!(exchange.allowance(&addr(TKN), &addr("0xmaker")), Amount::from(10));
        assert_eq!(exchange.count(CallKind::GetAllowance), 1);
        assert_eq!(exchange.count(CallKind::SetAllowance), 1);
        assert_eq!(exchange.count(CallKind::Transfer), 1);
    }

    #[tokio::test]
    async fn transfer_failure_propagates_unchanged() {
        let (exchange, provisioner) = setup();
        exchange.fail_on(CallKind::Transfer, ExchangeError::Network("connection reset".into()));

        let err = provisioner
            .ensure_funded(&addr(TKN), &addr("0xmaker"), Amount::from(5))
            .await
            .unwrap_err();

        assert!(matches!(
            err,
            Error::Exchange(ExchangeError::Network(ref msg)) if msg == "connection reset"
        ));
    }

    #[tokio::test]
    async fn insufficient_coinbase_balance_surfaces_exchange_error() {
        let (_exchange, provisioner) = setup();

        let err = provisioner
            .ensure_funded(&addr(TKN), &addr("0xmaker"), Amount::from(5_000))
            .await
            .unwrap_err();

        assert!(matches!(
            err,
            Error::Exchange(ExchangeError::InsufficientBalance { .. })
        ));
    }

    #[tokio::test]
    async fn fee_funding_deposits_waits_then_approves() {
        let (exchange, provisioner) = setup();
        exchange.seed_base_balance(&addr("0xmaker"), Amount::from(10).scale_up(18).unwrap());

        provisioner
            .ensure_fee_funded(&addr(FEE), &addr("0xmaker"), Amount::from(2))
            .await
            .unwrap();

        let kinds: Vec<_> = exchange.calls().iter().map(|c| c.kind()).collect();
        assert_eq!(
            kinds,
            vec![
                CallKind::Deposit,
                CallKind::AwaitMined,
                CallKind::GetAllowance,
                CallKind::SetAllowance,
            ]
        );
        assert_eq!(exchange.allowance(&addr(FEE), &addr("0xmaker")), Amount::from(2));
        assert_eq!(
            exchange.balance(&addr(FEE), &addr("0xmaker")),
            Amount::from(2).scale_up(18).unwrap()
        );
    }

    #[tokio::test]
    async fn deposit_verification_reads_balance() {
        let (exchange, provisioner) = setup();
        let provisioner = provisioner.with_deposit_verification(true);
        exchange.seed_base_balance(&addr("0xtaker"), Amount::from(1).scale_up(18).unwrap());

        provisioner
            .ensure_fee_funded(&addr(FEE), &addr("0xtaker"), Amount::from(1))
            .await
            .unwrap();

        assert_eq!(exchange.count(CallKind::GetBalance), 2);
        assert_eq!(exchange.count(CallKind::SetAllowance), 1);
    }

    #[tokio::test]
    async fn short_credited_deposit_is_a_shortfall_in_wei() {
        let (exchange, provisioner) = setup();
        let provisioner = provisioner.with_deposit_verification(true);
        let wei = Amount::from(1).scale_up(18).unwrap();
        exchange.seed_base_balance(&addr("0xtaker"), wei);
        exchange.cap_deposit_credit(Amount::from(1));

        let err = provisioner
            .ensure_fee_funded(&addr(FEE), &addr("0xtaker"), Amount::from(1))
            .await
            .unwrap_err();

        match err {
            Error::DepositShortfall {
                account,
                expected,
                actual,
            } => {
                assert_eq!(account, addr("0xtaker"));
                assert_eq!(expected, wei);
                assert_eq!(actual, Amount::from(1));
            }
            other => panic!("expected DepositShortfall, got {other:?}"),
        }
        assert_eq!(exchange.count(CallKind::SetAllowance), 0);
    }

    #[tokio::test]
    async fn existing_fee_balance_does_not_mask_a_shortfall() {
        let (exchange, provisioner) = setup();
        let provisioner = provisioner.with_deposit_verification(true);
        let wei = Amount::from(1).scale_up(18).unwrap();
        exchange.seed_base_balance(&addr("0xmaker"), wei);
        exchange.seed_balance(&addr(FEE), &addr("0xmaker"), Amount::from(5).scale_up(18).unwrap());
        exchange.cap_deposit_credit(Amount::from(1));

        let err = provisioner
            .ensure_fee_funded(&addr(FEE), &addr("0xmaker"), Amount::from(1))
            .await
            .unwrap_err();

        match err {
            Error::DepositShortfall { expected, .. } => {
                assert_eq!(expected, Amount::from(6).scale_up(18).unwrap());
            }
            other => panic!("expected DepositShortfall, got {other:?}"),
        }
    }

    #[tokio::test]
    async fn deposit_without_base_asset_fails() {
        let (exchange, provisioner) = setup();

        let err = provisioner
            .ensure_fee_funded(&addr(FEE), &addr("0xtaker"), Amount::from(1))
            .await
            .unwrap_err();

        assert!(matches!(
            err,
            Error::Exchange(ExchangeError::InsufficientBalance { .. })
        ));
        assert_eq!(exchange.count(CallKind::SetAllowance), 0);
    }
}
