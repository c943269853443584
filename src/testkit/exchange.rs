//! In-memory [`ExchangeClient`] for tests.
//!
//! Keeps a token ledger (balances, exchange allowances, base-asset balances,
//! filled amounts per order) behind a mutex and records every call so tests
//! can assert on exactly what the fixture asked the chain to do.

use std::collections::{BTreeMap, HashMap, HashSet};

use alloy_primitives::B256;
use async_trait::async_trait;
use parking_lot::Mutex;

use crate::domain::{Address, Amount, SignedOrder, TxHash};
use crate::error::{ExchangeError, Result};
use crate::port::ExchangeClient;

/// Operation kinds, used for counting calls and injecting failures.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum CallKind {
    Transfer,
    GetAllowance,
    SetAllowance,
    Deposit,
    AwaitMined,
    GetBalance,
    SubmitFill,
}

/// A recorded exchange call with its arguments.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ExchangeCall {
    Transfer {
        token: Address,
        from: Address,
        to: Address,
        amount: Amount,
    },
    GetAllowance {
        token: Address,
        owner: Address,
    },
    SetAllowance {
        token: Address,
        owner: Address,
        amount: Amount,
    },
    Deposit {
        account: Address,
        wei_amount: Amount,
    },
    AwaitMined {
        tx_hash: TxHash,
    },
    GetBalance {
        token: Address,
        account: Address,
    },
    SubmitFill {
        order_hash: B256,
        fill_amount: Amount,
        taker: Address,
        fail_on_insufficient_funds: bool,
    },
}

impl ExchangeCall {
    #[must_use]
    pub fn kind(&self) -> CallKind {
        match self {
            ExchangeCall::Transfer { .. } => CallKind::Transfer,
            ExchangeCall::GetAllowance { .. } => CallKind::GetAllowance,
            ExchangeCall::SetAllowance { .. } => CallKind::SetAllowance,
            ExchangeCall::Deposit { .. } => CallKind::Deposit,
            ExchangeCall::AwaitMined { .. } => CallKind::AwaitMined,
            ExchangeCall::GetBalance { .. } => CallKind::GetBalance,
            ExchangeCall::SubmitFill { .. } => CallKind::SubmitFill,
        }
    }
}

type Key = (Address, Address);

#[derive(Default)]
struct Ledger {
    balances: HashMap<Key, Amount>,
    allowances: HashMap<Key, Amount>,
    base_balances: HashMap<Address, Amount>,
    pending: HashSet<TxHash>,
    mined: HashSet<TxHash>,
    filled: HashMap<B256, Amount>,
    calls: Vec<ExchangeCall>,
    failures: HashMap<CallKind, ExchangeError>,
    deposit_credit_cap: Option<Amount>,
    next_tx: u64,
}

impl Ledger {
    /// Record the call, then return the injected failure for its kind, if any.
    fn record(&mut self, call: ExchangeCall) -> std::result::Result<(), ExchangeError> {
        let kind = call.kind();
        self.calls.push(call);
        match self.failures.get(&kind) {
            Some(err) => Err(err.clone()),
            None => Ok(()),
        }
    }

    fn balance(&self, token: &Address, owner: &Address) -> Amount {
        self.balances
            .get(&(token.clone(), owner.clone()))
            .copied()
            .unwrap_or_default()
    }

    fn allowance(&self, token: &Address, owner: &Address) -> Amount {
        self.allowances
            .get(&(token.clone(), owner.clone()))
            .copied()
            .unwrap_or_default()
    }

    fn debit(&mut self, token: &Address, owner: &Address, amount: Amount) -> Result<()> {
        let available = self.balance(token, owner);
        let remaining = available.checked_sub(amount).map_err(|_| {
            ExchangeError::InsufficientBalance {
                token: token.clone(),
                owner: owner.clone(),
                available,
                required: amount,
            }
        })?;
        self.balances.insert((token.clone(), owner.clone()), remaining);
        Ok(())
    }

    fn credit(&mut self, token: &Address, owner: &Address, amount: Amount) -> Result<()> {
        let updated = self.balance(token, owner).checked_add(amount)?;
        self.balances.insert((token.clone(), owner.clone()), updated);
        Ok(())
    }

    fn spend_allowance(&mut self, token: &Address, owner: &Address, amount: Amount) -> Result<()> {
        let remaining = self.allowance(token, owner).checked_sub(amount)?;
        self.allowances.insert((token.clone(), owner.clone()), remaining);
        Ok(())
    }
}

/// One leg of a fill settlement: `amount` of `token` moves `from` -> `to`
/// through the exchange allowance of `from`.
struct Movement {
    token: Address,
    from: Address,
    to: Address,
    amount: Amount,
}

pub struct InMemoryExchange {
    fee_token: Address,
    ledger: Mutex<Ledger>,
}

impl InMemoryExchange {
    /// Create an empty ledger. Deposits credit `fee_token`.
    pub fn new(fee_token: Address) -> Self {
        Self {
            fee_token,
            ledger: Mutex::new(Ledger::default()),
        }
    }

    #[must_use]
    pub fn with_balance(self, token: &Address, owner: &Address, amount: Amount) -> Self {
        self.seed_balance(token, owner, amount);
        self
    }

    #[must_use]
    pub fn with_base_balance(self, account: &Address, wei_amount: Amount) -> Self {
        self.seed_base_balance(account, wei_amount);
        self
    }

    pub fn seed_balance(&self, token: &Address, owner: &Address, amount: Amount) {
        self.ledger
            .lock()
            .balances
            .insert((token.clone(), owner.clone()), amount);
    }

    pub fn seed_allowance(&self, token: &Address, owner: &Address, amount: Amount) {
        self.ledger
            .lock()
            .allowances
            .insert((token.clone(), owner.clone()), amount);
    }

    pub fn seed_base_balance(&self, account: &Address, wei_amount: Amount) {
        self.ledger
            .lock()
            .base_balances
            .insert(account.clone(), wei_amount);
    }

    /// Credit at most `cap` of the fee token per deposit while still debiting
    /// the full base-asset amount, like a wrapper contract that mints short.
    pub fn cap_deposit_credit(&self, cap: Amount) {
        self.ledger.lock().deposit_credit_cap = Some(cap);
    }

    /// Make every subsequent call of `kind` fail with `error`.
    pub fn fail_on(&self, kind: CallKind, error: ExchangeError) {
        self.ledger.lock().failures.insert(kind, error);
    }

    #[must_use]
    pub fn fee_token(&self) -> &Address {
        &self.fee_token
    }

    #[must_use]
    pub fn balance(&self, token: &Address, owner: &Address) -> Amount {
        self.ledger.lock().balance(token, owner)
    }

    #[must_use]
    pub fn allowance(&self, token: &Address, owner: &Address) -> Amount {
        self.ledger.lock().allowance(token, owner)
    }

    #[must_use]
    pub fn base_balance(&self, account: &Address) -> Amount {
        self.ledger
            .lock()
            .base_balances
            .get(account)
            .copied()
            .unwrap_or_default()
    }

    /// Taker-token amount filled so far against an order.
    #[must_use]
    pub fn filled_amount(&self, order_hash: &B256) -> Amount {
        self.ledger
            .lock()
            .filled
            .get(order_hash)
            .copied()
            .unwrap_or_default()
    }

    #[must_use]
    pub fn calls(&self) -> Vec<ExchangeCall> {
        self.ledger.lock().calls.clone()
    }

    #[must_use]
    pub fn count(&self, kind: CallKind) -> usize {
        self.ledger
            .lock()
            .calls
            .iter()
            .filter(|call| call.kind() == kind)
            .count()
    }

    /// Recorded transfers, in call order.
    #[must_use]
    pub fn transfers(&self) -> Vec<ExchangeCall> {
        self.calls()
            .into_iter()
            .filter(|call| call.kind() == CallKind::Transfer)
            .collect()
    }

    fn settle(ledger: &mut Ledger, movements: &[Movement]) -> Result<()> {
        // Check aggregated requirements first so a failed fill leaves the
        // ledger untouched.
        let mut required: BTreeMap<Key, Amount> = BTreeMap::new();
        for movement in movements {
            let entry = required
                .entry((movement.token.clone(), movement.from.clone()))
                .or_default();
            *entry = entry.checked_add(movement.amount)?;
        }
        for ((token, owner), amount) in &required {
            let balance = ledger.balance(token, owner);
            if balance < *amount {
                return Err(ExchangeError::InsufficientBalance {
                    token: token.clone(),
                    owner: owner.clone(),
                    available: balance,
                    required: *amount,
                }
                .into());
            }
            let allowance = ledger.allowance(token, owner);
            if allowance < *amount {
                return Err(ExchangeError::InsufficientAllowance {
                    token: token.clone(),
                    owner: owner.clone(),
                    available: allowance,
                    required: *amount,
                }
                .into());
            }
        }

        for movement in movements {
            ledger.debit(&movement.token, &movement.from, movement.amount)?;
            ledger.spend_allowance(&movement.token, &movement.from, movement.amount)?;
            ledger.credit(&movement.token, &movement.to, movement.amount)?;
        }
        Ok(())
    }
}

#[async_trait]
impl ExchangeClient for InMemoryExchange {
    async fn transfer(
        &self,
        token: &Address,
        from: &Address,
        to: &Address,
        amount: Amount,
    ) -> Result<()> {
        let mut ledger = self.ledger.lock();
        ledger.record(ExchangeCall::Transfer {
            token: token.clone(),
            from: from.clone(),
            to: to.clone(),
            amount,
        })?;
        ledger.debit(token, from, amount)?;
        ledger.credit(token, to, amount)
    }

    async fn get_allowance(&self, token: &Address, owner: &Address) -> Result<Amount> {
        let mut ledger = self.ledger.lock();
        ledger.record(ExchangeCall::GetAllowance {
            token: token.clone(),
            owner: owner.clone(),
        })?;
        Ok(ledger.allowance(token, owner))
    }

    async fn set_allowance(
        &self,
        token: &Address,
        owner: &Address,
        amount: Amount,
    ) -> Result<()> {
        let mut ledger = self.ledger.lock();
        ledger.record(ExchangeCall::SetAllowance {
            token: token.clone(),
            owner: owner.clone(),
            amount,
        })?;
        ledger
            .allowances
            .insert((token.clone(), owner.clone()), amount);
        Ok(())
    }

    async fn deposit_to_fee_token(&self, wei_amount: Amount, account: &Address) -> Result<TxHash> {
        let mut ledger = self.ledger.lock();
        ledger.record(ExchangeCall::Deposit {
            account: account.clone(),
            wei_amount,
        })?;

        let available = ledger
            .base_balances
            .get(account)
            .copied()
            .unwrap_or_default();
        let remaining =
            available
                .checked_sub(wei_amount)
                .map_err(|_| ExchangeError::InsufficientBalance {
                    token: Address::null(),
                    owner: account.clone(),
                    available,
                    required: wei_amount,
                })?;
        ledger.base_balances.insert(account.clone(), remaining);
        let credited = match ledger.deposit_credit_cap {
            Some(cap) if cap < wei_amount => cap,
            _ => wei_amount,
        };
        ledger.credit(&self.fee_token, account, credited)?;

        ledger.next_tx += 1;
        let tx_hash = TxHash::new(format!("0x{:064x}", ledger.next_tx));
        ledger.pending.insert(tx_hash.clone());
        Ok(tx_hash)
    }

    async fn await_mined(&self, tx_hash: &TxHash) -> Result<()> {
        let mut ledger = self.ledger.lock();
        ledger.record(ExchangeCall::AwaitMined {
            tx_hash: tx_hash.clone(),
        })?;
        if ledger.pending.remove(tx_hash) || ledger.mined.contains(tx_hash) {
            ledger.mined.insert(tx_hash.clone());
            Ok(())
        } else {
            Err(ExchangeError::UnknownTransaction(tx_hash.to_string()).into())
        }
    }

    async fn get_balance(&self, token: &Address, account: &Address) -> Result<Amount> {
        let mut ledger = self.ledger.lock();
        ledger.record(ExchangeCall::GetBalance {
            token: token.clone(),
            account: account.clone(),
        })?;
        Ok(ledger.balance(token, account))
    }

    /// Settles like the exchange contract would: the taker pays taker tokens,
    /// receives maker tokens pro rata, and both sides pay fees pro rata in the
    /// fee token. An oversized fill is rejected with `FillExceedsRemaining`
    /// when `fail_on_insufficient_funds` is set and clamped to what remains
    /// otherwise. A fill the parties cannot cover fails in both modes and
    /// leaves the ledger untouched.
    async fn submit_fill(
        &self,
        order: &SignedOrder,
        fill_amount: Amount,
        taker: &Address,
        fail_on_insufficient_funds: bool,
    ) -> Result<()> {
        let mut ledger = self.ledger.lock();
        ledger.record(ExchangeCall::SubmitFill {
            order_hash: order.order_hash,
            fill_amount,
            taker: taker.clone(),
            fail_on_insufficient_funds,
        })?;

        let already_filled = ledger
            .filled
            .get(&order.order_hash)
            .copied()
            .unwrap_or_default();
        let remaining = order.taker_token_amount.checked_sub(already_filled)?;
        if remaining.is_zero() {
            return Err(ExchangeError::Reverted("order fully filled".into()).into());
        }
        let fill = if fill_amount > remaining {
            if fail_on_insufficient_funds {
                return Err(ExchangeError::FillExceedsRemaining {
                    requested: fill_amount,
                    remaining,
                }
                .into());
            }
            remaining
        } else {
            fill_amount
        };

        let total = order.taker_token_amount;
        let maker_fill = order.maker_token_amount.pro_rata(fill, total)?;
        let maker_fee = order.maker_fee.pro_rata(fill, total)?;
        let taker_fee = order.taker_fee.pro_rata(fill, total)?;

        let movements: Vec<Movement> = [
            (&order.taker_token_address, taker, &order.maker, fill),
            (&order.maker_token_address, &order.maker, taker, maker_fill),
            (&self.fee_token, &order.maker, &order.fee_recipient, maker_fee),
            (&self.fee_token, taker, &order.fee_recipient, taker_fee),
        ]
        .into_iter()
        .filter(|(_, _, _, amount)| !amount.is_zero())
        .map(|(token, from, to, amount)| Movement {
            token: token.clone(),
            from: from.clone(),
            to: to.clone(),
            amount,
        })
        .collect();

        Self::settle(&mut ledger, &movements)?;

        let filled = already_filled.checked_add(fill)?;
        ledger.filled.insert(order.order_hash, filled);
        Ok(())
    }

    fn client_name(&self) -> &'static str {
        "in-memory"
    }
}
