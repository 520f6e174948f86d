//! Thread-safe host rendition of the sale.
//!
//! All state lives in one bundle behind a single `RwLock`. Every mutating call
//! runs as one transaction under the write guard: the bundle is snapshotted,
//! the operation applied, and the snapshot restored if anything fails, outward
//! value transfers included. Reads take the shared guard and always observe a
//! committed state.

use std::sync::Arc;

use alloy_primitives::{Address, U256};
use parking_lot::RwLock;
use tokio::sync::broadcast;

use crate::backend::SaleBackend;
use crate::config::SaleParams;
use crate::constants::{TOKEN_DECIMALS, TOKEN_NAME, TOKEN_SYMBOL};
use crate::errors::SaleError;
use crate::events::SaleEvent;
use crate::ledger::{LedgerStore, MemoryLedger};
use crate::pricing::SaleConfig;
use crate::purchase::{execute_purchase, PurchaseReceipt, SaleStore};
use crate::treasury::authorize_withdrawal;

/// Events buffered for slow subscribers before they start lagging
pub const EVENT_CHANNEL_CAPACITY: usize = 1_024;

#[derive(Debug, Clone, Default)]
struct SaleState {
    ledger: MemoryLedger,
    total_sold: U256,
    /// Wei retained from purchases and not yet withdrawn
    treasury: U256,
}

impl LedgerStore for SaleState {
    fn total_supply(&self) -> U256 {
        self.ledger.total_supply()
    }

    fn set_total_supply(&mut self, supply: U256) {
        self.ledger.set_total_supply(supply)
    }

    fn balance_of(&self, account: Address) -> U256 {
        self.ledger.balance_of(account)
    }

    fn set_balance(&mut self, account: Address, amount: U256) {
        self.ledger.set_balance(account, amount)
    }

    fn allowance(&self, owner: Address, spender: Address) -> U256 {
        self.ledger.allowance(owner, spender)
    }

    fn set_allowance(&mut self, owner: Address, spender: Address, amount: U256) {
        self.ledger.set_allowance(owner, spender, amount)
    }

    fn emit(&mut self, event: SaleEvent) {
        self.ledger.emit(event)
    }
}

impl SaleStore for SaleState {
    fn total_sold(&self) -> U256 {
        self.total_sold
    }

    fn set_total_sold(&mut self, sold: U256) {
        self.total_sold = sold;
    }
}

pub struct TokenSale<B: SaleBackend> {
    owner: Address,
    config: SaleConfig,
    backend: Arc<B>,
    state: RwLock<SaleState>,
    events: broadcast::Sender<SaleEvent>,
}

impl<B: SaleBackend> TokenSale<B> {
    /// Mint the supply to `owner` and open the sale at the backend's current time
    pub fn deploy(owner: Address, params: SaleParams, backend: Arc<B>) -> Result<Self, SaleError> {
        let config = SaleConfig::new(
            owner,
            params.initial_supply,
            params.tier1_price,
            params.tier2_price,
            backend.now_unix(),
            params.duration,
        )?;

        let mut state = SaleState::default();
        state.mint(owner, config.supply);
        // Nobody can be subscribed yet
        state.ledger.drain_events();

        let (events, _) = broadcast::channel(EVENT_CHANNEL_CAPACITY);

        Ok(Self {
            owner,
            config,
            backend,
            state: RwLock::new(state),
            events,
        })
    }

    /// Receive every event committed from now on
    pub fn subscribe(&self) -> broadcast::Receiver<SaleEvent> {
        self.events.subscribe()
    }

    pub fn owner(&self) -> Address {
        self.owner
    }

    pub fn config(&self) -> &SaleConfig {
        &self.config
    }

    pub fn name(&self) -> &'static str {
        TOKEN_NAME
    }

    pub fn symbol(&self) -> &'static str {
        TOKEN_SYMBOL
    }

    pub fn decimals(&self) -> u8 {
        TOKEN_DECIMALS
    }

    pub fn total_supply(&self) -> U256 {
        self.state.read().total_supply()
    }

    /// Whole tokens sold so far
    pub fn total_sold(&self) -> U256 {
        self.state.read().total_sold
    }

    pub fn balance_of(&self, account: Address) -> U256 {
        self.state.read().balance_of(account)
    }

    pub fn allowance(&self, owner: Address, spender: Address) -> U256 {
        self.state.read().allowance(owner, spender)
    }

    /// Wei held by the sale
    pub fn treasury_balance(&self) -> U256 {
        self.state.read().treasury
    }

    /// Price the next purchase would pay
    pub fn current_price(&self) -> U256 {
        self.config.price_at(self.state.read().total_sold)
    }

    pub fn tokens_remaining(&self) -> U256 {
        self.config.remaining(self.state.read().total_sold)
    }

    pub fn transfer(&self, caller: Address, to: Address, amount: U256) -> Result<(), SaleError> {
        self.transact(|state| state.transfer(caller, to, amount))
    }

    pub fn approve(&self, caller: Address, spender: Address, amount: U256) -> Result<(), SaleError> {
        self.transact(|state| {
            state.approve(caller, spender, amount);
            Ok(())
        })
    }

    pub fn transfer_from(
        &self,
        caller: Address,
        from: Address,
        to: Address,
        amount: U256,
    ) -> Result<(), SaleError> {
        self.transact(|state| state.transfer_from(caller, from, to, amount))
    }

    /// Buy as many whole tokens as `payment` affords and refund the rest
    pub fn buy_tokens(&self, buyer: Address, payment: U256) -> Result<PurchaseReceipt, SaleError> {
        self.transact(|state| {
            let now = self.backend.now_unix();
            let receipt = execute_purchase(state, &self.config, buyer, payment, now)?;
            state.treasury += receipt.cost;

            // Effects are in place, the refund goes out last
            if !receipt.refund.is_zero() {
                self.backend
                    .send_value(buyer, receipt.refund)
                    .map_err(|_| SaleError::TransferFailed)?;
            }

            Ok(receipt)
        })
    }

    /// Value sent without a call, handled exactly like [`Self::buy_tokens`]
    pub fn pay(&self, buyer: Address, amount: U256) -> Result<PurchaseReceipt, SaleError> {
        self.buy_tokens(buyer, amount)
    }

    /// Send every retained wei to the owner, returns the amount withdrawn
    pub fn withdraw_eth(&self, caller: Address) -> Result<U256, SaleError> {
        self.transact(|state| {
            let withdrawal = authorize_withdrawal(caller, self.owner, state.treasury)?;
            state.treasury = U256::ZERO;
            state.emit(withdrawal.event());

            if !withdrawal.amount.is_zero() {
                self.backend
                    .send_value(withdrawal.owner, withdrawal.amount)
                    .map_err(|_| SaleError::TransferFailed)?;
            }

            Ok(withdrawal.amount)
        })
    }

    fn transact<T, F>(&self, op: F) -> Result<T, SaleError>
    where
        F: FnOnce(&mut SaleState) -> Result<T, SaleError>,
    {
        let mut state = self.state.write();
        let snapshot = state.clone();

        match op(&mut *state) {
            Ok(value) => {
                // Published under the guard so subscribers see commit order
                for event in state.ledger.drain_events() {
                    let _ = self.events.send(event);
                }
                Ok(value)
            }
            Err(err) => {
                *state = snapshot;
                Err(err)
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::backend::LocalBackend;
    use crate::constants::{ONE_TOKEN, TIER1_PRICE_WEI, TIER2_PRICE_WEI};
    use alloy_primitives::address;

    const OWNER: Address = address!("0000000000000000000000000000000000000001");
    const BUYER: Address = address!("0000000000000000000000000000000000000002");

    fn sale() -> (TokenSale<LocalBackend>, Arc<LocalBackend>) {
        let backend = Arc::new(LocalBackend::new());
        let sale = TokenSale::deploy(OWNER, SaleParams::default(), backend.clone()).unwrap();
        (sale, backend)
    }

    #[test]
    fn deploy_mints_to_owner() {
        let (sale, _) = sale();
        let supply = U256::from(1_000) * ONE_TOKEN;
        assert_eq!(sale.total_supply(), supply);
        assert_eq!(sale.balance_of(OWNER), supply);
        assert_eq!(sale.total_sold(), U256::ZERO);
        assert_eq!(sale.decimals(), 18);
        assert_eq!(sale.name(), "Group7Token");
        assert_eq!(sale.symbol(), "G7T");
        assert_eq!(sale.current_price(), TIER1_PRICE_WEI);
        assert_eq!(sale.tokens_remaining(), U256::from(500));

        let config = sale.config();
        assert_eq!(config.seller, sale.owner());
        assert_eq!(config.supply, supply);
        assert_eq!(config.tier1_price, TIER1_PRICE_WEI);
        assert_eq!(config.tier2_price, TIER2_PRICE_WEI);
        assert_eq!(config.tier1_limit, U256::from(250));
        assert_eq!(config.max_sold, U256::from(500));
    }

    #[test]
    fn deploy_rejects_supply_overflow() {
        let params = SaleParams {
            initial_supply: U256::MAX / U256::from(10).pow(U256::from(17)),
            ..SaleParams::default()
        };
        let result = TokenSale::deploy(OWNER, params, Arc::new(LocalBackend::new()));
        assert!(matches!(result, Err(SaleError::SupplyOverflow)));
    }

    #[test]
    fn deploy_rejects_zero_supply() {
        let params = SaleParams {
            initial_supply: U256::ZERO,
            ..SaleParams::default()
        };
        let result = TokenSale::deploy(OWNER, params, Arc::new(LocalBackend::new()));
        assert!(matches!(result, Err(SaleError::ZeroValueArgumentInjected)));
    }

    #[test]
    fn refund_goes_through_the_backend() {
        let (sale, backend) = sale();
        let receipt = sale
            .buy_tokens(BUYER, TIER1_PRICE_WEI + U256::from(7))
            .unwrap();

        assert_eq!(receipt.quantity, U256::from(1));
        assert_eq!(backend.paid_to(BUYER), U256::from(7));
        assert_eq!(sale.treasury_balance(), TIER1_PRICE_WEI);
    }

    #[test]
    fn failed_transfer_leaves_no_events() {
        let (sale, _) = sale();
        let mut events = sale.subscribe();

        assert_eq!(
            sale.transfer(BUYER, OWNER, U256::from(1)),
            Err(SaleError::InsufficientBalance)
        );
        assert!(events.try_recv().is_err());
    }

    #[test]
    fn withdraw_pays_owner() {
        let (sale, backend) = sale();
        sale.buy_tokens(BUYER, TIER1_PRICE_WEI * U256::from(2))
            .unwrap();

        assert_eq!(sale.withdraw_eth(OWNER), Ok(TIER1_PRICE_WEI * U256::from(2)));
        assert_eq!(sale.treasury_balance(), U256::ZERO);
        assert_eq!(backend.paid_to(OWNER), TIER1_PRICE_WEI * U256::from(2));
    }
}
