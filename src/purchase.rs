//! Sequencing of a single purchase.
//!
//! [`execute_purchase`] applies every effect of a purchase (sold counter, token
//! delivery, event) and hands back the refund the caller still owes the buyer.
//! Sending that refund is left to the front-end and must happen last, after all
//! state has been written.

use alloy_primitives::{Address, U256};

use crate::constants::ONE_TOKEN;
use crate::errors::SaleError;
use crate::events::SaleEvent;
use crate::ledger::LedgerStore;
use crate::pricing::SaleConfig;

/// Storage able to host the sale on top of the ledger
pub trait SaleStore: LedgerStore {
    /// Whole tokens sold so far
    fn total_sold(&self) -> U256;
    fn set_total_sold(&mut self, sold: U256);
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PurchaseReceipt {
    pub buyer: Address,
    pub unit_price: U256,
    /// Whole tokens credited to the buyer
    pub quantity: U256,
    /// Wei retained by the sale
    pub cost: U256,
    /// Wei owed back to the buyer
    pub refund: U256,
}

/// Price `payment`, record the sale and deliver tokens from the seller to `buyer`
///
/// On error the store may hold partial writes, callers run this inside a
/// transaction they can roll back.
pub fn execute_purchase<S: SaleStore + ?Sized>(
    store: &mut S,
    config: &SaleConfig,
    buyer: Address,
    payment: U256,
    now: u64,
) -> Result<PurchaseReceipt, SaleError> {
    let total_sold = store.total_sold();
    let quote = config.quote(total_sold, payment, now)?;

    store.set_total_sold(total_sold + quote.quantity);
    store.transfer(config.seller, buyer, quote.quantity * ONE_TOKEN)?;

    store.emit(SaleEvent::TokensPurchased {
        buyer,
        quantity: quote.quantity,
        unit_price: quote.unit_price,
        refund: quote.refund,
    });

    Ok(PurchaseReceipt {
        buyer,
        unit_price: quote.unit_price,
        quantity: quote.quantity,
        cost: quote.cost,
        refund: quote.refund,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::constants::{SALE_DURATION_SECS, TIER1_PRICE_WEI, TIER2_PRICE_WEI};
    use crate::ledger::MemoryLedger;
    use alloy_primitives::address;

    const OWNER: Address = address!("0000000000000000000000000000000000000001");
    const BUYER: Address = address!("0000000000000000000000000000000000000002");

    #[derive(Default)]
    struct Store {
        ledger: MemoryLedger,
        sold: U256,
    }

    impl LedgerStore for Store {
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

    impl SaleStore for Store {
        fn total_sold(&self) -> U256 {
            self.sold
        }
        fn set_total_sold(&mut self, sold: U256) {
            self.sold = sold;
        }
    }

    fn setup() -> (Store, SaleConfig) {
        let mut store = Store::default();
        store.mint(OWNER, U256::from(1_000) * ONE_TOKEN);
        store.ledger.drain_events();
        let config = SaleConfig::new(
            OWNER,
            U256::from(1_000),
            TIER1_PRICE_WEI,
            TIER2_PRICE_WEI,
            0,
            SALE_DURATION_SECS,
        )
        .unwrap();
        (store, config)
    }

    #[test]
    fn delivers_whole_tokens_from_the_seller() {
        let (mut store, config) = setup();
        let payment = TIER1_PRICE_WEI * U256::from(3);

        let receipt = execute_purchase(&mut store, &config, BUYER, payment, 10).unwrap();

        assert_eq!(receipt.quantity, U256::from(3));
        assert_eq!(receipt.cost, payment);
        assert_eq!(receipt.refund, U256::ZERO);
        assert_eq!(store.sold, U256::from(3));
        assert_eq!(store.balance_of(BUYER), U256::from(3) * ONE_TOKEN);
        assert_eq!(store.balance_of(OWNER), U256::from(997) * ONE_TOKEN);

        let events = store.ledger.drain_events();
        assert_eq!(events.len(), 2);
        assert_eq!(
            events[1],
            SaleEvent::TokensPurchased {
                buyer: BUYER,
                quantity: U256::from(3),
                unit_price: TIER1_PRICE_WEI,
                refund: U256::ZERO,
            }
        );
    }

    #[test]
    fn rejected_quote_writes_nothing() {
        let (mut store, config) = setup();
        let result = execute_purchase(&mut store, &config, BUYER, U256::from(1), 10);

        assert_eq!(result, Err(SaleError::InsufficientPayment));
        assert_eq!(store.sold, U256::ZERO);
        assert_eq!(store.balance_of(BUYER), U256::ZERO);
        assert!(store.ledger.drain_events().is_empty());
    }

    #[test]
    fn seller_without_stock_fails_the_purchase() {
        let (mut store, config) = setup();
        store
            .transfer(OWNER, BUYER, U256::from(999) * ONE_TOKEN)
            .unwrap();

        let result = execute_purchase(
            &mut store,
            &config,
            BUYER,
            TIER1_PRICE_WEI * U256::from(2),
            10,
        );
        assert_eq!(result, Err(SaleError::InsufficientBalance));
    }
}
