//! Balance and allowance bookkeeping.
//!
//! [`LedgerStore`] only asks for raw storage access, the ERC-20 rules live in its
//! provided methods so the Stylus storage and [`MemoryLedger`] behave identically.

use std::collections::HashMap;

use alloy_primitives::{Address, U256};

use crate::errors::SaleError;
use crate::events::SaleEvent;

pub trait LedgerStore {
    fn total_supply(&self) -> U256;
    fn set_total_supply(&mut self, supply: U256);
    fn balance_of(&self, account: Address) -> U256;
    fn set_balance(&mut self, account: Address, amount: U256);
    fn allowance(&self, owner: Address, spender: Address) -> U256;
    fn set_allowance(&mut self, owner: Address, spender: Address, amount: U256);
    fn emit(&mut self, event: SaleEvent);

    /// Create `amount` base units for `to`, only used when the supply is first issued
    fn mint(&mut self, to: Address, amount: U256) {
        let supply = self.total_supply();
        self.set_total_supply(supply + amount);
        let balance = self.balance_of(to);
        self.set_balance(to, balance + amount);

        self.emit(SaleEvent::Transfer {
            from: Address::ZERO,
            to,
            value: amount,
        });
    }

    /// Move `amount` base units, nothing is written when the sender is short
    fn transfer(&mut self, from: Address, to: Address, amount: U256) -> Result<(), SaleError> {
        let from_balance = self.balance_of(from);
        if from_balance < amount {
            return Err(SaleError::InsufficientBalance);
        }

        self.set_balance(from, from_balance - amount);
        // Read after the debit so a self-transfer nets to zero
        let to_balance = self.balance_of(to);
        self.set_balance(to, to_balance + amount);

        self.emit(SaleEvent::Transfer {
            from,
            to,
            value: amount,
        });

        Ok(())
    }

    /// Overwrites any previous allowance
    fn approve(&mut self, owner: Address, spender: Address, amount: U256) {
        self.set_allowance(owner, spender, amount);
        self.emit(SaleEvent::Approval {
            owner,
            spender,
            value: amount,
        });
    }

    fn transfer_from(
        &mut self,
        spender: Address,
        from: Address,
        to: Address,
        amount: U256,
    ) -> Result<(), SaleError> {
        let allowance = self.allowance(from, spender);
        if allowance < amount {
            return Err(SaleError::InsufficientAllowance);
        }

        // Check the balance before touching the allowance
        if self.balance_of(from) < amount {
            return Err(SaleError::InsufficientBalance);
        }

        self.set_allowance(from, spender, allowance - amount);
        self.transfer(from, to, amount)
    }
}

/// Heap-backed ledger used by the host service
#[derive(Debug, Clone, Default)]
pub struct MemoryLedger {
    total_supply: U256,
    balances: HashMap<Address, U256>,
    allowances: HashMap<(Address, Address), U256>,
    pending_events: Vec<SaleEvent>,
}

impl MemoryLedger {
    pub fn new() -> Self {
        Self::default()
    }

    /// Events emitted since the last drain, in order
    pub fn drain_events(&mut self) -> Vec<SaleEvent> {
        std::mem::take(&mut self.pending_events)
    }

    /// Sum over every stored balance
    pub fn circulating(&self) -> U256 {
        self.balances
            .values()
            .fold(U256::ZERO, |sum, balance| sum + *balance)
    }
}

impl LedgerStore for MemoryLedger {
    fn total_supply(&self) -> U256 {
        self.total_supply
    }

    fn set_total_supply(&mut self, supply: U256) {
        self.total_supply = supply;
    }

    fn balance_of(&self, account: Address) -> U256 {
        self.balances.get(&account).copied().unwrap_or_default()
    }

    fn set_balance(&mut self, account: Address, amount: U256) {
        if amount.is_zero() {
            self.balances.remove(&account);
        } else {
            self.balances.insert(account, amount);
        }
    }

    fn allowance(&self, owner: Address, spender: Address) -> U256 {
        self.allowances
            .get(&(owner, spender))
            .copied()
            .unwrap_or_default()
    }

    fn set_allowance(&mut self, owner: Address, spender: Address, amount: U256) {
        if amount.is_zero() {
            self.allowances.remove(&(owner, spender));
        } else {
            self.allowances.insert((owner, spender), amount);
        }
    }

    fn emit(&mut self, event: SaleEvent) {
        self.pending_events.push(event);
    }
}
