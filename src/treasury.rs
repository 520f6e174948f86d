//! Owner-only withdrawal of sale proceeds.

use alloy_primitives::{Address, U256};

use crate::errors::SaleError;
use crate::events::SaleEvent;

/// A withdrawal that passed the ownership check and still has to be paid out
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Withdrawal {
    pub owner: Address,
    pub amount: U256,
}

impl Withdrawal {
    pub fn event(&self) -> SaleEvent {
        SaleEvent::EthWithdrawn {
            owner: self.owner,
            amount: self.amount,
        }
    }
}

/// Withdrawals always take the full balance
pub fn authorize_withdrawal(
    caller: Address,
    owner: Address,
    balance: U256,
) -> Result<Withdrawal, SaleError> {
    if caller != owner {
        return Err(SaleError::NotOwner);
    }

    Ok(Withdrawal {
        owner,
        amount: balance,
    })
}
