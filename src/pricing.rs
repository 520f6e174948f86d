//! Tiered pricing, cap and deadline rules of the sale.

use alloy_primitives::{Address, U256};

use crate::constants::{MAX_SOLD_DIVISOR, ONE_TOKEN, TIER1_LIMIT_DIVISOR};
use crate::errors::SaleError;

/// Immutable sale parameters fixed at initialization
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SaleConfig {
    /// Account whose balance supplies the tokens being sold
    pub seller: Address,
    /// Base units minted at initialization
    pub supply: U256,
    pub tier1_price: U256,
    pub tier2_price: U256,
    /// Whole tokens sold at tier-1 prices before switching to tier-2
    pub tier1_limit: U256,
    /// Whole tokens the sale may ever sell
    pub max_sold: U256,
    /// Unix timestamp, purchases at or after it are rejected
    pub deadline: u64,
}

/// Outcome of pricing one payment
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Quote {
    pub unit_price: U256,
    /// Whole tokens
    pub quantity: U256,
    pub cost: U256,
    pub refund: U256,
}

impl SaleConfig {
    /// Derive the sale from the initial supply (in whole tokens)
    ///
    /// # Arguments
    ///
    /// * `seller` - The account holding the supply, normally the owner
    /// * `initial_supply` - Whole tokens minted at initialization
    /// * `tier1_price` / `tier2_price` - Wei per whole token in each tier
    /// * `started_at` - Initialization timestamp
    /// * `duration` - Seconds the sale stays open
    pub fn new(
        seller: Address,
        initial_supply: U256,
        tier1_price: U256,
        tier2_price: U256,
        started_at: u64,
        duration: u64,
    ) -> Result<Self, SaleError> {
        if initial_supply.is_zero() || tier1_price.is_zero() || tier2_price.is_zero() {
            return Err(SaleError::ZeroValueArgumentInjected);
        }

        let supply = initial_supply
            .checked_mul(ONE_TOKEN)
            .ok_or(SaleError::SupplyOverflow)?;

        Ok(Self {
            seller,
            supply,
            tier1_price,
            tier2_price,
            tier1_limit: initial_supply / U256::from(TIER1_LIMIT_DIVISOR),
            max_sold: initial_supply / U256::from(MAX_SOLD_DIVISOR),
            deadline: started_at.saturating_add(duration),
        })
    }

    /// Price the next purchase pays given how much has already been sold
    pub fn price_at(&self, total_sold: U256) -> U256 {
        if total_sold < self.tier1_limit {
            self.tier1_price
        } else {
            self.tier2_price
        }
    }

    pub fn remaining(&self, total_sold: U256) -> U256 {
        self.max_sold.saturating_sub(total_sold)
    }

    /// Work out what `payment` buys at `now`
    ///
    /// The whole purchase is priced at the tier active before it, even if it
    /// crosses the tier-1 limit. Purchases larger than the remaining cap are
    /// filled up to the cap and the rest is refunded.
    pub fn quote(&self, total_sold: U256, payment: U256, now: u64) -> Result<Quote, SaleError> {
        if now >= self.deadline {
            return Err(SaleError::SaleEnded);
        }

        if total_sold >= self.max_sold {
            return Err(SaleError::SupplyExhausted);
        }

        let unit_price = self.price_at(total_sold);
        let affordable = payment / unit_price;
        if affordable.is_zero() {
            return Err(SaleError::InsufficientPayment);
        }

        let quantity = affordable.min(self.max_sold - total_sold);
        let cost = quantity * unit_price;

        Ok(Quote {
            unit_price,
            quantity,
            cost,
            refund: payment - cost,
        })
    }
}
