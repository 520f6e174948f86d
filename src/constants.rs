use alloy_primitives::{uint, U256};

pub const TOKEN_NAME: &str = "Group7Token";

pub const TOKEN_SYMBOL: &str = "G7T";

/// Fractional decimal places of the token
pub const TOKEN_DECIMALS: u8 = 18;

/// One whole token expressed in base units (10^18)
pub const ONE_TOKEN: U256 = uint!(1_000_000_000_000_000_000_U256);

/// Tier-1 price per whole token: 5 ETH in wei
pub const TIER1_PRICE_WEI: U256 = uint!(5_000_000_000_000_000_000_U256);

/// Tier-2 price per whole token: 10 ETH in wei
pub const TIER2_PRICE_WEI: U256 = uint!(10_000_000_000_000_000_000_U256);

/// Tier-1 pricing applies to the first quarter of the supply
pub const TIER1_LIMIT_DIVISOR: u64 = 4;

/// At most half of the supply can be sold
pub const MAX_SOLD_DIVISOR: u64 = 2;

/// 30 days defined in seconds, the sale closes this long after initialization
pub const SALE_DURATION_SECS: u64 = 2_592_000;
