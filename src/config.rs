//! Parameters for running the sale as a host service.

use std::str::FromStr;

use alloy_primitives::U256;

use crate::constants::{SALE_DURATION_SECS, TIER1_PRICE_WEI, TIER2_PRICE_WEI};

pub const ENV_INITIAL_SUPPLY: &str = "SALE_INITIAL_SUPPLY";
pub const ENV_TIER1_PRICE: &str = "SALE_TIER1_PRICE_WEI";
pub const ENV_TIER2_PRICE: &str = "SALE_TIER2_PRICE_WEI";
pub const ENV_DURATION: &str = "SALE_DURATION_SECS";

/// Supply used when nothing is configured, in whole tokens
pub const DEFAULT_INITIAL_SUPPLY: u64 = 1_000;

#[derive(Debug, thiserror::Error, PartialEq, Eq)]
pub enum ConfigError {
    #[error("{key} has an invalid value {value:?}")]
    InvalidValue { key: &'static str, value: String },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SaleParams {
    /// Whole tokens minted to the owner
    pub initial_supply: U256,
    pub tier1_price: U256,
    pub tier2_price: U256,
    /// Seconds the sale stays open
    pub duration: u64,
}

impl Default for SaleParams {
    fn default() -> Self {
        Self {
            initial_supply: U256::from(DEFAULT_INITIAL_SUPPLY),
            tier1_price: TIER1_PRICE_WEI,
            tier2_price: TIER2_PRICE_WEI,
            duration: SALE_DURATION_SECS,
        }
    }
}

impl SaleParams {
    /// Load overrides from the process environment, reading `.env` first if present
    pub fn from_env() -> Result<Self, ConfigError> {
        dotenv::dotenv().ok();
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Build parameters from any key lookup, unset keys keep their default
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let defaults = Self::default();

        Ok(Self {
            initial_supply: parse_or(&lookup, ENV_INITIAL_SUPPLY, defaults.initial_supply)?,
            tier1_price: parse_or(&lookup, ENV_TIER1_PRICE, defaults.tier1_price)?,
            tier2_price: parse_or(&lookup, ENV_TIER2_PRICE, defaults.tier2_price)?,
            duration: parse_or(&lookup, ENV_DURATION, defaults.duration)?,
        })
    }
}

fn parse_or<F, T>(lookup: &F, key: &'static str, default: T) -> Result<T, ConfigError>
where
    F: Fn(&str) -> Option<String>,
    T: FromStr,
{
    match lookup(key) {
        None => Ok(default),
        Some(raw) => raw
            .trim()
            .parse()
            .map_err(|_| ConfigError::InvalidValue { key, value: raw }),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn lookup(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let vars: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |key: &str| vars.get(key).cloned()
    }

    #[test]
    fn defaults_match_the_campaign() {
        let params = SaleParams::from_lookup(lookup(&[])).unwrap();
        assert_eq!(params, SaleParams::default());
        assert_eq!(params.initial_supply, U256::from(1_000));
        assert_eq!(params.duration, 30 * 24 * 60 * 60);
    }

    #[test]
    fn overrides_are_parsed() {
        let params = SaleParams::from_lookup(lookup(&[
            (ENV_INITIAL_SUPPLY, "40"),
            (ENV_TIER1_PRICE, "100"),
            (ENV_TIER2_PRICE, " 200 "),
            (ENV_DURATION, "60"),
        ]))
        .unwrap();

        assert_eq!(params.initial_supply, U256::from(40));
        assert_eq!(params.tier1_price, U256::from(100));
        assert_eq!(params.tier2_price, U256::from(200));
        assert_eq!(params.duration, 60);
    }

    #[test]
    fn garbage_is_reported_with_its_key() {
        let err = SaleParams::from_lookup(lookup(&[(ENV_DURATION, "soon")])).unwrap_err();
        assert_eq!(
            err,
            ConfigError::InvalidValue {
                key: ENV_DURATION,
                value: "soon".to_string(),
            }
        );
    }
}
