//! Time and value movement for the host service.

use std::collections::HashMap;
use std::time::{SystemTime, UNIX_EPOCH};

use alloy_primitives::{Address, U256};
use parking_lot::Mutex;

/// Everything the service needs from its environment.
/// All native-currency side effects go through this trait.
pub trait SaleBackend: Send + Sync + 'static {
    /// Current unix time in seconds
    fn now_unix(&self) -> u64;

    /// Pay `amount` wei out of the sale to `to`
    fn send_value(&self, to: Address, amount: U256) -> Result<(), BackendError>;
}

#[derive(Debug, thiserror::Error)]
pub enum BackendError {
    #[error("recipient {0} rejected the transfer")]
    Rejected(Address),
    #[error("backend failure: {0}")]
    Other(String),
}

/// System clock plus an in-memory book of what has been paid out
#[derive(Debug, Default)]
pub struct LocalBackend {
    payouts: Mutex<HashMap<Address, U256>>,
}

impl LocalBackend {
    pub fn new() -> Self {
        Self::default()
    }

    /// Total wei paid out to `account` so far
    pub fn paid_to(&self, account: Address) -> U256 {
        self.payouts
            .lock()
            .get(&account)
            .copied()
            .unwrap_or_default()
    }
}

impl SaleBackend for LocalBackend {
    fn now_unix(&self) -> u64 {
        SystemTime::now()
            .duration_since(UNIX_EPOCH)
            .map(|elapsed| elapsed.as_secs())
            .unwrap_or_default()
    }

    fn send_value(&self, to: Address, amount: U256) -> Result<(), BackendError> {
        let mut payouts = self.payouts.lock();
        let paid = payouts.entry(to).or_default();
        *paid = paid
            .checked_add(amount)
            .ok_or_else(|| BackendError::Other("payout overflow".into()))?;
        Ok(())
    }
}
