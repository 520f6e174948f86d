use alloy_primitives::{Address, U256};

/// State changes announced by the ledger, the sale and the treasury.
///
/// The contract turns these into EVM logs, the host service publishes them to
/// subscribers once the operation that produced them has committed.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SaleEvent {
    Transfer {
        from: Address,
        to: Address,
        value: U256,
    },
    Approval {
        owner: Address,
        spender: Address,
        value: U256,
    },
    /// `quantity` is in whole tokens
    TokensPurchased {
        buyer: Address,
        quantity: U256,
        unit_price: U256,
        refund: U256,
    },
    EthWithdrawn {
        owner: Address,
        amount: U256,
    },
}
