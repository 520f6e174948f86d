//! Failure reasons shared by the contract and the host service.
//!
//! [`SaleError`] is what the core returns. On-chain every variant is mapped to a
//! Solidity custom error so reverts carry a stable selector.

use alloy_sol_types::sol;
use stylus_sdk::prelude::*;

sol! {
    error InsufficientBalance();
    error InsufficientAllowance();
    error SaleEnded();
    error SupplyExhausted();
    error InsufficientPayment();
    error NotOwner();
    error TransferFailed();
    error NotInitialized();
    error AlreadyInitialized();
    error ZeroValueArgumentInjected();
    error SupplyOverflow();
}

/// Exporting Solidity errors defined in sol! as Rust enums
#[derive(SolidityError)]
pub enum Errors {
    InsufficientBalance(InsufficientBalance),
    InsufficientAllowance(InsufficientAllowance),
    SaleEnded(SaleEnded),
    SupplyExhausted(SupplyExhausted),
    InsufficientPayment(InsufficientPayment),
    NotOwner(NotOwner),
    TransferFailed(TransferFailed),
    NotInitialized(NotInitialized),
    AlreadyInitialized(AlreadyInitialized),
    ZeroValueArgumentInjected(ZeroValueArgumentInjected),
    SupplyOverflow(SupplyOverflow),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, thiserror::Error)]
pub enum SaleError {
    #[error("insufficient balance")]
    InsufficientBalance,
    #[error("insufficient allowance")]
    InsufficientAllowance,
    #[error("sale ended")]
    SaleEnded,
    #[error("all tokens sold")]
    SupplyExhausted,
    #[error("insufficient ETH sent")]
    InsufficientPayment,
    #[error("caller is not the owner")]
    NotOwner,
    #[error("value transfer failed")]
    TransferFailed,
    #[error("sale not initialized")]
    NotInitialized,
    #[error("sale already initialized")]
    AlreadyInitialized,
    #[error("zero value argument")]
    ZeroValueArgumentInjected,
    #[error("initial supply does not fit in base units")]
    SupplyOverflow,
}

impl From<SaleError> for Errors {
    fn from(err: SaleError) -> Self {
        match err {
            SaleError::InsufficientBalance => Errors::InsufficientBalance(InsufficientBalance {}),
            SaleError::InsufficientAllowance => {
                Errors::InsufficientAllowance(InsufficientAllowance {})
            }
            SaleError::SaleEnded => Errors::SaleEnded(SaleEnded {}),
            SaleError::SupplyExhausted => Errors::SupplyExhausted(SupplyExhausted {}),
            SaleError::InsufficientPayment => Errors::InsufficientPayment(InsufficientPayment {}),
            SaleError::NotOwner => Errors::NotOwner(NotOwner {}),
            SaleError::TransferFailed => Errors::TransferFailed(TransferFailed {}),
            SaleError::NotInitialized => Errors::NotInitialized(NotInitialized {}),
            SaleError::AlreadyInitialized => Errors::AlreadyInitialized(AlreadyInitialized {}),
            SaleError::ZeroValueArgumentInjected => {
                Errors::ZeroValueArgumentInjected(ZeroValueArgumentInjected {})
            }
            SaleError::SupplyOverflow => Errors::SupplyOverflow(SupplyOverflow {}),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use alloy_sol_types::SolError;

    #[test]
    fn revert_data_starts_with_the_solidity_selector() {
        let data: Vec<u8> = Errors::from(SaleError::SaleEnded).into();
        assert_eq!(&data[..4], &SaleEnded::SELECTOR[..]);

        let data: Vec<u8> = Errors::from(SaleError::NotOwner).into();
        assert_eq!(&data[..4], &NotOwner::SELECTOR[..]);
    }

    #[test]
    fn messages_match_the_revert_reasons() {
        assert_eq!(SaleError::SupplyExhausted.to_string(), "all tokens sold");
        assert_eq!(SaleError::InsufficientPayment.to_string(), "insufficient ETH sent");
        assert_eq!(SaleError::SaleEnded.to_string(), "sale ended");
    }
}
