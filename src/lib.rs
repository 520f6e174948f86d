//! Fixed-supply ERC-20 token with a built-in, time-boxed sale priced in tiers.
//! The first quarter of the supply sells at the tier-1 price, the next quarter at the tier-2 price, and the sale
//! closes once half of the supply is sold or 30 days after initialization, whichever comes first.
//! Payments buy whole tokens only, any remainder is refunded in the same transaction.
//! The program is ABI-equivalent with Solidity, which means you can call it from both Solidity and Rust. To do this, run `cargo stylus export-abi`.
//!
//! The ledger, pricing, purchase and treasury rules are plain Rust shared with [`service::TokenSale`], a thread-safe
//! host rendition of the same contract.

// Allow `cargo stylus export-abi` to generate a main function.
#![cfg_attr(not(any(test, feature = "export-abi")), no_main)]

extern crate alloc;

pub mod constants;
pub mod errors;
pub mod events;
pub mod ledger;
pub mod pricing;
pub mod purchase;
pub mod treasury;

#[cfg(not(target_arch = "wasm32"))]
pub mod backend;
#[cfg(not(target_arch = "wasm32"))]
pub mod config;
#[cfg(not(target_arch = "wasm32"))]
pub mod service;

#[cfg(target_arch = "wasm32")]
#[global_allocator]
static ALLOC: mini_alloc::MiniAlloc = mini_alloc::MiniAlloc::INIT;

use alloc::string::String;
use alloc::vec::Vec;
use alloy_sol_types::sol; // Define events
use stylus_sdk::{
    alloy_primitives::{Address, U256},
    prelude::*,          // Contains common traits and macros, `self.vm()` included
    stylus_core::log     // Events
};

use crate::constants::{
    ONE_TOKEN, SALE_DURATION_SECS, TIER1_PRICE_WEI, TIER2_PRICE_WEI, TOKEN_DECIMALS, TOKEN_NAME,
    TOKEN_SYMBOL,
};
use crate::errors::{Errors, SaleError};
use crate::events::SaleEvent;
use crate::ledger::LedgerStore;
use crate::pricing::SaleConfig;
use crate::purchase::{execute_purchase, SaleStore};
use crate::treasury::authorize_withdrawal;

// Define some persistent storage using the Solidity ABI.
// `TieredTokenSale` will be the entrypoint.
sol_storage! {
    #[entrypoint]
    pub struct TieredTokenSale {
        bool initialized;                                               // Required before the sale opens
        address owner;                                                  // Receives the supply and the proceeds
        uint256 total_supply;                                           // Base units in existence
        mapping(address => uint256) balances;                           // Base-unit balance per account
        mapping(address => mapping(address => uint256)) allowances;     // owner => spender => base units
        uint256 tier1_price;                                            // Wei per whole token below the tier-1 limit
        uint256 tier2_price;                                            // Wei per whole token from the tier-1 limit on
        uint256 tier1_limit;                                            // Whole tokens sold at the tier-1 price
        uint256 max_sold;                                               // Whole tokens the sale may sell
        uint256 sale_deadline;                                          // Timestamp at which purchases stop
        uint256 total_sold;                                             // Whole tokens sold so far
    }
}

// Declare events
sol! {
    event Transfer(address indexed from, address indexed to, uint256 value);
    event Approval(address indexed owner, address indexed spender, uint256 value);
    event TokensPurchased(address indexed buyer, uint256 quantity, uint256 unit_price, uint256 refund);
    event EthWithdrawn(address indexed owner, uint256 amount);
}

/// External methods for `TieredTokenSale`
#[public]
impl TieredTokenSale {

    /// Initialize the token and open the sale
    ///
    /// # Arguments
    ///
    /// * `initial_supply` - Whole tokens minted to the caller, who becomes the owner
    pub fn init(&mut self, initial_supply: U256) -> Result<(), Errors> {
        self.validate_initialization()?;

        let owner = self.vm().msg_sender();
        let config = SaleConfig::new(
            owner,
            initial_supply,
            TIER1_PRICE_WEI,
            TIER2_PRICE_WEI,
            self.vm().block_timestamp(),
            SALE_DURATION_SECS,
        )?;

        // Setup the smart contract by configuring storage
        self.initialized.set(true);
        self.owner.set(owner);
        self.tier1_price.set(config.tier1_price);
        self.tier2_price.set(config.tier2_price);
        self.tier1_limit.set(config.tier1_limit);
        self.max_sold.set(config.max_sold);
        self.sale_deadline.set(U256::from(config.deadline));

        LedgerStore::mint(self, owner, config.supply);

        Ok(())
    }

    pub fn name(&self) -> String {
        TOKEN_NAME.into()
    }

    pub fn symbol(&self) -> String {
        TOKEN_SYMBOL.into()
    }

    pub fn decimals(&self) -> u8 {
        TOKEN_DECIMALS
    }

    pub fn total_supply(&self) -> U256 {
        self.total_supply.get()
    }

    /// Whole tokens sold through the sale
    pub fn total_sold(&self) -> U256 {
        self.total_sold.get()
    }

    /// Tokens sold through the sale in base units
    pub fn total_sold_base_units(&self) -> U256 {
        self.total_sold.get() * ONE_TOKEN
    }

    pub fn balance_of(&self, account: Address) -> U256 {
        self.balances.get(account)
    }

    pub fn allowance(&self, owner: Address, spender: Address) -> U256 {
        self.allowances.getter(owner).get(spender)
    }

    pub fn owner(&self) -> Address {
        self.owner.get()
    }

    pub fn sale_deadline(&self) -> U256 {
        self.sale_deadline.get()
    }

    /// Wei per whole token the next purchase would pay
    pub fn current_price(&self) -> Result<U256, Errors> {
        let config = self.sale_config()?;
        Ok(config.price_at(self.total_sold.get()))
    }

    /// Whole tokens still available before the cap is reached
    pub fn tokens_remaining(&self) -> Result<U256, Errors> {
        let config = self.sale_config()?;
        Ok(config.remaining(self.total_sold.get()))
    }

    pub fn transfer(&mut self, to: Address, value: U256) -> Result<bool, Errors> {
        let caller = self.vm().msg_sender();
        LedgerStore::transfer(self, caller, to, value)?;
        Ok(true)
    }

    pub fn approve(&mut self, spender: Address, value: U256) -> Result<bool, Errors> {
        let caller = self.vm().msg_sender();
        LedgerStore::approve(self, caller, spender, value);
        Ok(true)
    }

    pub fn transfer_from(&mut self, from: Address, to: Address, value: U256) -> Result<bool, Errors> {
        let caller = self.vm().msg_sender();
        LedgerStore::transfer_from(self, caller, from, to, value)?;
        Ok(true)
    }

    /// Main entry point for users to buy tokens with the attached ETH
    #[payable]
    pub fn buy_tokens(&mut self) -> Result<(), Errors> {
        let (buyer, payment) = (self.vm().msg_sender(), self.vm().msg_value());
        self.purchase(buyer, payment)
    }

    /// Plain ETH transfers buy tokens too
    #[receive]
    #[payable]
    pub fn receive(&mut self) -> Result<(), Vec<u8>> {
        let (buyer, payment) = (self.vm().msg_sender(), self.vm().msg_value());
        self.purchase(buyer, payment).map_err(Into::into)
    }

    /// Send the whole ETH balance of the contract to the owner
    #[selector(name = "withdrawETH")]
    pub fn withdraw_eth(&mut self) -> Result<(), Errors> {
        self.validate_is_initialized()?;

        let balance = self.vm().balance(self.vm().contract_address());
        let withdrawal = authorize_withdrawal(self.vm().msg_sender(), self.owner.get(), balance)?;
        LedgerStore::emit(self, withdrawal.event());

        if !withdrawal.amount.is_zero() {
            self.vm().transfer_eth(withdrawal.owner, withdrawal.amount)
                .map_err(|_| Errors::from(SaleError::TransferFailed))?;
        }

        Ok(())
    }
}

// Internal methods for `TieredTokenSale`
impl TieredTokenSale {
    /// Function ensuring we are initialized
    pub fn validate_is_initialized(&self) -> Result<(), SaleError> {
        if !self.initialized.get() {
            return Err(SaleError::NotInitialized)
        }

        Ok(())
    }

    /// Function ensuring we are not already initialized
    pub fn validate_initialization(&self) -> Result<(), SaleError> {
        if self.initialized.get() {
            return Err(SaleError::AlreadyInitialized)
        }

        Ok(())
    }

    /// Rebuild the sale parameters written by `init`
    pub fn sale_config(&self) -> Result<SaleConfig, SaleError> {
        self.validate_is_initialized()?;

        Ok(SaleConfig {
            seller: self.owner.get(),
            supply: self.total_supply.get(),
            tier1_price: self.tier1_price.get(),
            tier2_price: self.tier2_price.get(),
            tier1_limit: self.tier1_limit.get(),
            max_sold: self.max_sold.get(),
            deadline: u64::try_from(self.sale_deadline.get()).unwrap_or(u64::MAX),
        })
    }

    /// Shared by `buy_tokens` and plain transfers
    ///
    /// # Arguments
    ///
    /// * `buyer` - The account paying and receiving tokens
    /// * `payment` - Wei attached to the call, already part of the contract balance
    fn purchase(&mut self, buyer: Address, payment: U256) -> Result<(), Errors> {
        let config = self.sale_config()?;
        let now = self.vm().block_timestamp();
        let receipt = execute_purchase(self, &config, buyer, payment, now)?;

        // Every storage write is done, the refund is the last thing that happens
        if !receipt.refund.is_zero() {
            self.vm().transfer_eth(buyer, receipt.refund)
                .map_err(|_| Errors::from(SaleError::TransferFailed))?;
        }

        Ok(())
    }
}

impl LedgerStore for TieredTokenSale {
    fn total_supply(&self) -> U256 {
        self.total_supply.get()
    }

    fn set_total_supply(&mut self, supply: U256) {
        self.total_supply.set(supply);
    }

    fn balance_of(&self, account: Address) -> U256 {
        self.balances.get(account)
    }

    fn set_balance(&mut self, account: Address, amount: U256) {
        self.balances.insert(account, amount);
    }

    fn allowance(&self, owner: Address, spender: Address) -> U256 {
        self.allowances.getter(owner).get(spender)
    }

    fn set_allowance(&mut self, owner: Address, spender: Address, amount: U256) {
        self.allowances.setter(owner).insert(spender, amount);
    }

    fn emit(&mut self, event: SaleEvent) {
        let vm = self.vm();
        match event {
            SaleEvent::Transfer { from, to, value } => log(vm, Transfer { from, to, value }),
            SaleEvent::Approval { owner, spender, value } => {
                log(vm, Approval { owner, spender, value })
            }
            SaleEvent::TokensPurchased { buyer, quantity, unit_price, refund } => {
                log(vm, TokensPurchased { buyer, quantity, unit_price, refund })
            }
            SaleEvent::EthWithdrawn { owner, amount } => log(vm, EthWithdrawn { owner, amount }),
        }
    }
}

impl SaleStore for TieredTokenSale {
    fn total_sold(&self) -> U256 {
        self.total_sold.get()
    }

    fn set_total_sold(&mut self, sold: U256) {
        self.total_sold.set(sold);
    }
}
