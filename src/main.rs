#![cfg_attr(not(any(test, feature = "export-abi")), no_main)]

// With `no_main` a plain host build of this bin has no entry symbol to link
// against, the empty export gives it one. The wasm contract never calls it.
#[cfg(not(any(test, feature = "export-abi")))]
#[no_mangle]
pub extern "C" fn main() {}

#[cfg(feature = "export-abi")]
fn main() {
    stylus_tiered_token_sale::print_abi("MIT-OR-APACHE-2.0", "pragma solidity ^0.8.23;");
}
