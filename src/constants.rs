//! Multicaller constants.

use alloy::primitives::{Address, address};

/// Standard Multicall3 deployment address (same across all chains).
///
/// See <https://github.com/mds1/multicall#multicall3-contract-addresses>
pub const MULTICALL3_ADDRESS: Address = address!("cA11bde05977b3631167028862bE2a173976CA11");
