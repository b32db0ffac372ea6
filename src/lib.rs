//! # Multicaller
//!
//! Batch read-only contract calls described by compact signature strings into a single
//! Multicall3 round trip.
//!
//! Methods are registered as `function balanceOf(address)(uint256)` or `balanceOf(address)uint256`,
//! compiled into a JSON ABI, encoded per call and decoded per label once the batch has executed.

pub mod abi;
pub mod aggregator;
pub mod batch;
pub mod config;
pub mod constants;
pub mod contract;
pub mod error;
pub mod registry;
pub mod signature;

pub use aggregator::{Aggregator, Multicall3Aggregator};
pub use config::MulticallConfig;
pub use contract::{CallOutput, Contract, ContractBuilder};
pub use registry::MethodRegistry;
