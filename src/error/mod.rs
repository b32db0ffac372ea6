//! Multicaller error types.
//!
//! Construction, registration and call-building failures are reported as [`ContractError`] and
//! leave the session untouched. Execution failures are [`ExecutionError`]s and are expected to be
//! retried by the caller. Failures of individual calls within a batch are [`CallError`]s stored
//! next to the other results.
use thiserror::Error;

mod aggregate;
pub use aggregate::{AggregateError, CallError};

mod registry;
pub use registry::RegistryError;

mod signature;
pub use signature::SignatureError;

/// Errors raised while configuring a session or adding calls to it.
#[derive(Debug, Error)]
pub enum ContractError {
    /// No provider was attached before building.
    #[error("a provider is required to build a contract session")]
    MissingProvider,
    /// The aggregator address could not be parsed.
    #[error("invalid address `{address}`: {source}")]
    InvalidAddress {
        /// The rejected input.
        address: String,
        /// Parse failure.
        source: alloy::primitives::hex::FromHexError,
    },
    /// Errors related to method registration.
    #[error(transparent)]
    Registry(#[from] RegistryError),
    /// The method is not registered.
    #[error("method `{0}` is not registered")]
    UnknownMethod(String),
    /// The arguments do not fit the method's inputs.
    #[error("invalid arguments for method `{method}`: {source}")]
    InvalidArguments {
        /// Method name.
        method: String,
        /// Encoding failure.
        source: alloy::dyn_abi::Error,
    },
}

/// Errors returned when executing a batch.
#[derive(Debug, Error)]
pub enum ExecutionError {
    /// The aggregator call failed. The pending batch has been cleared.
    #[error("multicall execution failed: {0}")]
    Aggregate(#[from] AggregateError),
}
