use thiserror::Error;

/// Errors returned by an [`Aggregator`](crate::aggregator::Aggregator).
#[derive(Debug, Error)]
pub enum AggregateError {
    /// The aggregator contract call failed.
    #[error(transparent)]
    Contract(#[from] alloy::contract::Error),
    /// The aggregator returned a different number of results than calls submitted.
    #[error("expected {expected} results, got {actual}")]
    UnexpectedResultCount {
        /// Number of submitted calls.
        expected: usize,
        /// Number of returned results.
        actual: usize,
    },
    /// Any other aggregator failure.
    #[error(transparent)]
    Other(#[from] eyre::Error),
}

/// Failure of a single labelled call inside an otherwise successful batch.
#[derive(Debug, Error)]
pub enum CallError {
    /// The target reverted.
    #[error("call reverted")]
    Reverted,
    /// The aggregator returned nothing for this label.
    #[error("no result returned for call")]
    MissingResult,
    /// The return data did not match the method's outputs.
    #[error("failed to decode return data: {0}")]
    Decode(#[from] alloy::dyn_abi::Error),
}
