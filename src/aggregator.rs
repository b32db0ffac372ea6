//! # Multicall3 aggregation
//!
//! Submits a batch of labelled calls to a Multicall3 deployment in a single `eth_call` and maps
//! the raw per-call results back to their labels.
//!
//! The [`Aggregator`] trait is the seam between the session and the network, so sessions can be
//! driven by any implementation, including in-memory ones in tests.

use crate::{constants::MULTICALL3_ADDRESS, error::AggregateError};
use alloy::{
    eips::BlockId,
    primitives::{Address, Bytes},
    providers::Provider,
    sol,
};
use async_trait::async_trait;
use std::collections::HashMap;
use tracing::{debug, instrument, warn};

sol! {
    /// Multicall3 interface - deployed at the same address on all supported chains
    #[sol(rpc)]
    interface IMulticall3 {
        /// Call without a failure flag
        struct Call {
            address target;
            bytes callData;
        }

        /// Result of a single call
        struct Result {
            bool success;
            bytes returnData;
        }

        /// Executes all calls and returns the block they were executed against
        function tryBlockAndAggregate(bool requireSuccess, Call[] calldata calls)
            external payable
            returns (uint256 blockNumber, bytes32 blockHash, Result[] memory returnData);
    }
}

/// A labelled call ready to be aggregated.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AggregateCall {
    /// Caller chosen label.
    pub label: String,
    /// Contract to call.
    pub target: Address,
    /// Selector-prefixed call data.
    pub call_data: Bytes,
}

/// Raw result of one aggregated call.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RawResult {
    /// Whether the call succeeded.
    pub success: bool,
    /// Return data, or revert data if the call failed.
    pub return_data: Bytes,
}

impl RawResult {
    /// A successful result carrying `return_data`.
    pub fn success(return_data: impl Into<Bytes>) -> Self {
        Self { success: true, return_data: return_data.into() }
    }

    /// A failed result.
    pub fn failure() -> Self {
        Self::default()
    }
}

/// Output of an aggregation round trip.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct AggregateOutput {
    /// Block the calls were executed against.
    pub block_number: u64,
    /// Raw results keyed by label. Later calls overwrite earlier ones with the same label.
    pub results: HashMap<String, RawResult>,
}

/// Executes batches of calls in one round trip.
#[async_trait]
pub trait Aggregator: Send + Sync {
    /// Executes `calls` at `block`, or at the latest block if `None`.
    async fn aggregate(
        &self,
        calls: &[AggregateCall],
        block: Option<u64>,
    ) -> Result<AggregateOutput, AggregateError>;
}

/// [`Aggregator`] backed by a Multicall3 contract.
#[derive(Debug, Clone)]
pub struct Multicall3Aggregator<P> {
    provider: P,
    multicall_address: Address,
}

impl<P> Multicall3Aggregator<P> {
    /// Creates an aggregator for the canonical Multicall3 deployment.
    pub fn new(provider: P) -> Self {
        Self::with_address(provider, MULTICALL3_ADDRESS)
    }

    /// Creates an aggregator for a Multicall3 deployment at `multicall_address`.
    pub fn with_address(provider: P, multicall_address: Address) -> Self {
        Self { provider, multicall_address }
    }

    /// Address of the aggregator contract.
    pub fn address(&self) -> Address {
        self.multicall_address
    }

    /// The underlying provider.
    pub fn provider(&self) -> &P {
        &self.provider
    }
}

impl<P: Provider> Multicall3Aggregator<P> {
    /// Check if Multicall3 is deployed and available on this chain
    #[instrument(skip(self))]
    pub async fn is_available(&self) -> bool {
        match self.provider.get_code_at(self.multicall_address).await {
            Ok(code) => {
                let available = !code.is_empty();
                debug!(
                    multicall_address = ?self.multicall_address,
                    available,
                    "Multicall3 availability check"
                );
                available
            }
            Err(e) => {
                warn!(
                    error = ?e,
                    multicall_address = ?self.multicall_address,
                    "Failed to check Multicall3 availability"
                );
                false
            }
        }
    }
}

#[async_trait]
impl<P: Provider> Aggregator for Multicall3Aggregator<P> {
    #[instrument(skip(self, calls), fields(calls = calls.len()))]
    async fn aggregate(
        &self,
        calls: &[AggregateCall],
        block: Option<u64>,
    ) -> Result<AggregateOutput, AggregateError> {
        let batch = calls
            .iter()
            .map(|call| IMulticall3::Call { target: call.target, callData: call.call_data.clone() })
            .collect::<Vec<_>>();

        debug!(multicall_address = ?self.multicall_address, "Executing batch of calls");

        let output = IMulticall3::new(self.multicall_address, &self.provider)
            .tryBlockAndAggregate(false, batch)
            .block(block.map_or_else(BlockId::latest, BlockId::number))
            .call()
            .await?;

        let block_number = output.blockNumber.saturating_to::<u64>();
        let results = label_results(calls, output.returnData)?;

        debug!(block_number, results = results.len(), "Batch executed");

        Ok(AggregateOutput { block_number, results })
    }
}

/// Pairs each call with the result at the same position.
fn label_results(
    calls: &[AggregateCall],
    results: Vec<IMulticall3::Result>,
) -> Result<HashMap<String, RawResult>, AggregateError> {
    if results.len() != calls.len() {
        return Err(AggregateError::UnexpectedResultCount {
            expected: calls.len(),
            actual: results.len(),
        });
    }

    Ok(calls
        .iter()
        .zip(results)
        .map(|(call, result)| {
            let raw = RawResult { success: result.success, return_data: result.returnData };
            (call.label.clone(), raw)
        })
        .collect())
}
