//! Pending call batch.

use crate::{abi, aggregator::AggregateCall, error::ContractError};
use alloy::{
    dyn_abi::DynSolValue,
    json_abi::{Function, JsonAbi},
    primitives::{Address, Bytes},
};
use tracing::trace;

/// An encoded call waiting to be executed.
#[derive(Debug, Clone, PartialEq)]
pub struct CallEntry {
    /// Caller chosen label the result is stored under.
    pub label: String,
    /// Contract to call.
    pub target: Address,
    /// The resolved function, used again to decode the result.
    pub function: Function,
    /// Selector-prefixed call data.
    pub call_data: Bytes,
}

impl CallEntry {
    /// Resolves `method` in `abi` and encodes `args` for it.
    ///
    /// Overloads with a matching input count are tried in registration order and the first one
    /// accepting `args` is used.
    pub fn encode(
        abi: &JsonAbi,
        label: impl Into<String>,
        target: Address,
        method: &str,
        args: &[DynSolValue],
    ) -> Result<Self, ContractError> {
        Self::encode_with(abi, label, target, method, args.len(), |function| {
            abi::encode_call(function, args)
        })
    }

    /// Like [`CallEntry::encode`], coercing string arguments to the declared input types.
    pub fn encode_str(
        abi: &JsonAbi,
        label: impl Into<String>,
        target: Address,
        method: &str,
        args: &[&str],
    ) -> Result<Self, ContractError> {
        Self::encode_with(abi, label, target, method, args.len(), |function| {
            abi::encode_call(function, &abi::coerce_args(function, args)?)
        })
    }

    /// Encodes with the first overload `encode` succeeds for, reporting the first failure
    /// otherwise.
    fn encode_with(
        abi: &JsonAbi,
        label: impl Into<String>,
        target: Address,
        method: &str,
        arity: usize,
        encode: impl Fn(&Function) -> alloy::dyn_abi::Result<Bytes>,
    ) -> Result<Self, ContractError> {
        let mut error = None;
        for function in abi::resolve(abi, method, arity) {
            match encode(function) {
                Ok(call_data) => {
                    return Ok(Self {
                        label: label.into(),
                        target,
                        function: function.clone(),
                        call_data,
                    });
                }
                Err(source) => {
                    error.get_or_insert(source);
                }
            }
        }

        Err(match error {
            Some(source) => ContractError::InvalidArguments { method: method.to_string(), source },
            None => ContractError::UnknownMethod(method.to_string()),
        })
    }

    /// The call as submitted to the aggregator.
    pub fn to_aggregate_call(&self) -> AggregateCall {
        AggregateCall {
            label: self.label.clone(),
            target: self.target,
            call_data: self.call_data.clone(),
        }
    }
}

/// Calls accumulated between two executions, in insertion order.
#[derive(Debug, Clone, Default)]
pub struct PendingBatch {
    entries: Vec<CallEntry>,
}

impl PendingBatch {
    /// Appends an entry.
    pub fn push(&mut self, entry: CallEntry) {
        trace!(
            label = %entry.label,
            target = %entry.target,
            method = %entry.function.name,
            "Queued call"
        );
        self.entries.push(entry);
    }

    /// Removes and returns all entries, leaving the batch empty.
    pub fn take(&mut self) -> Vec<CallEntry> {
        std::mem::take(&mut self.entries)
    }

    /// Drops all entries.
    pub fn clear(&mut self) {
        self.entries.clear();
    }

    /// The queued entries.
    pub fn entries(&self) -> &[CallEntry] {
        &self.entries
    }

    /// Number of queued entries.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Whether nothing is queued.
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}
