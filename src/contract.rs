//! Contract sessions: register methods by signature, queue calls, execute them in one batch.
//!
//! ```no_run
//! use alloy::{dyn_abi::DynSolValue, primitives::address, providers::ProviderBuilder};
//! use multicaller::ContractBuilder;
//!
//! # async fn run() -> eyre::Result<()> {
//! let provider = ProviderBuilder::new().connect_http("http://localhost:8545".parse()?);
//! let mut contract = ContractBuilder::new()
//!     .with_provider(provider)
//!     .at_address("0xcA11bde05977b3631167028862bE2a173976CA11")
//!     .add_method("function totalSupply()(uint256)")
//!     .add_method("function balanceOf(address)(uint256)")
//!     .build()?;
//!
//! let token = address!("A0b86991c6218b36c1d19D4a2e9Eb0cE3606eB48");
//! contract
//!     .add_call("supply", token, "totalSupply", &[])?
//!     .add_call("balance", token, "balanceOf", &[DynSolValue::Address(token)])?;
//!
//! let output = contract.call(None).await?;
//! println!("{:?} at block {}", output.values("supply"), output.block_number);
//! # Ok(())
//! # }
//! ```

use crate::{
    abi,
    aggregator::{Aggregator, Multicall3Aggregator},
    batch::{CallEntry, PendingBatch},
    constants::MULTICALL3_ADDRESS,
    error::{CallError, ContractError, ExecutionError},
    registry::MethodRegistry,
};
use alloy::{
    dyn_abi::DynSolValue,
    json_abi::JsonAbi,
    primitives::Address,
    providers::Provider,
};
use std::{collections::HashMap, str::FromStr};
use tracing::{debug, instrument, warn};

/// Decoded results of one executed batch.
#[derive(Debug, Default)]
pub struct CallOutput {
    /// Block the batch was executed against.
    pub block_number: u64,
    /// Decoded outputs, or the reason decoding failed, keyed by label.
    pub results: HashMap<String, Result<Vec<DynSolValue>, CallError>>,
}

impl CallOutput {
    /// Decoded outputs for `label` if that call succeeded.
    pub fn values(&self, label: &str) -> Option<&[DynSolValue]> {
        self.results.get(label)?.as_ref().ok().map(Vec::as_slice)
    }

    /// The failure for `label`, if any.
    pub fn error(&self, label: &str) -> Option<&CallError> {
        self.results.get(label)?.as_ref().err()
    }

    /// Whether every call in the batch decoded successfully.
    pub fn is_complete(&self) -> bool {
        self.results.values().all(Result::is_ok)
    }
}

/// A set of registered methods plus the calls queued against them.
///
/// Mutating methods take `&mut self`; a session is driven by one caller at a time.
#[derive(Debug)]
pub struct Contract<A> {
    registry: MethodRegistry,
    batch: PendingBatch,
    aggregator: A,
}

impl<A: Aggregator> Contract<A> {
    /// Creates a session with no registered methods.
    pub fn new(aggregator: A) -> Self {
        Self::with_registry(aggregator, MethodRegistry::new())
    }

    /// Creates a session around an existing registry.
    pub fn with_registry(aggregator: A, registry: MethodRegistry) -> Self {
        Self { registry, batch: PendingBatch::default(), aggregator }
    }

    /// Registers a method by signature and returns the rebuilt interface description.
    pub fn add_method(&mut self, signature: &str) -> Result<&JsonAbi, ContractError> {
        Ok(self.registry.add_method(signature)?)
    }

    /// Queues a call of `method` on `target`, stored under `label` once executed.
    ///
    /// Labels should be unique within a batch: when two calls share a label only the last one
    /// is kept in the [`CallOutput`].
    pub fn add_call(
        &mut self,
        label: impl Into<String>,
        target: Address,
        method: &str,
        args: &[DynSolValue],
    ) -> Result<&mut Self, ContractError> {
        let entry = CallEntry::encode(self.registry.abi(), label, target, method, args)?;
        self.batch.push(entry);
        Ok(self)
    }

    /// Like [`Contract::add_call`], parsing each argument from a string according to the
    /// method's input types.
    pub fn add_call_str(
        &mut self,
        label: impl Into<String>,
        target: Address,
        method: &str,
        args: &[&str],
    ) -> Result<&mut Self, ContractError> {
        let entry = CallEntry::encode_str(self.registry.abi(), label, target, method, args)?;
        self.batch.push(entry);
        Ok(self)
    }

    /// Executes the queued calls at `block`, or the latest block if `None`.
    ///
    /// The batch is emptied whether or not execution succeeds.
    #[instrument(skip(self), fields(calls = self.batch.len()))]
    pub async fn call(&mut self, block: Option<u64>) -> Result<CallOutput, ExecutionError> {
        let entries = self.batch.take();
        let calls = entries.iter().map(CallEntry::to_aggregate_call).collect::<Vec<_>>();

        let output = self.aggregator.aggregate(&calls, block).await.inspect_err(|err| {
            warn!(%err, "Multicall execution failed");
        })?;

        let mut results = HashMap::with_capacity(entries.len());
        for entry in entries {
            let decoded = match output.results.get(&entry.label) {
                Some(raw) if raw.success => {
                    abi::decode_output(&entry.function, &raw.return_data).map_err(CallError::from)
                }
                Some(_) => Err(CallError::Reverted),
                None => Err(CallError::MissingResult),
            };
            if let Err(err) = &decoded {
                debug!(label = %entry.label, %err, "Call did not produce a result");
            }
            results.insert(entry.label, decoded);
        }

        Ok(CallOutput { block_number: output.block_number, results })
    }

    /// Drops all queued calls.
    pub fn clear_calls(&mut self) {
        self.batch.clear();
    }

    /// Calls queued since the last execution.
    pub fn pending(&self) -> &[CallEntry] {
        self.batch.entries()
    }

    /// The current interface description.
    pub fn abi(&self) -> &JsonAbi {
        self.registry.abi()
    }

    /// The method registry.
    pub fn registry(&self) -> &MethodRegistry {
        &self.registry
    }

    /// The aggregator executing batches.
    pub fn aggregator(&self) -> &A {
        &self.aggregator
    }
}

/// Collects the settings of a [`Multicall3Aggregator`] backed session.
///
/// Nothing is validated until [`ContractBuilder::build`].
#[derive(Debug)]
pub struct ContractBuilder<P> {
    provider: Option<P>,
    address: Option<String>,
    methods: Vec<String>,
}

impl<P> Default for ContractBuilder<P> {
    fn default() -> Self {
        Self { provider: None, address: None, methods: Vec::new() }
    }
}

impl<P: Provider> ContractBuilder<P> {
    /// Creates an empty builder.
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates a builder from a [`MulticallConfig`](crate::config::MulticallConfig).
    pub fn from_config(config: &crate::config::MulticallConfig) -> Self {
        let mut builder = Self::new().at_address(config.multicall_address.to_string());
        builder.methods.extend(config.methods.iter().cloned());
        builder
    }

    /// Sets the provider used to reach the aggregator.
    pub fn with_provider(mut self, provider: P) -> Self {
        self.provider = Some(provider);
        self
    }

    /// Sets the aggregator contract address. Defaults to [`MULTICALL3_ADDRESS`].
    pub fn at_address(mut self, address: impl Into<String>) -> Self {
        self.address = Some(address.into());
        self
    }

    /// Registers a method signature.
    pub fn add_method(mut self, signature: impl Into<String>) -> Self {
        self.methods.push(signature.into());
        self
    }

    /// Validates the settings and builds the session.
    pub fn build(self) -> Result<Contract<Multicall3Aggregator<P>>, ContractError> {
        let provider = self.provider.ok_or(ContractError::MissingProvider)?;
        let multicall_address = match self.address {
            Some(address) => Address::from_str(address.trim())
                .map_err(|source| ContractError::InvalidAddress { address, source })?,
            None => MULTICALL3_ADDRESS,
        };

        let mut registry = MethodRegistry::new();
        for signature in &self.methods {
            registry.add_method(signature)?;
        }

        debug!(?multicall_address, methods = registry.len(), "Built contract session");

        Ok(Contract::with_registry(
            Multicall3Aggregator::with_address(provider, multicall_address),
            registry,
        ))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{
        aggregator::{AggregateCall, AggregateOutput, RawResult},
        error::{AggregateError, RegistryError},
    };
    use alloy::{
        dyn_abi::FunctionExt,
        primitives::{U256, address},
        providers::RootProvider,
    };
    use async_trait::async_trait;
    use std::sync::Mutex;

    const TOKEN: Address = address!("00000000000000000000000000000000000000aa");

    /// Answers every call with the configured raw result and records what it was sent.
    #[derive(Default)]
    struct MockAggregator {
        responses: HashMap<String, RawResult>,
        fail: bool,
        seen: Mutex<Vec<Vec<AggregateCall>>>,
    }

    #[async_trait]
    impl Aggregator for MockAggregator {
        async fn aggregate(
            &self,
            calls: &[AggregateCall],
            _block: Option<u64>,
        ) -> Result<AggregateOutput, AggregateError> {
            self.seen.lock().unwrap().push(calls.to_vec());
            if self.fail {
                return Err(eyre::eyre!("connection refused").into());
            }
            let results = calls
                .iter()
                .filter_map(|call| {
                    Some((call.label.clone(), self.responses.get(&call.label)?.clone()))
                })
                .collect();
            Ok(AggregateOutput { block_number: 100, results })
        }
    }

    fn encoded(
        contract: &Contract<MockAggregator>,
        method: &str,
        values: &[DynSolValue],
    ) -> RawResult {
        let function = &contract.abi().function(method).unwrap()[0];
        RawResult::success(function.abi_encode_output(values).unwrap())
    }

    #[tokio::test]
    async fn total_supply_example() {
        let mut contract = Contract::new(MockAggregator::default());
        contract.add_method("function totalSupply()(uint256)").unwrap();
        let raw =
            encoded(&contract, "totalSupply", &[DynSolValue::Uint(U256::from(1_000_000u64), 256)]);
        contract.aggregator.responses.insert("ts".to_string(), raw);

        contract.add_call("ts", TOKEN, "totalSupply", &[]).unwrap();
        let output = contract.call(None).await.unwrap();

        assert_eq!(output.block_number, 100);
        assert_eq!(output.results.len(), 1);
        assert_eq!(
            output.values("ts").unwrap(),
            [DynSolValue::Uint(U256::from(1_000_000u64), 256)]
        );
        assert!(output.is_complete());
        assert!(contract.pending().is_empty());
    }

    #[tokio::test]
    async fn surfaces_per_label_failures() {
        let mut contract = Contract::new(MockAggregator::default());
        contract.add_method("decimals()(uint8)").unwrap();
        let ok = encoded(&contract, "decimals", &[DynSolValue::Uint(U256::from(18u64), 8)]);
        contract.aggregator.responses.insert("ok".to_string(), ok);
        contract.aggregator.responses.insert("reverted".to_string(), RawResult::failure());
        contract.aggregator.responses.insert("garbage".to_string(), RawResult::success(vec![1u8]));

        for label in ["ok", "reverted", "garbage", "missing"] {
            contract.add_call(label, TOKEN, "decimals", &[]).unwrap();
        }
        let output = contract.call(Some(7)).await.unwrap();

        assert_eq!(output.results.len(), 4);
        assert_eq!(output.values("ok").unwrap(), [DynSolValue::Uint(U256::from(18u64), 8)]);
        assert!(matches!(output.error("reverted"), Some(CallError::Reverted)));
        assert!(matches!(output.error("garbage"), Some(CallError::Decode(_))));
        assert!(matches!(output.error("missing"), Some(CallError::MissingResult)));
        assert!(!output.is_complete());
    }

    #[tokio::test]
    async fn batch_cleared_after_failure() {
        let mut contract = Contract::new(MockAggregator { fail: true, ..Default::default() });
        contract.add_method("totalSupply()(uint256)").unwrap();
        contract.add_call("first", TOKEN, "totalSupply", &[]).unwrap();

        let err = contract.call(None).await.unwrap_err();
        assert!(matches!(err, ExecutionError::Aggregate(AggregateError::Other(_))));
        assert!(contract.pending().is_empty());

        contract.add_call("second", TOKEN, "totalSupply", &[]).unwrap();
        let _ = contract.call(None).await;

        let seen = contract.aggregator.seen.lock().unwrap();
        assert_eq!(seen.len(), 2);
        assert_eq!(seen[1].len(), 1);
        assert_eq!(seen[1][0].label, "second");
    }

    #[test]
    fn add_call_errors_leave_batch_untouched() {
        let mut contract = Contract::new(MockAggregator::default());
        contract.add_method("balanceOf(address)(uint256)").unwrap();
        contract
            .add_call_str("a", TOKEN, "balanceOf", &["0x00000000000000000000000000000000000000bb"])
            .unwrap();

        assert!(matches!(
            contract.add_call("b", TOKEN, "balanceOf", &[]),
            Err(ContractError::InvalidArguments { .. })
        ));
        assert!(matches!(
            contract.add_call("c", TOKEN, "symbol", &[]),
            Err(ContractError::UnknownMethod(_))
        ));
        assert_eq!(contract.pending().len(), 1);

        contract.clear_calls();
        assert!(contract.pending().is_empty());
    }

    #[test]
    fn duplicate_method_is_rejected() {
        let mut contract = Contract::new(MockAggregator::default());
        contract.add_method("name()(string)").unwrap();
        assert!(matches!(
            contract.add_method("NAME()(STRING)"),
            Err(ContractError::Registry(RegistryError::DuplicateMethod(_)))
        ));
    }

    fn provider() -> RootProvider {
        RootProvider::new_http("http://localhost:8545".parse().unwrap())
    }

    #[test]
    fn builder_requires_provider() {
        let err = ContractBuilder::<RootProvider>::new().build().unwrap_err();
        assert!(matches!(err, ContractError::MissingProvider));
    }

    #[test]
    fn builder_rejects_malformed_address() {
        let err = ContractBuilder::new()
            .with_provider(provider())
            .at_address("0x1234")
            .build()
            .unwrap_err();
        assert!(matches!(
            err,
            ContractError::InvalidAddress { ref address, .. } if address == "0x1234"
        ));
    }

    #[test]
    fn builder_registers_methods() {
        let contract = ContractBuilder::new()
            .with_provider(provider())
            .at_address("0x0000000000000000000000000000000000000001")
            .add_method("function totalSupply()(uint256)")
            .add_method("function balanceOf(address)(uint256)")
            .build()
            .unwrap();
        assert_eq!(contract.registry().len(), 2);
        assert_eq!(
            contract.aggregator().address(),
            address!("0000000000000000000000000000000000000001")
        );

        let err = ContractBuilder::new()
            .with_provider(provider())
            .add_method("a()(bool)")
            .add_method("A()(BOOL)")
            .build()
            .unwrap_err();
        assert!(matches!(err, ContractError::Registry(RegistryError::DuplicateMethod(_))));
    }

    #[test]
    fn builder_defaults_to_multicall3() {
        let contract = ContractBuilder::new().with_provider(provider()).build().unwrap();
        assert_eq!(contract.aggregator().address(), MULTICALL3_ADDRESS);
    }
}
