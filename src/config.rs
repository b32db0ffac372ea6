//! Session configuration.
use crate::constants::MULTICALL3_ADDRESS;
use alloy::primitives::Address;
use eyre::Context;
use serde::{Deserialize, Serialize};
use std::path::Path;

/// Configuration of a contract session.
///
/// ```yaml
/// multicall_address: "0xcA11bde05977b3631167028862bE2a173976CA11"
/// methods:
///   - function totalSupply()(uint256)
///   - function balanceOf(address)(uint256)
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MulticallConfig {
    /// Aggregator contract address.
    #[serde(default = "default_multicall_address")]
    pub multicall_address: Address,
    /// Method signatures registered on build, in order.
    #[serde(default)]
    pub methods: Vec<String>,
}

impl Default for MulticallConfig {
    fn default() -> Self {
        Self { multicall_address: MULTICALL3_ADDRESS, methods: Vec::new() }
    }
}

fn default_multicall_address() -> Address {
    MULTICALL3_ADDRESS
}

impl MulticallConfig {
    /// Sets the aggregator contract address.
    pub fn with_multicall_address(mut self, multicall_address: Address) -> Self {
        self.multicall_address = multicall_address;
        self
    }

    /// Appends a method signature.
    pub fn with_method(mut self, signature: impl Into<String>) -> Self {
        self.methods.push(signature.into());
        self
    }

    /// Load from a YAML file.
    pub fn load_from_file<P: AsRef<Path>>(path: P) -> eyre::Result<Self> {
        let path = path.as_ref();
        let file = std::fs::File::open(path)
            .wrap_err_with(|| format!("failed to read config file: {}", path.display()))?;
        let config = serde_yaml::from_reader(&file)
            .wrap_err_with(|| format!("failed to parse config file: {}", path.display()))?;
        Ok(config)
    }

    /// Save to a YAML file.
    pub fn save_to_file<P: AsRef<Path>>(&self, path: P) -> eyre::Result<()> {
        let content = serde_yaml::to_string(self)?;
        std::fs::write(path, content)?;
        Ok(())
    }
}
