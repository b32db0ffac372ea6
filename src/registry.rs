//! Registry of methods added by signature.

use crate::{
    abi,
    error::RegistryError,
    signature::{self, Method},
};
use alloy::json_abi::JsonAbi;
use std::collections::HashMap;
use tracing::debug;

/// Ordered set of registered methods and the interface description compiled from them.
///
/// Signatures are deduplicated case-insensitively. The [`JsonAbi`] is rebuilt from the whole
/// method list on every addition.
#[derive(Debug, Clone, Default)]
pub struct MethodRegistry {
    /// Case-folded signature to the signature as it was registered.
    signatures: HashMap<String, String>,
    methods: Vec<Method>,
    abi: JsonAbi,
}

impl MethodRegistry {
    /// Creates an empty registry.
    pub fn new() -> Self {
        Self::default()
    }

    /// Parses and registers `signature`, returning the rebuilt interface description.
    ///
    /// On error the registry is left unchanged.
    pub fn add_method(&mut self, signature: &str) -> Result<&JsonAbi, RegistryError> {
        let key = signature.to_lowercase();
        if let Some(existing) = self.signatures.get(&key) {
            return Err(RegistryError::DuplicateMethod(existing.clone()));
        }

        let method = signature::parse(signature)?;
        let mut methods = self.methods.clone();
        methods.push(method);
        let abi = abi::compile(&methods)?;

        debug!(%signature, methods = methods.len(), "Registered method");

        self.signatures.insert(key, signature.to_string());
        self.methods = methods;
        self.abi = abi;
        Ok(&self.abi)
    }

    /// Returns the current interface description.
    pub fn abi(&self) -> &JsonAbi {
        &self.abi
    }

    /// Returns the registered methods in registration order.
    pub fn methods(&self) -> &[Method] {
        &self.methods
    }

    /// Whether a signature equal up to case is registered.
    pub fn contains(&self, signature: &str) -> bool {
        self.signatures.contains_key(&signature.to_lowercase())
    }

    /// Number of registered methods.
    pub fn len(&self) -> usize {
        self.methods.len()
    }

    /// Whether no method is registered.
    pub fn is_empty(&self) -> bool {
        self.methods.is_empty()
    }
}
