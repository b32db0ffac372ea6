use super::SignatureError;
use thiserror::Error;

/// Errors related to registering methods.
#[derive(Debug, Error)]
pub enum RegistryError {
    /// A signature equal up to case is already registered.
    #[error("method `{0}` is already registered")]
    DuplicateMethod(String),
    /// The signature could not be parsed.
    #[error(transparent)]
    Signature(#[from] SignatureError),
    /// The method records could not be compiled into a JSON ABI.
    #[error("failed to compile interface description: {0}")]
    Compile(#[from] serde_json::Error),
}
