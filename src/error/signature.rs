use thiserror::Error;

/// Errors returned when a signature string is structurally malformed.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum SignatureError {
    /// The signature has no opening parenthesis.
    #[error("function signature `{0}` is missing `(`")]
    MissingParenthesis(String),
    /// Nothing precedes the parameter list.
    #[error("function signature `{0}` has no name")]
    EmptyName(String),
}
