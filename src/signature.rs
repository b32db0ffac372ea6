//! Compact function signature parsing.
//!
//! Turns a single-line signature such as `function balanceOf(address)(uint256)` into a [`Method`]
//! record that serializes to a JSON ABI function entry. Two shapes are understood:
//!
//! - `name(inputs)(outputs)`, where `outputs` may be a comma separated list
//! - `name(inputs)output`, with exactly one return type
//!
//! Types are written out in canonical form (`uint` becomes `uint256`) so that selectors match the
//! deployed contract. Tokens that do not parse as a Solidity type are kept verbatim and rejected
//! when the interface description is compiled.

use crate::error::SignatureError;
use alloy::dyn_abi::DynSolType;
use serde::{Deserialize, Serialize};

/// The optional keyword a signature may start with.
const FUNCTION_KEYWORD: &str = "function";

/// Delimiter separating the input list from a parenthesized output list.
const MULTI_RETURN_DELIMITER: &str = ")(";

/// A single unnamed function parameter.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Argument {
    /// Parameter name. Always empty for parsed signatures.
    pub name: String,
    /// Solidity type, e.g. `uint256`.
    #[serde(rename = "type")]
    pub ty: String,
    /// Mirrors [`Argument::ty`].
    pub internal_type: String,
}

impl Argument {
    /// Creates an unnamed argument of the given type.
    pub fn unnamed(ty: impl Into<String>) -> Self {
        let ty = ty.into();
        Self { name: String::new(), internal_type: ty.clone(), ty }
    }
}

/// A view function described by a signature string.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Method {
    /// Function name.
    pub name: String,
    /// Ordered input parameters.
    pub inputs: Vec<Argument>,
    /// Ordered output parameters.
    pub outputs: Vec<Argument>,
    /// ABI item kind. Always `function`.
    #[serde(rename = "type")]
    pub kind: String,
    /// Always `view`.
    pub state_mutability: String,
}

impl Method {
    fn view(name: String, inputs: Vec<Argument>, outputs: Vec<Argument>) -> Self {
        Self {
            name,
            inputs,
            outputs,
            kind: "function".to_string(),
            state_mutability: "view".to_string(),
        }
    }

    /// Returns the input types in order.
    pub fn input_types(&self) -> Vec<&str> {
        self.inputs.iter().map(|arg| arg.ty.as_str()).collect()
    }

    /// Returns the output types in order.
    pub fn output_types(&self) -> Vec<&str> {
        self.outputs.iter().map(|arg| arg.ty.as_str()).collect()
    }
}

/// Parses a compact function signature.
///
/// ```
/// use multicaller::signature::parse;
///
/// let method = parse("function balanceOf(address)(uint256)").unwrap();
/// assert_eq!(method.name, "balanceOf");
/// assert_eq!(method.input_types(), ["address"]);
/// assert_eq!(method.output_types(), ["uint256"]);
/// ```
pub fn parse(signature: &str) -> Result<Method, SignatureError> {
    let (head, rest) = signature
        .split_once('(')
        .ok_or_else(|| SignatureError::MissingParenthesis(signature.to_string()))?;

    let name = strip_keyword(head.trim()).trim();
    if name.is_empty() {
        return Err(SignatureError::EmptyName(signature.to_string()));
    }

    let (inputs, outputs) = match rest.split_once(MULTI_RETURN_DELIMITER) {
        Some((inputs, outputs)) => {
            let outputs = outputs.trim_end();
            let outputs = outputs.strip_suffix(')').unwrap_or(outputs);
            (split_types(inputs), split_types(outputs))
        }
        None => {
            let (inputs, output) = rest.split_once(')').unwrap_or((rest, ""));
            let output = output.trim();
            let outputs = if output.is_empty() {
                Vec::new()
            } else {
                vec![Argument::unnamed(canonical_type(output))]
            };
            (split_types(inputs), outputs)
        }
    };

    Ok(Method::view(name.to_string(), inputs, outputs))
}

/// Strips a leading `function` keyword when it stands on its own.
fn strip_keyword(head: &str) -> &str {
    match head.strip_prefix(FUNCTION_KEYWORD) {
        Some(rest) if rest.is_empty() || rest.starts_with(char::is_whitespace) => rest,
        _ => head,
    }
}

/// Splits a comma separated type list, dropping empty entries.
fn split_types(list: &str) -> Vec<Argument> {
    list.split(',')
        .map(str::trim)
        .filter(|ty| !ty.is_empty())
        .map(|ty| Argument::unnamed(canonical_type(ty)))
        .collect()
}

/// Expands type aliases, e.g. `uint` to `uint256`.
fn canonical_type(ty: &str) -> String {
    DynSolType::parse(ty).map_or_else(|_| ty.to_string(), |ty| ty.sol_type_name().into_owned())
}
