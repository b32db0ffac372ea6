//! Interface description compiled from parsed [`Method`]s.

use crate::signature::Method;
use alloy::{
    dyn_abi::{DynSolValue, FunctionExt, JsonAbiExt, Specifier},
    json_abi::{Function, JsonAbi},
    primitives::Bytes,
};

/// Compiles the ordered method list into a [`JsonAbi`].
///
/// The records go through their JSON form so that alloy validates them exactly as it would a
/// hand written ABI file.
pub fn compile(methods: &[Method]) -> Result<JsonAbi, serde_json::Error> {
    serde_json::from_value(serde_json::to_value(methods)?)
}

/// Returns the overloads of `name` taking `arity` inputs, in registration order.
///
/// Falls back to the first overload when none matches so that encoding reports the arity
/// mismatch. Empty if `name` is not registered.
pub fn resolve<'a>(abi: &'a JsonAbi, name: &str, arity: usize) -> Vec<&'a Function> {
    let Some(overloads) = abi.function(name) else {
        return Vec::new();
    };
    let matching =
        overloads.iter().filter(|function| function.inputs.len() == arity).collect::<Vec<_>>();
    if matching.is_empty() { overloads.first().into_iter().collect() } else { matching }
}

/// ABI-encodes `args` prefixed with the function selector.
pub fn encode_call(function: &Function, args: &[DynSolValue]) -> alloy::dyn_abi::Result<Bytes> {
    function.abi_encode_input(args).map(Into::into)
}

/// Decodes a call's return data into the function's outputs.
pub fn decode_output(function: &Function, data: &[u8]) -> alloy::dyn_abi::Result<Vec<DynSolValue>> {
    function.abi_decode_output(data)
}

/// Coerces string arguments into the function's declared input types.
pub fn coerce_args(function: &Function, args: &[&str]) -> alloy::dyn_abi::Result<Vec<DynSolValue>> {
    if function.inputs.len() != args.len() {
        return Err(alloy::dyn_abi::Error::EncodeLengthMismatch {
            expected: function.inputs.len(),
            actual: args.len(),
        });
    }
    function.inputs.iter().zip(args).map(|(param, arg)| param.resolve()?.coerce_str(arg)).collect()
}
