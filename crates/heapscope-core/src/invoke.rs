//! # Invocation Bridge
//!
//! Dispatches a nullary selector on a resolved object.
//!
//! The target method executes **exactly once** per call. `stringify` only
//! decides how that single result is presented; the value is never formatted
//! through [`crate::formatter`], since invocation results are consumed as-is.

use serde::Serialize;
use tracing::info;

use crate::boundary::{guarded, guarded_value};
use crate::error::{HeapError, HeapResult, HostError};
use crate::resolver::resolve_with_metadata;
use crate::runtime::ObjcRuntime;
use crate::types::{selector_takes_arguments, MethodName, ObjectHandle, RuntimeValue};

/// Outcome of [`invoke`]
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(untagged)]
pub enum InvocationResult
{
    /// The raw return value
    Value(RuntimeValue),
    /// The textual representation of the return value
    Text(String),
}

/// Send `selector` with no arguments to the object at `address`.
///
/// `selector` may be bare (`count`) or in method-list form (`- count`).
///
/// ## Errors
///
/// - `InvalidAddress` / `ResolutionFailed`: the receiver could not be resolved
/// - `UnsupportedSignature`: the selector takes arguments
/// - `NoSuchMethod`: the receiver does not respond to the selector (nothing is dispatched)
/// - `InvocationFailed`: the dispatched call failed in the host
pub fn invoke<R: ObjcRuntime + ?Sized>(
    runtime: &R,
    address: &str,
    selector: &str,
    stringify: bool,
) -> HeapResult<InvocationResult>
{
    let (handle, _) = resolve_with_metadata(runtime, address.parse()?)?;
    let selector = bare_selector(selector);

    if selector_takes_arguments(&selector) {
        return Err(HeapError::UnsupportedSignature(selector));
    }

    let failed = |error: HostError| HeapError::InvocationFailed {
        selector: selector.clone(),
        details: error.to_string(),
    };

    let responds = guarded_value("responds_to", || runtime.responds_to(handle.address, &selector)).map_err(failed)?;
    if !responds {
        return Err(HeapError::NoSuchMethod(selector.clone()));
    }

    info!(handle = %handle.address, "Executing: [{} {}]", handle.class_name, selector);
    let value = match guarded("dispatch", || runtime.dispatch(handle.address, &selector, &[])) {
        Ok(value) => value,
        Err(HostError::SelectorNotFound(_)) => return Err(HeapError::NoSuchMethod(selector.clone())),
        Err(error) => return Err(failed(error)),
    };

    if stringify {
        Ok(InvocationResult::Text(stringify_value(runtime, &handle, &selector, value)?))
    } else {
        Ok(InvocationResult::Value(value))
    }
}

fn bare_selector(selector: &str) -> String
{
    selector
        .parse::<MethodName>()
        .map_or_else(|_| selector.trim().to_string(), |method| method.selector)
}

fn stringify_value<R: ObjcRuntime + ?Sized>(
    runtime: &R,
    receiver: &ObjectHandle,
    selector: &str,
    value: RuntimeValue,
) -> HeapResult<String>
{
    match value {
        RuntimeValue::Object(object) => {
            guarded("description", || runtime.description(object)).map_err(|error| HeapError::InvocationFailed {
                selector: selector.to_string(),
                details: format!("result of {receiver} could not be described: {error}"),
            })
        }
        other => Ok(other.to_string()),
    }
}
