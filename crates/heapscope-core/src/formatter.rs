//! # Value Formatter
//!
//! Converts raw [`RuntimeValue`]s into [`FormattedValue`]s.
//!
//! Dispatch is a fixed-priority decision over a closed set of shapes, first
//! match wins:
//!
//! 1. live object reference: [`FormattedValue::ObjectRef`]
//! 2. raw pointer: [`FormattedValue::RawPointerRef`]
//! 3. string / number / boolean: [`FormattedValue::Primitive`]
//! 4. everything else: [`FormattedValue::Opaque`]
//!
//! Formatting never fails. Host trouble while describing a referenced object is
//! recorded as a warning and leaves the description empty.
//!
//! Decoding byte buffers as UTF-8 is a separate pre-step ([`decode_utf8`])
//! applied by callers that ask for it, not a formatter branch.

use crate::boundary::guarded;
use crate::diagnostics::Warnings;
use crate::error::HeapError;
use crate::resolver::resolve_with_metadata;
use crate::runtime::ObjcRuntime;
use crate::types::{Address, FormattedValue, Primitive, RuntimeValue};

/// Format one raw value.
///
/// An [`RuntimeValue::Object`] that no longer resolves is not a live object
/// reference; it is passed through as `Opaque` with a `ResolutionFailed`
/// warning so the original reference stays visible.
pub fn format<R: ObjcRuntime + ?Sized>(runtime: &R, raw: RuntimeValue, warnings: &mut Warnings) -> FormattedValue
{
    match raw {
        RuntimeValue::Object(address) => match format_object(runtime, address, warnings) {
            Some(formatted) => formatted,
            None => FormattedValue::Opaque {
                original: RuntimeValue::Object(address),
            },
        },
        RuntimeValue::Pointer(pointer) => FormattedValue::RawPointerRef { pointer },
        RuntimeValue::String(text) => FormattedValue::Primitive {
            value: Primitive::String(text),
        },
        RuntimeValue::Integer(value) => FormattedValue::Primitive {
            value: Primitive::Integer(value),
        },
        RuntimeValue::Float(value) => FormattedValue::Primitive {
            value: Primitive::Float(value),
        },
        RuntimeValue::Bool(value) => FormattedValue::Primitive {
            value: Primitive::Bool(value),
        },
        original @ (RuntimeValue::Bytes(_) | RuntimeValue::Nil | RuntimeValue::Struct(_)) => {
            FormattedValue::Opaque { original }
        }
    }
}

fn format_object<R: ObjcRuntime + ?Sized>(runtime: &R, address: Address, warnings: &mut Warnings) -> Option<FormattedValue>
{
    // Re-resolve from scratch; the slot may reference a freed object.
    let (handle, _) = match resolve_with_metadata(runtime, address) {
        Ok(resolved) => resolved,
        Err(error) => {
            warnings.raise(error);
            return None;
        }
    };

    let value = match guarded("description", || runtime.description(handle.address)) {
        Ok(text) => Some(text),
        Err(error) => {
            warnings.raise(HeapError::ResolutionFailed {
                address: handle.address,
                details: format!("description unavailable: {error}"),
            });
            None
        }
    };

    Some(FormattedValue::ObjectRef {
        class_name: handle.class_name,
        pointer: handle.address,
        value,
    })
}

/// UTF-8 pre-step for one ivar value.
///
/// Only [`RuntimeValue::Bytes`] is touched. Trailing NUL terminators are
/// dropped before decoding. On success the bytes become a
/// [`RuntimeValue::String`]; on failure a `DecodeFailed` warning is raised and
/// the original bytes are returned unchanged.
pub fn decode_utf8(ivar: &str, raw: RuntimeValue, warnings: &mut Warnings) -> RuntimeValue
{
    let RuntimeValue::Bytes(bytes) = raw else {
        return raw;
    };

    let end = bytes.iter().rposition(|byte| *byte != 0).map_or(0, |last| last + 1);
    match std::str::from_utf8(&bytes[..end]) {
        Ok(text) => RuntimeValue::String(text.to_string()),
        Err(error) => {
            warnings.raise(HeapError::DecodeFailed {
                ivar: ivar.to_string(),
                details: error.to_string(),
            });
            RuntimeValue::Bytes(bytes)
        }
    }
}
