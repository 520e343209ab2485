//! # Ivar/Method Reflector
//!
//! Reads an object's own instance-variable table and its class's own method
//! list.
//!
//! Both are scoped to "own" members. Ivars come straight from the runtime's
//! table for the object (inherited slots appear only if the runtime lists them
//! there; no superclass walk happens here). Methods are those declared directly
//! on the object's class, never inherited ones.

use crate::diagnostics::{Report, Warnings};
use crate::error::HeapResult;
use crate::formatter::{decode_utf8, format};
use crate::resolver::resolve_with_metadata;
use crate::runtime::ObjcRuntime;
use crate::types::{selector_takes_arguments, Ivar, IvarMap};

/// Read and format the ivars of the object at `address`.
///
/// Returns the object's class name and its ivars in table order. With
/// `decode_utf8` set, byte buffers are decoded as UTF-8 before formatting.
///
/// ## Errors
///
/// Resolution errors (`InvalidAddress`, `ResolutionFailed`) propagate.
/// Decode and description failures are warnings in the report.
pub fn get_ivars<R: ObjcRuntime + ?Sized>(
    runtime: &R,
    address: &str,
    decode_utf8: bool,
) -> HeapResult<Report<(String, IvarMap)>>
{
    let (handle, descriptor) = resolve_with_metadata(runtime, address.parse()?)?;

    let mut warnings = Warnings::new();
    let ivars = format_ivars(runtime, descriptor.own_ivars, decode_utf8, &mut warnings);
    Ok(warnings.into_report((handle.class_name, ivars)))
}

/// List the methods declared directly on the class of the object at `address`.
///
/// Entries keep the runtime's `"- selector"` / `"+ selector"` form.
///
/// ## Errors
///
/// Resolution errors (`InvalidAddress`, `ResolutionFailed`) propagate.
pub fn get_methods<R: ObjcRuntime + ?Sized>(runtime: &R, address: &str) -> HeapResult<(String, Vec<String>)>
{
    let (handle, descriptor) = resolve_with_metadata(runtime, address.parse()?)?;
    Ok((handle.class_name, descriptor.own_methods))
}

/// [`get_methods`], optionally dropping selectors that take arguments.
pub fn get_methods_filtered<R: ObjcRuntime + ?Sized>(
    runtime: &R,
    address: &str,
    without_arguments: bool,
) -> HeapResult<(String, Vec<String>)>
{
    let (class_name, mut methods) = get_methods(runtime, address)?;
    if without_arguments {
        methods.retain(|method| !selector_takes_arguments(method));
    }
    Ok((class_name, methods))
}

/// Apply the UTF-8 pre-step (when asked) and the formatter to each ivar.
pub(crate) fn format_ivars<R: ObjcRuntime + ?Sized>(
    runtime: &R,
    ivars: Vec<Ivar>,
    decode: bool,
    warnings: &mut Warnings,
) -> IvarMap
{
    let mut formatted = IvarMap::new();
    for Ivar { name, value } in ivars {
        let value = if decode { decode_utf8(&name, value, warnings) } else { value };
        let value = format(runtime, value, warnings);
        formatted.insert(name, value);
    }
    formatted
}

#[cfg(test)]
mod tests
{
    use super::*;
    use crate::error::HeapError;
    use crate::platform::memory::MemoryRuntime;
    use crate::types::{Address, FormattedValue, RuntimeValue};

    fn runtime() -> MemoryRuntime
    {
        let runtime = MemoryRuntime::new();
        runtime.define_class("NSObject", None, &["- description", "- hash"]);
        runtime.define_class("Session", Some("NSObject"), &["- token", "- setToken:", "+ shared"]);
        runtime
            .object(0x10, "Session")
            .ivar("_token", RuntimeValue::Bytes(vec![0xc3, 0x28]))
            .ivar("_buffer", RuntimeValue::Pointer(Address::new(0xbeef)))
            .insert();
        runtime
    }

    #[test]
    fn test_methods_filtered_without_arguments()
    {
        let runtime = runtime();

        let (class_name, methods) = get_methods_filtered(&runtime, "0x10", true).unwrap();
        assert_eq!(class_name, "Session");
        assert_eq!(methods, vec!["- token".to_string(), "+ shared".to_string()]);
    }

    #[test]
    fn test_undecodable_bytes_stay_opaque()
    {
        let runtime = runtime();

        let report = get_ivars(&runtime, "0x10", true).unwrap();
        let (_, ivars) = &report.value;
        assert_eq!(
            ivars.get("_token"),
            Some(&FormattedValue::Opaque {
                original: RuntimeValue::Bytes(vec![0xc3, 0x28]),
            })
        );
        assert_eq!(
            ivars.get("_buffer"),
            Some(&FormattedValue::RawPointerRef {
                pointer: Address::new(0xbeef),
            })
        );
        assert!(matches!(
            report.warnings.as_slice(),
            [HeapError::DecodeFailed { ivar, .. }] if ivar == "_token"
        ));
    }

    #[test]
    fn test_invalid_address_propagates()
    {
        let runtime = runtime();

        assert!(matches!(
            get_methods(&runtime, "not-a-pointer"),
            Err(HeapError::InvalidAddress(_))
        ));
        assert!(matches!(
            get_ivars(&runtime, "0x20", false),
            Err(HeapError::ResolutionFailed { .. })
        ));
    }
}
