//! # Pointer Resolver
//!
//! Turns an address string into an [`ObjectHandle`].
//!
//! Resolution is best effort. The address may not point at a live object with
//! the metadata layout the host expects; that outcome is reported as
//! [`HeapError::ResolutionFailed`], never propagated as a fault.

use tracing::debug;

use crate::boundary::guarded;
use crate::error::{HeapError, HeapResult, HostError};
use crate::runtime::ObjcRuntime;
use crate::types::{Address, ClassDescriptor, ObjectHandle};

/// Resolve an address string to a handle.
///
/// ## Errors
///
/// - `InvalidAddress`: `address` is not hex (`0x...`) or decimal
/// - `ResolutionFailed`: the host could not bind or read an object there
pub fn resolve<R: ObjcRuntime + ?Sized>(runtime: &R, address: &str) -> HeapResult<ObjectHandle>
{
    let (handle, _) = resolve_with_metadata(runtime, address.parse()?)?;
    Ok(handle)
}

/// Resolve an already-parsed address, returning the metadata read on the way.
///
/// The reflector and the snapshot builder need the full descriptor; reading it
/// once here avoids a second metadata round trip to the host.
pub(crate) fn resolve_with_metadata<R: ObjcRuntime + ?Sized>(
    runtime: &R,
    address: Address,
) -> HeapResult<(ObjectHandle, ClassDescriptor)>
{
    let failed = |error: HostError| HeapError::ResolutionFailed {
        address,
        details: error.to_string(),
    };

    let object = guarded("resolve_address", || runtime.resolve_address(address)).map_err(failed)?;
    let descriptor = guarded("metadata", || runtime.metadata(object)).map_err(failed)?;

    debug!(address = %object, class = %descriptor.class_name, "Resolved object");
    Ok((ObjectHandle::new(object, descriptor.class_name.clone()), descriptor))
}
