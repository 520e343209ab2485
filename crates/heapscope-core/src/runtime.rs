//! # Runtime Host Trait
//!
//! The interface the engine expects from the instrumentation host.
//!
//! The host owns everything about the inspected process: attaching to it,
//! reading its class registry, binding addresses to objects, sending messages.
//! The engine only ever talks to it through this trait, which keeps the
//! reflection logic independent of any particular instrumentation toolkit and
//! lets tests substitute [`MemoryRuntime`](crate::platform::memory::MemoryRuntime).
//!
//! ## Safety posture
//!
//! Several primitives are unsafe *by nature* in a real host: binding an
//! arbitrary address to an object or dispatching a selector can fault the
//! inspected process. The engine calls every primitive through
//! [`crate::boundary`], which turns reported errors and panics into classified
//! [`HeapError`](crate::error::HeapError)s. A hard crash of the host process is
//! outside what any in-process wrapper can catch and remains an accepted risk.

use crate::error::HostResult;
use crate::types::{Address, ClassDescriptor, ClassToken, ObjectHandle, RuntimeValue};

/// Objective-C runtime host
///
/// All methods take `&self`: the engine is single-threaded and request/response,
/// and hosts that track state (dispatch counters, evaluation logs) use interior
/// mutability.
///
/// ## Thread Safety
///
/// The engine never calls a host from more than one thread at a time. The
/// inspected process, however, keeps running and mutating its heap between and
/// during calls; every answer is a best-effort snapshot.
pub trait ObjcRuntime
{
    /// Look up a class in the live class registry
    ///
    /// Returns `None` when no class of that name is registered.
    fn lookup_class(&self, name: &str) -> Option<ClassToken>;

    /// Snapshot the live instances of a class
    ///
    /// With `include_subclasses` set, instances of every registered descendant
    /// are returned as well. Objects created or freed after the call are not
    /// reflected. No ordering is guaranteed.
    fn choose(&self, class: ClassToken, include_subclasses: bool) -> HostResult<Vec<Address>>;

    /// Bind a raw address to an object reference
    ///
    /// Returns the address of the bound object. Real hosts may fault here when
    /// the address does not point at a well-formed object.
    fn resolve_address(&self, address: Address) -> HostResult<Address>;

    /// Read class metadata and the ivar table of an object
    fn metadata(&self, object: Address) -> HostResult<ClassDescriptor>;

    /// Whether the object (or anything in its class hierarchy) implements `selector`
    fn responds_to(&self, object: Address, selector: &str) -> bool;

    /// Send `selector` to the object with the given arguments
    ///
    /// Fails with [`HostError::SelectorNotFound`](crate::error::HostError::SelectorNotFound)
    /// when the receiver does not implement it.
    fn dispatch(&self, object: Address, selector: &str, args: &[RuntimeValue]) -> HostResult<RuntimeValue>;

    /// Default textual representation of the object (its `description`)
    fn description(&self, object: Address) -> HostResult<String>;

    /// Evaluate script source with `handle` bound as `ptr`
    ///
    /// This is an unsandboxed escape hatch: the script runs with the full
    /// capabilities of the host's execution context. Hosts without a script
    /// engine return [`HostError::Unsupported`](crate::error::HostError::Unsupported),
    /// which is what the default implementation does.
    fn evaluate(&self, handle: &ObjectHandle, _source: &str) -> HostResult<()>
    {
        Err(crate::error::HostError::Unsupported(format!(
            "script evaluation for {handle}"
        )))
    }
}
