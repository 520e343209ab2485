//! # Heap Inspector
//!
//! Facade bundling a host with the caller-facing operations.
//!
//! Each method is a single-shot query. Nothing is cached between calls: every
//! address is re-resolved from scratch, so the only identity carried between
//! calls is the address string the caller passes back in.
//!
//! ## Example
//!
//! ```rust
//! use heapscope_core::platform::memory::MemoryRuntime;
//! use heapscope_core::types::RuntimeValue;
//! use heapscope_core::{EnumerateOptions, HeapInspector};
//!
//! let runtime = MemoryRuntime::new();
//! runtime.define_class("NSObject", None, &["- description"]);
//! runtime.define_class("Foo", Some("NSObject"), &["- name"]);
//! runtime
//!     .object(0x1000, "Foo")
//!     .ivar("_name", RuntimeValue::Bytes(b"bar".to_vec()))
//!     .insert();
//!
//! let inspector = HeapInspector::new(runtime);
//! let instances = inspector.instances("NSObject", EnumerateOptions::default());
//! assert_eq!(instances.value.len(), 1);
//!
//! let (class_name, ivars) = inspector.ivars(&instances.value[0].handle, true)?.value;
//! assert_eq!(class_name, "Foo");
//! assert_eq!(ivars.get("_name").map(|value| value.tag()), Some("Primitive"));
//! # Ok::<(), heapscope_core::error::HeapError>(())
//! ```

use crate::diagnostics::Report;
use crate::enumerator::{enumerate, EnumerateOptions};
use crate::error::HeapResult;
use crate::invoke::{invoke, InvocationResult};
use crate::reflector::{get_ivars, get_methods_filtered};
use crate::resolver::resolve;
use crate::runtime::ObjcRuntime;
use crate::types::{InstanceSnapshot, IvarMap, ObjectHandle};

/// Heap inspection operations over a runtime host
pub struct HeapInspector<R>
{
    runtime: R,
}

impl<R: ObjcRuntime> HeapInspector<R>
{
    /// Wrap a host.
    pub fn new(runtime: R) -> Self
    {
        Self { runtime }
    }

    /// Borrow the host.
    pub fn runtime(&self) -> &R
    {
        &self.runtime
    }

    /// Resolve an address string to a handle. See [`crate::resolver::resolve`].
    ///
    /// ## Errors
    ///
    /// `InvalidAddress` or `ResolutionFailed`.
    pub fn resolve(&self, address: &str) -> HeapResult<ObjectHandle>
    {
        resolve(&self.runtime, address)
    }

    /// Live instances of a class and its subclasses. See [`crate::enumerator::enumerate`].
    pub fn instances(&self, class_name: &str, options: EnumerateOptions) -> Report<Vec<InstanceSnapshot>>
    {
        enumerate(&self.runtime, class_name, options)
    }

    /// Own ivars of an object. See [`crate::reflector::get_ivars`].
    ///
    /// ## Errors
    ///
    /// `InvalidAddress` or `ResolutionFailed`.
    pub fn ivars(&self, address: &str, decode_utf8: bool) -> HeapResult<Report<(String, IvarMap)>>
    {
        get_ivars(&self.runtime, address, decode_utf8)
    }

    /// Own methods of an object's class. See [`crate::reflector::get_methods_filtered`].
    ///
    /// ## Errors
    ///
    /// `InvalidAddress` or `ResolutionFailed`.
    pub fn methods(&self, address: &str, without_arguments: bool) -> HeapResult<(String, Vec<String>)>
    {
        get_methods_filtered(&self.runtime, address, without_arguments)
    }

    /// Invoke a nullary selector exactly once. See [`crate::invoke::invoke`].
    ///
    /// ## Errors
    ///
    /// `InvalidAddress`, `ResolutionFailed`, `UnsupportedSignature`,
    /// `NoSuchMethod` or `InvocationFailed`.
    pub fn invoke(&self, address: &str, selector: &str, stringify: bool) -> HeapResult<InvocationResult>
    {
        invoke(&self.runtime, address, selector, stringify)
    }

    /// Evaluate script source against an object. **Not sandboxed**; see [`crate::evaluate`].
    ///
    /// ## Errors
    ///
    /// `InvalidAddress`, `ResolutionFailed` or `EvaluationFailed`.
    pub fn evaluate(&self, address: &str, source: &str) -> HeapResult<()>
    {
        crate::evaluate::evaluate(&self.runtime, address, source)
    }
}
