//! Common module for library exports

pub use crate::diagnostics::Report;
pub use crate::enumerator::EnumerateOptions;
pub use crate::error::{HeapError, HeapResult, HostError, HostResult};
pub use crate::inspector::HeapInspector;
pub use crate::invoke::InvocationResult;
pub use crate::platform::memory::MemoryRuntime;
pub use crate::runtime::ObjcRuntime;
pub use crate::types::{Address, FormattedValue, InstanceSnapshot, IvarMap, ObjectHandle, ObjectKind, Primitive, RuntimeValue};
