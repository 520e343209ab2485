//! # heapscope-core
//!
//! Runtime reflection and value formatting for live Objective-C heaps.
//!
//! This crate provides the inspection engine used by the `heapscope` CLI:
//! - Enumerating live instances of a class (subclasses included)
//! - Reading and formatting an object's own instance variables
//! - Listing the methods declared on an object's class
//! - Invoking nullary methods by name, exactly once
//! - Evaluating ad-hoc scripts against an object (unsandboxed)
//!
//! ## Hosts
//!
//! The engine never touches a process directly. It talks to an instrumentation
//! host through the [`ObjcRuntime`] trait. [`MemoryRuntime`] implements it over
//! an in-memory heap (recorded dumps and tests); bindings to a live toolkit
//! implement it elsewhere.
//!
//! ## Failure model
//!
//! Every host call crosses [`boundary::guarded`], which converts host errors
//! and panics into classified [`HeapError`]s. Non-fatal failures (an unknown
//! class, one unreadable instance, an undecodable buffer) are reported as
//! warnings in a [`Report`] next to a best-effort result. A host that crashes
//! the process outright cannot be caught; that risk is accepted.

pub mod boundary;
pub mod diagnostics;
pub mod enumerator;
pub mod error;
pub mod evaluate;
pub mod formatter;
pub mod inspector;
pub mod invoke;
pub mod platform;
pub mod prelude;
pub mod reflector;
pub mod resolver;
pub mod runtime;
pub mod types;

// Re-export commonly used types
pub use diagnostics::Report;
pub use enumerator::EnumerateOptions;
pub use error::{HeapError, HeapResult, HostError, HostResult};
pub use inspector::HeapInspector;
pub use invoke::InvocationResult;
pub use platform::memory::MemoryRuntime;
pub use runtime::ObjcRuntime;
