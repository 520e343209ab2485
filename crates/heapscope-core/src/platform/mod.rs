//! # Runtime Host Implementations
//!
//! Hosts that implement [`ObjcRuntime`](crate::runtime::ObjcRuntime).
//!
//! - **memory**: an in-memory heap, loaded from a recorded heap dump or built
//!   programmatically for tests
//!
//! Bindings to a live instrumentation toolkit implement the same trait outside
//! this crate.

pub mod memory;

pub use memory::{MemoryRuntime, ObjectBuilder};
