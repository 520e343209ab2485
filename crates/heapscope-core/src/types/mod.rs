//! # Types
//!
//! Data model shared by the engine and by hosts.
//!
//! Every type here is a derived, read-only view computed fresh per call.
//! Nothing persists across calls except the address strings callers pass back in.

pub mod address;
pub mod class;
pub mod handle;
pub mod snapshot;
pub mod value;

// Re-export all public types
pub use address::Address;
pub use class::{selector_takes_arguments, ClassDescriptor, ClassToken, Ivar, MethodKind, MethodName, ObjectKind};
pub use handle::ObjectHandle;
pub use snapshot::InstanceSnapshot;
pub use value::{FormattedValue, IvarMap, Primitive, RuntimeValue};
