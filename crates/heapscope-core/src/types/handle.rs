//! Non-owning handles to live objects.

use std::fmt;

use serde::Serialize;

use crate::types::Address;

/// Weak, non-owning reference to a live object in the inspected process
///
/// A handle pairs the object's address with the class name read at resolution
/// time. It does **not** keep the object alive and carries no lifetime
/// tracking: once the object is deallocated the handle is stale and must not
/// be used. The engine never caches handles; every operation re-resolves from
/// the caller's address string, and the class-name read during resolution is
/// the only staleness check performed.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize)]
pub struct ObjectHandle
{
    /// Address of the object
    pub address: Address,
    /// Class name read when the handle was resolved
    #[serde(rename = "className")]
    pub class_name: String,
}

impl ObjectHandle
{
    /// Construct a handle.
    pub fn new(address: Address, class_name: impl Into<String>) -> Self
    {
        Self {
            address,
            class_name: class_name.into(),
        }
    }
}

impl fmt::Display for ObjectHandle
{
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result
    {
        write!(f, "<{}:{}>", self.class_name, self.address)
    }
}
