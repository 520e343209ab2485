//! Point-in-time projections of enumerated instances.

use serde::Serialize;

use crate::types::{IvarMap, ObjectKind};

/// Immutable projection of one live instance
///
/// Built once per enumerated object and never mutated afterwards. Snapshots
/// are independent of each other; a failure building one never affects
/// another.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct InstanceSnapshot
{
    /// Class of the instance (may be a subclass of the requested class)
    pub class_name: String,
    /// Address of the instance in handle form (`0x...`)
    pub handle: String,
    /// Kind of entity
    pub kind: ObjectKind,
    /// Superclass name, `None` for root classes
    #[serde(rename = "superClass")]
    pub super_class_name: Option<String>,
    /// Methods declared directly on the instance's class
    pub methods: Vec<String>,
    /// Formatted ivars, present only when requested
    #[serde(skip_serializing_if = "Option::is_none")]
    pub ivars: Option<IvarMap>,
}
