//! # Class/Instance Enumerator
//!
//! Finds every live instance of a class, subclasses included, and projects
//! each into an [`InstanceSnapshot`].
//!
//! Partial failure never aborts the batch: an instance whose snapshot cannot be
//! built is skipped with a `SnapshotFailed` warning and the rest are still
//! returned. An unknown class is not an error either; it yields an empty result
//! with an `UnknownClass` warning, so at the data level "no such class" and
//! "no live instances" look the same.

use tracing::debug;

use crate::boundary::{guarded, guarded_value};
use crate::diagnostics::{Report, Warnings};
use crate::error::HeapError;
use crate::reflector::format_ivars;
use crate::resolver::resolve_with_metadata;
use crate::runtime::ObjcRuntime;
use crate::types::{Address, InstanceSnapshot};

/// Options for [`enumerate`]
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct EnumerateOptions
{
    /// Attach formatted ivars to each snapshot
    pub include_ivars: bool,
    /// Decode byte-buffer ivars as UTF-8 first (only with `include_ivars`)
    pub decode_utf8: bool,
}

/// Enumerate live instances of `class_name` and its subclasses.
///
/// Subclass instances are always included. The instance set is whatever the
/// host saw at call time; no ordering is guaranteed.
pub fn enumerate<R: ObjcRuntime + ?Sized>(
    runtime: &R,
    class_name: &str,
    options: EnumerateOptions,
) -> Report<Vec<InstanceSnapshot>>
{
    let mut warnings = Warnings::new();

    let class = match guarded_value("lookup_class", || runtime.lookup_class(class_name)) {
        Ok(Some(class)) => class,
        Ok(None) => {
            warnings.raise(HeapError::UnknownClass(class_name.to_string()));
            return warnings.into_report(Vec::new());
        }
        Err(error) => {
            warnings.raise(HeapError::SnapshotFailed {
                instance: class_name.to_string(),
                details: error.to_string(),
            });
            return warnings.into_report(Vec::new());
        }
    };

    let instances = match guarded("choose", || runtime.choose(class, true)) {
        Ok(instances) => instances,
        Err(error) => {
            warnings.raise(HeapError::SnapshotFailed {
                instance: class_name.to_string(),
                details: error.to_string(),
            });
            return warnings.into_report(Vec::new());
        }
    };
    debug!(class = class_name, count = instances.len(), "Chose live instances");

    let snapshots = instances
        .into_iter()
        .filter_map(|address| match snapshot(runtime, address, options, &mut warnings) {
            Ok(snapshot) => Some(snapshot),
            Err(error) => {
                warnings.raise(HeapError::SnapshotFailed {
                    instance: address.to_string(),
                    details: error.to_string(),
                });
                None
            }
        })
        .collect();

    warnings.into_report(snapshots)
}

fn snapshot<R: ObjcRuntime + ?Sized>(
    runtime: &R,
    address: Address,
    options: EnumerateOptions,
    warnings: &mut Warnings,
) -> Result<InstanceSnapshot, HeapError>
{
    let (handle, descriptor) = resolve_with_metadata(runtime, address)?;

    let ivars = options
        .include_ivars
        .then(|| format_ivars(runtime, descriptor.own_ivars, options.decode_utf8, warnings));

    Ok(InstanceSnapshot {
        class_name: handle.class_name,
        handle: handle.address.to_string(),
        kind: descriptor.kind,
        super_class_name: descriptor.super_class_name,
        methods: descriptor.own_methods,
        ivars,
    })
}

#[cfg(test)]
mod tests
{
    use super::*;
    use crate::error::{HostError, HostResult};
    use crate::platform::memory::MemoryRuntime;
    use crate::types::{ClassDescriptor, ClassToken, ObjectKind, RuntimeValue};

    /// Host whose class registry faults on every lookup
    struct FaultingRegistry;

    impl ObjcRuntime for FaultingRegistry
    {
        fn lookup_class(&self, _name: &str) -> Option<ClassToken>
        {
            panic!("objc_getClass faulted")
        }

        fn choose(&self, _class: ClassToken, _include_subclasses: bool) -> HostResult<Vec<Address>>
        {
            Ok(Vec::new())
        }

        fn resolve_address(&self, address: Address) -> HostResult<Address>
        {
            Err(HostError::NotAnObject(address))
        }

        fn metadata(&self, object: Address) -> HostResult<ClassDescriptor>
        {
            Err(HostError::NotAnObject(object))
        }

        fn responds_to(&self, _object: Address, _selector: &str) -> bool
        {
            false
        }

        fn dispatch(&self, object: Address, _selector: &str, _args: &[RuntimeValue]) -> HostResult<RuntimeValue>
        {
            Err(HostError::NotAnObject(object))
        }

        fn description(&self, object: Address) -> HostResult<String>
        {
            Err(HostError::NotAnObject(object))
        }
    }

    fn runtime() -> MemoryRuntime
    {
        let runtime = MemoryRuntime::new();
        runtime.define_class("NSObject", None, &["- description"]);
        runtime.define_class("Animal", Some("NSObject"), &["- speak"]);
        runtime.define_class("Dog", Some("Animal"), &["- fetch"]);
        runtime.define_class("Rock", Some("NSObject"), &[]);
        runtime.object(0x100, "Animal").insert();
        runtime.object(0x200, "Dog").ivar("_name", RuntimeValue::Bytes(b"rex".to_vec())).insert();
        runtime.object(0x300, "Rock").insert();
        runtime
    }

    #[test]
    fn test_snapshot_fields()
    {
        let runtime = runtime();
        let report = enumerate(&runtime, "Dog", EnumerateOptions::default());

        assert!(!report.has_warnings());
        let [dog] = report.value.as_slice() else {
            panic!("expected one Dog, got {:?}", report.value);
        };
        assert_eq!(dog.class_name, "Dog");
        assert_eq!(dog.handle, "0x200");
        assert_eq!(dog.super_class_name.as_deref(), Some("Animal"));
        assert_eq!(dog.methods, vec!["- fetch".to_string()]);
        assert!(dog.ivars.is_none());
    }

    #[test]
    fn test_ivars_on_request()
    {
        let runtime = runtime();
        let options = EnumerateOptions {
            include_ivars: true,
            decode_utf8: true,
        };
        let report = enumerate(&runtime, "Dog", options);

        let ivars = report.value[0].ivars.as_ref().unwrap();
        assert_eq!(ivars.len(), 1);
        assert_eq!(ivars.get("_name").unwrap().tag(), "Primitive");
    }

    #[test]
    fn test_unknown_class_is_empty_with_warning()
    {
        let runtime = runtime();
        let report = enumerate(&runtime, "Unicorn", EnumerateOptions::default());

        assert!(report.value.is_empty());
        assert!(matches!(report.warnings.as_slice(), [HeapError::UnknownClass(name)] if name == "Unicorn"));
    }

    #[test]
    fn test_faulting_class_lookup_is_a_warning()
    {
        let report = enumerate(&FaultingRegistry, "Foo", EnumerateOptions::default());

        assert!(report.value.is_empty());
        match report.warnings.as_slice() {
            [HeapError::SnapshotFailed { instance, details }] => {
                assert_eq!(instance, "Foo");
                assert!(details.contains("objc_getClass faulted"));
            }
            other => panic!("expected one SnapshotFailed, got {other:?}"),
        }
    }

    #[test]
    fn test_non_instance_kinds_are_reported()
    {
        let runtime = runtime();
        runtime.define_class("__NSMallocBlock__", Some("NSObject"), &["- invoke"]);
        runtime.object(0x500, "__NSMallocBlock__").kind(ObjectKind::Block).insert();
        runtime.define_class("NSProxy", None, &["- forwardInvocation:"]);
        runtime.object(0x600, "NSProxy").kind(ObjectKind::Proxy).insert();

        let report = enumerate(&runtime, "__NSMallocBlock__", EnumerateOptions::default());
        assert_eq!(report.value.len(), 1);
        assert_eq!(report.value[0].kind, ObjectKind::Block);

        let report = enumerate(&runtime, "NSProxy", EnumerateOptions::default());
        assert_eq!(report.value.len(), 1);
        assert_eq!(report.value[0].kind, ObjectKind::Proxy);
        assert_eq!(report.value[0].super_class_name, None);
    }
}
