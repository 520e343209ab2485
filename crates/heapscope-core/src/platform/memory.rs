//! # In-Memory Runtime
//!
//! An [`ObjcRuntime`] host whose heap lives in ordinary Rust data structures.
//!
//! It serves two purposes:
//!
//! - **Offline inspection**: a heap recorded from a real process (see
//!   [`MemoryRuntime::from_json`]) can be explored with the same operations as
//!   a live one.
//! - **Test double**: objects can be built with scripted failures
//!   (unreadable metadata, panicking hosts, broken descriptions) and every
//!   dispatch is counted, so engine invariants can be checked deterministically.
//!
//! ## Heap Dump Format
//!
//! ```json
//! {
//!   "classes": [
//!     {"name": "NSObject", "methods": ["- description"]},
//!     {"name": "Foo", "superclass": "NSObject", "methods": ["- name", "- setName:"]}
//!   ],
//!   "objects": [
//!     {
//!       "address": "0x600001130660",
//!       "class": "Foo",
//!       "ivars": [{"name": "_name", "value": {"bytes": [98, 97, 114]}}],
//!       "description": "<Foo: 0x600001130660>",
//!       "returns": {"name": {"string": "bar"}}
//!     }
//!   ]
//! }
//! ```
//!
//! Objects whose class is not listed get a root class of that name.

use std::collections::{BTreeMap, HashMap};
use std::io::Read;
use std::sync::{PoisonError, RwLock};

use serde::Deserialize;
use tracing::{debug, warn};

use crate::error::{HeapResult, HostError, HostResult};
use crate::runtime::ObjcRuntime;
use crate::types::{Address, ClassDescriptor, ClassToken, Ivar, MethodKind, MethodName, ObjectHandle, ObjectKind, RuntimeValue};

/// Script evaluator plugged into a [`MemoryRuntime`]
pub type Evaluator = Box<dyn Fn(&ObjectHandle, &str) -> Result<(), String> + Send + Sync>;

/// How a scripted object misbehaves when its metadata is read
#[derive(Debug, Clone, PartialEq, Eq)]
enum MetadataFault
{
    /// Return `HostError::Unreadable`
    Unreadable(String),
    /// Panic inside the host
    Panic(String),
}

#[derive(Debug, Clone)]
struct ClassDef
{
    name: String,
    super_class: Option<String>,
    methods: Vec<String>,
}

#[derive(Debug, Clone)]
struct ObjectDef
{
    class: String,
    kind: ObjectKind,
    ivars: Vec<Ivar>,
    description: Option<String>,
    description_fault: Option<String>,
    metadata_fault: Option<MetadataFault>,
    returns: HashMap<String, RuntimeValue>,
}

#[derive(Debug, Default)]
struct HeapState
{
    classes: Vec<ClassDef>,
    class_index: HashMap<String, usize>,
    objects: BTreeMap<u64, ObjectDef>,
    dispatches: HashMap<(u64, String), usize>,
    attempts: usize,
}

impl HeapState
{
    fn class(&self, name: &str) -> Option<&ClassDef>
    {
        self.class_index.get(name).map(|index| &self.classes[*index])
    }

    fn define(&mut self, name: &str, super_class: Option<&str>, methods: Vec<String>) -> ClassToken
    {
        let def = ClassDef {
            name: name.to_string(),
            super_class: super_class.map(str::to_string),
            methods,
        };
        let index = if let Some(index) = self.class_index.get(name) {
            self.classes[*index] = def;
            *index
        } else {
            self.classes.push(def);
            self.class_index.insert(name.to_string(), self.classes.len() - 1);
            self.classes.len() - 1
        };
        ClassToken(index as u64)
    }

    /// Class names from `name` up to its root. Stops on cycles or unknown supers.
    fn lineage(&self, name: &str) -> Vec<&ClassDef>
    {
        let mut chain: Vec<&ClassDef> = Vec::new();
        let mut current = self.class(name);
        while let Some(class) = current {
            if chain.iter().any(|seen| seen.name == class.name) {
                break;
            }
            chain.push(class);
            current = class.super_class.as_deref().and_then(|parent| self.class(parent));
        }
        chain
    }

    fn is_kind_of(&self, class: &str, ancestor: &str) -> bool
    {
        self.lineage(class).iter().any(|def| def.name == ancestor)
    }

    fn responds_to(&self, object: &ObjectDef, selector: &str) -> bool
    {
        self.lineage(&object.class).iter().any(|class| {
            class.methods.iter().any(|entry| {
                entry
                    .parse::<MethodName>()
                    .is_ok_and(|method| method.kind == MethodKind::Instance && method.selector == selector)
            })
        })
    }

    fn object(&self, address: Address) -> HostResult<&ObjectDef>
    {
        self.objects.get(&address.value()).ok_or(HostError::NotAnObject(address))
    }
}

/// In-memory Objective-C heap
///
/// All state sits behind a `RwLock`, so the runtime can be shared by reference
/// while dispatch counters are updated.
///
/// ## Example
///
/// ```rust
/// use heapscope_core::platform::memory::MemoryRuntime;
/// use heapscope_core::types::RuntimeValue;
///
/// let runtime = MemoryRuntime::new();
/// runtime.define_class("NSObject", None, &["- description"]);
/// runtime.define_class("Foo", Some("NSObject"), &["- name"]);
/// runtime
///     .object(0x1000, "Foo")
///     .ivar("_name", RuntimeValue::String("bar".to_string()))
///     .returns("name", RuntimeValue::String("bar".to_string()))
///     .insert();
/// ```
#[derive(Default)]
pub struct MemoryRuntime
{
    state: RwLock<HeapState>,
    evaluator: Option<Evaluator>,
}

impl MemoryRuntime
{
    /// Create an empty heap.
    pub fn new() -> Self
    {
        Self::default()
    }

    /// Register (or redefine) a class.
    ///
    /// `methods` are own methods in `"- selector"` / `"+ selector"` form.
    pub fn define_class(&self, name: &str, super_class: Option<&str>, methods: &[&str]) -> ClassToken
    {
        let methods = methods.iter().map(|method| (*method).to_string()).collect();
        self.write().define(name, super_class, methods)
    }

    /// Start building an object at `address` of class `class`.
    ///
    /// Nothing is added until [`ObjectBuilder::insert`] is called.
    pub fn object(&self, address: u64, class: &str) -> ObjectBuilder<'_>
    {
        ObjectBuilder {
            runtime: self,
            address,
            def: ObjectDef {
                class: class.to_string(),
                kind: ObjectKind::Instance,
                ivars: Vec::new(),
                description: None,
                description_fault: None,
                metadata_fault: None,
                returns: HashMap::new(),
            },
        }
    }

    /// Remove an object, as if it had been deallocated.
    ///
    /// Returns whether an object was present.
    pub fn deallocate(&self, address: u64) -> bool
    {
        self.write().objects.remove(&address).is_some()
    }

    /// Number of live objects
    pub fn object_count(&self) -> usize
    {
        self.read().objects.len()
    }

    /// How many times `selector` was dispatched to the object at `address`
    pub fn dispatch_count(&self, address: u64, selector: &str) -> usize
    {
        self.read()
            .dispatches
            .get(&(address, selector.to_string()))
            .copied()
            .unwrap_or(0)
    }

    /// Total number of completed dispatches to any object
    pub fn total_dispatches(&self) -> usize
    {
        self.read().dispatches.values().sum()
    }

    /// Number of [`ObjcRuntime::dispatch`] calls, including ones the host rejected
    pub fn dispatch_attempts(&self) -> usize
    {
        self.read().attempts
    }

    /// Install a script evaluator.
    ///
    /// Without one, [`ObjcRuntime::evaluate`] reports `Unsupported`.
    #[must_use]
    pub fn with_evaluator<F>(mut self, evaluator: F) -> Self
    where
        F: Fn(&ObjectHandle, &str) -> Result<(), String> + Send + Sync + 'static,
    {
        self.evaluator = Some(Box::new(evaluator));
        self
    }

    /// Load a heap dump from JSON text.
    ///
    /// ## Errors
    ///
    /// `HeapDump` if the document does not match the dump format.
    pub fn from_json(json: &str) -> HeapResult<Self>
    {
        let dump: HeapDump = serde_json::from_str(json)?;
        Ok(Self::from_dump(dump))
    }

    /// Load a heap dump from a reader.
    ///
    /// ## Errors
    ///
    /// `Io` if reading fails, `HeapDump` if the document is malformed.
    pub fn from_reader(mut reader: impl Read) -> HeapResult<Self>
    {
        let mut json = String::new();
        reader.read_to_string(&mut json)?;
        Self::from_json(&json)
    }

    fn from_dump(dump: HeapDump) -> Self
    {
        let runtime = Self::new();
        {
            let mut state = runtime.write();
            for class in dump.classes {
                state.define(&class.name, class.superclass.as_deref(), class.methods);
            }
            for object in dump.objects {
                if state.class(&object.class).is_none() {
                    warn!(class = %object.class, address = %object.address, "Object of unlisted class; registering it as a root class");
                    state.define(&object.class, None, Vec::new());
                }
                state.objects.insert(
                    object.address.value(),
                    ObjectDef {
                        class: object.class,
                        kind: object.kind,
                        ivars: object.ivars,
                        description: object.description,
                        description_fault: None,
                        metadata_fault: None,
                        returns: object.returns.into_iter().collect(),
                    },
                );
            }
            debug!(classes = state.classes.len(), objects = state.objects.len(), "Loaded heap dump");
        }
        runtime
    }

    fn read(&self) -> std::sync::RwLockReadGuard<'_, HeapState>
    {
        self.state.read().unwrap_or_else(PoisonError::into_inner)
    }

    fn write(&self) -> std::sync::RwLockWriteGuard<'_, HeapState>
    {
        self.state.write().unwrap_or_else(PoisonError::into_inner)
    }
}

impl ObjcRuntime for MemoryRuntime
{
    fn lookup_class(&self, name: &str) -> Option<ClassToken>
    {
        self.read()
            .class_index
            .get(name)
            .map(|index| ClassToken(*index as u64))
    }

    fn choose(&self, class: ClassToken, include_subclasses: bool) -> HostResult<Vec<Address>>
    {
        let state = self.read();
        let target = usize::try_from(class.raw())
            .ok()
            .and_then(|index| state.classes.get(index))
            .ok_or_else(|| HostError::Unreadable(format!("stale class token {}", class.raw())))?;

        Ok(state
            .objects
            .iter()
            .filter(|(_, object)| {
                object.class == target.name || (include_subclasses && state.is_kind_of(&object.class, &target.name))
            })
            .map(|(address, _)| Address::new(*address))
            .collect())
    }

    fn resolve_address(&self, address: Address) -> HostResult<Address>
    {
        self.read().object(address).map(|_| address)
    }

    fn metadata(&self, object: Address) -> HostResult<ClassDescriptor>
    {
        let state = self.read();
        let def = state.object(object)?;

        match &def.metadata_fault {
            Some(MetadataFault::Unreadable(reason)) => return Err(HostError::Unreadable(reason.clone())),
            Some(MetadataFault::Panic(reason)) => panic!("{reason}"),
            None => {}
        }

        let class = state.class(&def.class);
        Ok(ClassDescriptor {
            class_name: def.class.clone(),
            super_class_name: class.and_then(|class| class.super_class.clone()),
            kind: def.kind,
            own_methods: class.map(|class| class.methods.clone()).unwrap_or_default(),
            own_ivars: def.ivars.clone(),
        })
    }

    fn responds_to(&self, object: Address, selector: &str) -> bool
    {
        let state = self.read();
        state
            .object(object)
            .is_ok_and(|def| state.responds_to(def, selector))
    }

    fn dispatch(&self, object: Address, selector: &str, args: &[RuntimeValue]) -> HostResult<RuntimeValue>
    {
        let mut state = self.write();
        state.attempts += 1;
        let def = state.object(object)?;
        if !state.responds_to(def, selector) {
            return Err(HostError::SelectorNotFound(selector.to_string()));
        }
        let expected = selector.matches(':').count();
        if args.len() != expected {
            return Err(HostError::Fault(format!(
                "{selector} expects {expected} argument(s), got {}",
                args.len()
            )));
        }

        let value = match def.returns.get(selector) {
            Some(value) => value.clone(),
            None if selector == "description" => RuntimeValue::String(describe(object, def)?),
            None => RuntimeValue::Nil,
        };
        *state.dispatches.entry((object.value(), selector.to_string())).or_insert(0) += 1;
        Ok(value)
    }

    fn description(&self, object: Address) -> HostResult<String>
    {
        let state = self.read();
        describe(object, state.object(object)?)
    }

    fn evaluate(&self, handle: &ObjectHandle, source: &str) -> HostResult<()>
    {
        let Some(evaluator) = &self.evaluator else {
            return Err(HostError::Unsupported(format!("no script engine attached for {handle}")));
        };
        evaluator(handle, source).map_err(HostError::Fault)
    }
}

fn describe(address: Address, def: &ObjectDef) -> HostResult<String>
{
    if let Some(fault) = &def.description_fault {
        return Err(HostError::Fault(fault.clone()));
    }
    Ok(def
        .description
        .clone()
        .unwrap_or_else(|| format!("<{}: {address}>", def.class)))
}

/// Builder for one object in a [`MemoryRuntime`]
#[must_use = "objects are only added by calling insert()"]
pub struct ObjectBuilder<'a>
{
    runtime: &'a MemoryRuntime,
    address: u64,
    def: ObjectDef,
}

impl ObjectBuilder<'_>
{
    /// Set the object kind (default: instance).
    pub fn kind(mut self, kind: ObjectKind) -> Self
    {
        self.def.kind = kind;
        self
    }

    /// Append an ivar slot.
    pub fn ivar(mut self, name: &str, value: RuntimeValue) -> Self
    {
        self.def.ivars.push(Ivar::new(name, value));
        self
    }

    /// Set the default textual representation.
    pub fn description(mut self, text: &str) -> Self
    {
        self.def.description = Some(text.to_string());
        self
    }

    /// Make `description` fail with a host fault.
    pub fn failing_description(mut self, reason: &str) -> Self
    {
        self.def.description_fault = Some(reason.to_string());
        self
    }

    /// Make metadata reads fail as unreadable memory.
    pub fn unreadable_metadata(mut self, reason: &str) -> Self
    {
        self.def.metadata_fault = Some(MetadataFault::Unreadable(reason.to_string()));
        self
    }

    /// Make metadata reads panic inside the host.
    pub fn panicking_metadata(mut self, reason: &str) -> Self
    {
        self.def.metadata_fault = Some(MetadataFault::Panic(reason.to_string()));
        self
    }

    /// Set the value returned when `selector` is dispatched.
    pub fn returns(mut self, selector: &str, value: RuntimeValue) -> Self
    {
        self.def.returns.insert(selector.to_string(), value);
        self
    }

    /// Add the object to the heap, replacing any object at the same address.
    pub fn insert(self)
    {
        self.runtime.write().objects.insert(self.address, self.def);
    }
}

#[derive(Debug, Deserialize)]
struct HeapDump
{
    #[serde(default)]
    classes: Vec<ClassRecord>,
    #[serde(default)]
    objects: Vec<ObjectRecord>,
}

#[derive(Debug, Deserialize)]
struct ClassRecord
{
    name: String,
    #[serde(default)]
    superclass: Option<String>,
    #[serde(default)]
    methods: Vec<String>,
}

#[derive(Debug, Deserialize)]
struct ObjectRecord
{
    address: Address,
    class: String,
    #[serde(default)]
    kind: ObjectKind,
    #[serde(default)]
    ivars: Vec<Ivar>,
    #[serde(default)]
    description: Option<String>,
    #[serde(default)]
    returns: BTreeMap<String, RuntimeValue>,
}

#[cfg(test)]
mod tests
{
    use super::*;

    const DUMP: &str = r#"{
        "classes": [
            {"name": "NSObject", "methods": ["- description", "+ alloc"]},
            {"name": "Foo", "superclass": "NSObject", "methods": ["- name"]}
        ],
        "objects": [
            {
                "address": "0x1000",
                "class": "Foo",
                "ivars": [{"name": "_name", "value": {"bytes": [98, 97, 114]}}],
                "returns": {"name": {"string": "bar"}}
            },
            {"address": "4096000", "class": "Orphan", "kind": "block"}
        ]
    }"#;

    #[test]
    fn test_from_json()
    {
        let runtime = MemoryRuntime::from_json(DUMP).unwrap();
        assert_eq!(runtime.object_count(), 2);

        let foo = runtime.metadata(Address::new(0x1000)).unwrap();
        assert_eq!(foo.class_name, "Foo");
        assert_eq!(foo.super_class_name.as_deref(), Some("NSObject"));
        assert_eq!(foo.own_methods, vec!["- name".to_string()]);
        assert_eq!(foo.own_ivars, vec![Ivar::new("_name", RuntimeValue::Bytes(b"bar".to_vec()))]);

        let orphan = runtime.metadata(Address::new(4_096_000)).unwrap();
        assert_eq!(orphan.kind, ObjectKind::Block);
        assert!(runtime.lookup_class("Orphan").is_some());
    }

    #[test]
    fn test_from_json_rejects_malformed_dump()
    {
        assert!(MemoryRuntime::from_json(r#"{"objects": [{"address": "zz", "class": "Foo"}]}"#).is_err());
        assert!(MemoryRuntime::from_json("not a heap dump").is_err());
    }

    #[test]
    fn test_responds_through_hierarchy()
    {
        let runtime = MemoryRuntime::from_json(DUMP).unwrap();
        let foo = Address::new(0x1000);

        assert!(runtime.responds_to(foo, "name"));
        assert!(runtime.responds_to(foo, "description"));
        assert!(!runtime.responds_to(foo, "alloc"));
        assert!(!runtime.responds_to(foo, "missing"));
    }

    #[test]
    fn test_dispatch_counts_and_returns()
    {
        let runtime = MemoryRuntime::from_json(DUMP).unwrap();
        let foo = Address::new(0x1000);

        assert_eq!(runtime.dispatch(foo, "name", &[]), Ok(RuntimeValue::String("bar".to_string())));
        assert_eq!(
            runtime.dispatch(foo, "description", &[]),
            Ok(RuntimeValue::String("<Foo: 0x1000>".to_string()))
        );
        assert_eq!(
            runtime.dispatch(foo, "missing", &[]),
            Err(HostError::SelectorNotFound("missing".to_string()))
        );
        assert_eq!(
            runtime.dispatch(foo, "name:", &[]),
            Err(HostError::SelectorNotFound("name:".to_string()))
        );
        assert_eq!(runtime.dispatch_count(0x1000, "name"), 1);
        assert_eq!(runtime.total_dispatches(), 2);
        assert_eq!(runtime.dispatch_attempts(), 4);
    }

    #[test]
    fn test_deallocated_object_no_longer_resolves()
    {
        let runtime = MemoryRuntime::from_json(DUMP).unwrap();
        assert!(runtime.deallocate(0x1000));
        assert_eq!(
            runtime.resolve_address(Address::new(0x1000)),
            Err(HostError::NotAnObject(Address::new(0x1000)))
        );
    }

    #[test]
    fn test_evaluate_without_engine_is_unsupported()
    {
        let runtime = MemoryRuntime::from_json(DUMP).unwrap();
        let handle = ObjectHandle::new(Address::new(0x1000), "Foo");
        assert!(matches!(runtime.evaluate(&handle, "1 + 1"), Err(HostError::Unsupported(_))));
    }
}
