//! Class metadata as reported by the runtime.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::types::RuntimeValue;

/// Opaque token for a class registered in the runtime's class registry
///
/// Produced by [`ObjcRuntime::lookup_class`](crate::runtime::ObjcRuntime::lookup_class)
/// and only meaningful to the host that issued it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ClassToken(pub u64);

impl ClassToken
{
    /// Get the raw host-specific value
    pub fn raw(&self) -> u64
    {
        self.0
    }
}

/// What sort of runtime entity an object reference denotes
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum ObjectKind
{
    /// Ordinary object instance
    #[default]
    Instance,
    /// Class object
    Class,
    /// Meta-class object
    MetaClass,
    /// Block literal (closure)
    Block,
    /// Proxy forwarding to another object
    Proxy,
}

impl fmt::Display for ObjectKind
{
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result
    {
        let label = match self {
            ObjectKind::Instance => "instance",
            ObjectKind::Class => "class",
            ObjectKind::MetaClass => "meta-class",
            ObjectKind::Block => "block",
            ObjectKind::Proxy => "proxy",
        };
        write!(f, "{label}")
    }
}

/// One slot of an object's instance-variable table
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Ivar
{
    /// Declared name, e.g. `_name`
    pub name: String,
    /// Raw value read from the slot
    pub value: RuntimeValue,
}

impl Ivar
{
    /// Construct an ivar slot.
    pub fn new(name: impl Into<String>, value: RuntimeValue) -> Self
    {
        Self {
            name: name.into(),
            value,
        }
    }
}

/// Metadata describing a live object and its class
///
/// Returned by [`ObjcRuntime::metadata`](crate::runtime::ObjcRuntime::metadata).
/// Both member lists are scoped to the object's own class:
///
/// - `own_methods` holds only methods declared directly on the class, in the
///   runtime's `"- selector"` / `"+ selector"` form
/// - `own_ivars` is the runtime's ivar table for the object, in native order
#[derive(Debug, Clone, PartialEq)]
pub struct ClassDescriptor
{
    /// Name of the object's class
    pub class_name: String,
    /// Name of the superclass (`None` for root classes)
    pub super_class_name: Option<String>,
    /// Kind of entity
    pub kind: ObjectKind,
    /// Methods declared directly on the class
    pub own_methods: Vec<String>,
    /// Instance-variable table
    pub own_ivars: Vec<Ivar>,
}

/// Whether a method is an instance (`-`) or class (`+`) method
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum MethodKind
{
    /// `-` prefix
    Instance,
    /// `+` prefix
    Class,
}

impl MethodKind
{
    /// The prefix character used by the runtime
    pub fn sigil(self) -> char
    {
        match self {
            MethodKind::Instance => '-',
            MethodKind::Class => '+',
        }
    }
}

/// A method list entry such as `"- description"` split into its parts
///
/// ## Example
///
/// ```rust
/// use heapscope_core::types::{MethodKind, MethodName};
///
/// let method: MethodName = "- setName:".parse().unwrap();
/// assert_eq!(method.kind, MethodKind::Instance);
/// assert!(method.takes_arguments());
/// assert_eq!(method.qualified("Foo"), "- [Foo setName:]");
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct MethodName
{
    /// Instance or class method
    pub kind: MethodKind,
    /// Selector without the sigil
    pub selector: String,
}

impl MethodName
{
    /// Whether the selector needs arguments (contains a `:`)
    pub fn takes_arguments(&self) -> bool
    {
        selector_takes_arguments(&self.selector)
    }

    /// Fully qualified form, e.g. `"- [Foo description]"`
    pub fn qualified(&self, class_name: &str) -> String
    {
        format!("{} [{class_name} {}]", self.kind.sigil(), self.selector)
    }
}

impl FromStr for MethodName
{
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err>
    {
        let (kind, rest) = match s.trim_start().split_at_checked(1) {
            Some(("-", rest)) => (MethodKind::Instance, rest),
            Some(("+", rest)) => (MethodKind::Class, rest),
            _ => return Err(format!("Method entry {s:?} is missing a '-' or '+' prefix")),
        };
        let selector = rest.trim();
        if selector.is_empty() {
            return Err(format!("Method entry {s:?} has no selector"));
        }
        Ok(Self {
            kind,
            selector: selector.to_string(),
        })
    }
}

impl fmt::Display for MethodName
{
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result
    {
        write!(f, "{} {}", self.kind.sigil(), self.selector)
    }
}

/// Whether a selector string requires arguments.
///
/// Accepts both bare selectors (`count`) and method list entries (`- count`).
pub fn selector_takes_arguments(selector: &str) -> bool
{
    selector.contains(':')
}

#[cfg(test)]
mod tests
{
    use super::*;

    #[test]
    fn test_method_name_parse()
    {
        let method: MethodName = "+ sharedInstance".parse().unwrap();
        assert_eq!(method.kind, MethodKind::Class);
        assert_eq!(method.selector, "sharedInstance");
        assert!(!method.takes_arguments());
        assert_eq!(method.to_string(), "+ sharedInstance");
    }

    #[test]
    fn test_method_name_rejects_missing_sigil()
    {
        assert!("description".parse::<MethodName>().is_err());
        assert!("- ".parse::<MethodName>().is_err());
        assert!("".parse::<MethodName>().is_err());
    }

    #[test]
    fn test_object_kind_display()
    {
        assert_eq!(ObjectKind::MetaClass.to_string(), "meta-class");
        assert_eq!(ObjectKind::default(), ObjectKind::Instance);
    }
}
