//! Raw and formatted field values.
//!
//! A host hands back [`RuntimeValue`]s: whatever shape the slot or call result
//! had in the inspected process. The formatter turns those into
//! [`FormattedValue`]s, a closed tagged union that collaborators serialise.

use std::fmt;

use serde::ser::SerializeMap;
use serde::{Deserialize, Serialize, Serializer};

use crate::types::Address;

/// Raw value read from an ivar slot or returned by a dispatched method
///
/// This is the closed set of shapes the engine understands. Anything a host
/// cannot map onto one of the typed variants should be passed as
/// [`RuntimeValue::Struct`] with its type encoding.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RuntimeValue
{
    /// Reference to a live runtime object
    Object(Address),
    /// Untyped memory address
    Pointer(Address),
    /// Text
    String(String),
    /// Signed integer
    Integer(i64),
    /// Floating point number
    Float(f64),
    /// Boolean (`BOOL`)
    Bool(bool),
    /// Raw byte buffer
    Bytes(Vec<u8>),
    /// `nil` / null
    Nil,
    /// Aggregate the engine does not interpret, carried as its type encoding
    Struct(String),
}

impl fmt::Display for RuntimeValue
{
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result
    {
        match self {
            RuntimeValue::Object(address) | RuntimeValue::Pointer(address) => write!(f, "{address}"),
            RuntimeValue::String(text) | RuntimeValue::Struct(text) => write!(f, "{text}"),
            RuntimeValue::Integer(value) => write!(f, "{value}"),
            RuntimeValue::Float(value) => write!(f, "{value}"),
            RuntimeValue::Bool(value) => write!(f, "{value}"),
            RuntimeValue::Bytes(bytes) => {
                write!(f, "<")?;
                for (index, byte) in bytes.iter().enumerate() {
                    if index > 0 && index % 4 == 0 {
                        write!(f, " ")?;
                    }
                    write!(f, "{byte:02x}")?;
                }
                write!(f, ">")
            }
            RuntimeValue::Nil => write!(f, "nil"),
        }
    }
}

/// String, number or boolean primitive
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum Primitive
{
    /// Text
    String(String),
    /// Integer
    Integer(i64),
    /// Floating point
    Float(f64),
    /// Boolean
    Bool(bool),
}

/// Structured representation of a field value
///
/// Exactly one variant applies to any value; the formatter picks it by a fixed
/// priority (object, raw pointer, primitive, opaque) and never coerces a value
/// into another variant's shape.
///
/// Serialised with an internal `tag` field:
///
/// ```json
/// {"tag": "ObjectRef", "className": "NSString", "pointer": "0x6000", "value": "bar"}
/// {"tag": "Primitive", "value": "bar"}
/// ```
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "tag")]
pub enum FormattedValue
{
    /// Live object, with its default textual representation when obtainable
    ObjectRef
    {
        /// Class of the referenced object
        #[serde(rename = "className")]
        class_name: String,
        /// Address of the referenced object
        pointer: Address,
        /// Default description (`None` if the host failed to produce one)
        value: Option<String>,
    },
    /// Raw, untyped pointer
    RawPointerRef
    {
        /// The pointer value
        pointer: Address,
    },
    /// Primitive passed through unchanged
    Primitive
    {
        /// The primitive value
        value: Primitive,
    },
    /// Anything else, passed through uninterpreted
    Opaque
    {
        /// The original raw value
        original: RuntimeValue,
    },
}

impl FormattedValue
{
    /// Tag name of the populated variant
    pub fn tag(&self) -> &'static str
    {
        match self {
            FormattedValue::ObjectRef { .. } => "ObjectRef",
            FormattedValue::RawPointerRef { .. } => "RawPointerRef",
            FormattedValue::Primitive { .. } => "Primitive",
            FormattedValue::Opaque { .. } => "Opaque",
        }
    }
}

/// Formatted ivars of one object, in the runtime's native table order
///
/// Serialises as a JSON object whose keys keep that order.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct IvarMap
{
    entries: Vec<(String, FormattedValue)>,
}

impl IvarMap
{
    /// Create an empty map.
    pub fn new() -> Self
    {
        Self::default()
    }

    /// Append an entry. A repeated name replaces the earlier value in place.
    pub fn insert(&mut self, name: String, value: FormattedValue)
    {
        if let Some(slot) = self.entries.iter_mut().find(|(existing, _)| *existing == name) {
            slot.1 = value;
        } else {
            self.entries.push((name, value));
        }
    }

    /// Look up an ivar by name.
    pub fn get(&self, name: &str) -> Option<&FormattedValue>
    {
        self.entries
            .iter()
            .find(|(existing, _)| existing == name)
            .map(|(_, value)| value)
    }

    /// Number of ivars
    pub fn len(&self) -> usize
    {
        self.entries.len()
    }

    /// Whether there are no ivars
    pub fn is_empty(&self) -> bool
    {
        self.entries.is_empty()
    }

    /// Ivar names in table order
    pub fn names(&self) -> impl Iterator<Item = &str>
    {
        self.entries.iter().map(|(name, _)| name.as_str())
    }
}

impl Serialize for IvarMap
{
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error>
    {
        let mut map = serializer.serialize_map(Some(self.entries.len()))?;
        for (name, value) in &self.entries {
            map.serialize_entry(name, value)?;
        }
        map.end()
    }
}

#[cfg(test)]
mod tests
{
    use serde_json::json;

    use super::*;

    #[test]
    fn test_formatted_value_wire_shape()
    {
        let object = FormattedValue::ObjectRef {
            class_name: "NSString".to_string(),
            pointer: Address::new(0x6000),
            value: Some("bar".to_string()),
        };
        assert_eq!(
            serde_json::to_value(&object).unwrap(),
            json!({"tag": "ObjectRef", "className": "NSString", "pointer": "0x6000", "value": "bar"})
        );

        let primitive = FormattedValue::Primitive {
            value: Primitive::Integer(7),
        };
        assert_eq!(
            serde_json::to_value(&primitive).unwrap(),
            json!({"tag": "Primitive", "value": 7})
        );

        let opaque = FormattedValue::Opaque {
            original: RuntimeValue::Nil,
        };
        assert_eq!(
            serde_json::to_value(&opaque).unwrap(),
            json!({"tag": "Opaque", "original": "nil"})
        );
    }

    #[test]
    fn test_runtime_value_dump_shape()
    {
        let value: RuntimeValue = serde_json::from_value(json!({"bytes": [98, 97, 114]})).unwrap();
        assert_eq!(value, RuntimeValue::Bytes(b"bar".to_vec()));

        let value: RuntimeValue = serde_json::from_value(json!({"object": "0x10"})).unwrap();
        assert_eq!(value, RuntimeValue::Object(Address::new(0x10)));

        let value: RuntimeValue = serde_json::from_value(json!("nil")).unwrap();
        assert_eq!(value, RuntimeValue::Nil);
    }

    #[test]
    fn test_ivar_map_keeps_table_order()
    {
        let mut ivars = IvarMap::new();
        ivars.insert(
            "_z".to_string(),
            FormattedValue::Primitive {
                value: Primitive::Bool(true),
            },
        );
        ivars.insert(
            "_a".to_string(),
            FormattedValue::RawPointerRef {
                pointer: Address::new(1),
            },
        );

        assert_eq!(ivars.names().collect::<Vec<_>>(), vec!["_z", "_a"]);
        assert_eq!(
            serde_json::to_string(&ivars).unwrap(),
            r#"{"_z":{"tag":"Primitive","value":true},"_a":{"tag":"RawPointerRef","pointer":"0x1"}}"#
        );
    }

    #[test]
    fn test_bytes_display()
    {
        assert_eq!(RuntimeValue::Bytes(vec![0xde, 0xad, 0xbe, 0xef, 0x01]).to_string(), "<deadbeef 01>");
    }
}
