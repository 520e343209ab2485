//! Memory address type.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Deserializer, Serialize, Serializer};

use crate::error::HeapError;

/// Strongly typed address of an object (or raw pointer) in the inspected process
///
/// This wrapper around `u64` keeps addresses apart from counts, sizes and other
/// integers that flow through the engine.
///
/// ## Text Form
///
/// Callers pass addresses around as strings (that is the only identity carried
/// between calls). [`Address::from_str`] accepts:
///
/// - `0x`-prefixed hexadecimal (`0x600001130660`, case-insensitive)
/// - plain decimal (`105553134280288`)
///
/// [`fmt::Display`] produces the handle form: `0x` followed by lower-case hex
/// without padding. Serde uses the same text form.
///
/// ## Example
///
/// ```rust
/// use heapscope_core::types::Address;
///
/// let addr: Address = "0x600001130660".parse()?;
/// assert_eq!(addr.value(), 0x6000_0113_0660);
/// assert_eq!(addr.to_string(), "0x600001130660");
/// # Ok::<(), heapscope_core::error::HeapError>(())
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct Address(u64);

impl Address
{
    /// The null address (0x0)
    ///
    /// Never a valid object; hosts report it as unresolvable.
    pub const ZERO: Self = Address(0);

    /// Create a new address from a `u64` value
    ///
    /// This is equivalent to `Address::from(value)` but can be used in const contexts.
    pub const fn new(value: u64) -> Self
    {
        Address(value)
    }

    /// Get the raw `u64` value of this address
    pub const fn value(self) -> u64
    {
        self.0
    }

    /// Whether this is the null address
    pub const fn is_null(self) -> bool
    {
        self.0 == 0
    }
}

impl From<u64> for Address
{
    fn from(value: u64) -> Self
    {
        Address(value)
    }
}

impl From<Address> for u64
{
    fn from(address: Address) -> Self
    {
        address.0
    }
}

impl FromStr for Address
{
    type Err = HeapError;

    fn from_str(s: &str) -> Result<Self, Self::Err>
    {
        let trimmed = s.trim();
        let parsed = match trimmed.strip_prefix("0x").or_else(|| trimmed.strip_prefix("0X")) {
            Some(hex) => u64::from_str_radix(hex, 16),
            None => trimmed.parse::<u64>(),
        };
        parsed
            .map(Address)
            .map_err(|_| HeapError::InvalidAddress(s.to_string()))
    }
}

impl fmt::Display for Address
{
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result
    {
        write!(f, "0x{:x}", self.0)
    }
}

impl Serialize for Address
{
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error>
    {
        serializer.collect_str(self)
    }
}

impl<'de> Deserialize<'de> for Address
{
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error>
    {
        let text = String::deserialize(deserializer)?;
        text.parse().map_err(serde::de::Error::custom)
    }
}

#[cfg(test)]
mod tests
{
    use super::*;

    #[test]
    fn test_parse_hex_and_decimal()
    {
        assert_eq!("0x1000".parse::<Address>().unwrap(), Address::new(0x1000));
        assert_eq!("0X1F".parse::<Address>().unwrap(), Address::new(0x1f));
        assert_eq!("4096".parse::<Address>().unwrap(), Address::new(4096));
        assert_eq!(" 0xabc ".parse::<Address>().unwrap(), Address::new(0xabc));
    }

    #[test]
    fn test_parse_rejects_garbage()
    {
        for input in ["", "0x", "0xzz", "pointer", "-1", "0x1ffffffffffffffff"] {
            match input.parse::<Address>() {
                Err(HeapError::InvalidAddress(raw)) => assert_eq!(raw, input),
                other => panic!("expected InvalidAddress for {input:?}, got {other:?}"),
            }
        }
    }

    #[test]
    fn test_display_is_unpadded_hex()
    {
        assert_eq!(Address::new(0x6000_0113_0660).to_string(), "0x600001130660");
        assert_eq!(Address::ZERO.to_string(), "0x0");
    }

    #[test]
    fn test_serde_uses_text_form()
    {
        let json = serde_json::to_string(&Address::new(0x10)).unwrap();
        assert_eq!(json, "\"0x10\"");
        let back: Address = serde_json::from_str(&json).unwrap();
        assert_eq!(back, Address::new(0x10));
    }
}
