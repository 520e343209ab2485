//! Non-fatal diagnostics.
//!
//! Some failures are recovered where they happen: an unknown class during
//! enumeration, one instance that cannot be snapshotted, a byte buffer that is
//! not UTF-8, an object whose description cannot be produced. They are logged
//! with `tracing::warn!` and collected into a [`Report`] next to the partial
//! result, so callers can tell "no results" from "no such class" without the
//! operation failing.

use tracing::warn;

use crate::error::HeapError;

/// Best-effort result plus the non-fatal diagnostics raised while producing it
#[derive(Debug)]
pub struct Report<T>
{
    /// The (possibly partial) result
    pub value: T,
    /// Warnings in the order they were raised
    pub warnings: Vec<HeapError>,
}

impl<T> Report<T>
{
    /// Whether any warning was raised
    pub fn has_warnings(&self) -> bool
    {
        !self.warnings.is_empty()
    }
}

/// Collector for warnings raised during one operation
#[derive(Debug, Default)]
pub struct Warnings
{
    raised: Vec<HeapError>,
}

impl Warnings
{
    /// Create an empty collector.
    pub fn new() -> Self
    {
        Self::default()
    }

    /// Log and record a warning.
    pub fn raise(&mut self, warning: HeapError)
    {
        warn!("{warning}");
        self.raised.push(warning);
    }

    /// Number of warnings raised so far
    pub fn len(&self) -> usize
    {
        self.raised.len()
    }

    /// Whether nothing was raised
    pub fn is_empty(&self) -> bool
    {
        self.raised.is_empty()
    }

    /// Attach the collected warnings to a value.
    pub fn into_report<T>(self, value: T) -> Report<T>
    {
        Report {
            value,
            warnings: self.raised,
        }
    }
}
