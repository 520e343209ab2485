//! # Error Types
//!
//! Classified failures for heap inspection.
//!
//! We use `thiserror` to automatically generate `Error` trait implementations
//! and nice error messages.
//!
//! Two layers exist:
//!
//! - [`HostError`]: what an [`ObjcRuntime`](crate::runtime::ObjcRuntime) host reports
//!   when one of its primitives fails.
//! - [`HeapError`]: what the engine reports to its caller. Host failures are
//!   translated at the boundary (see [`crate::boundary`]) into one of these kinds.

use thiserror::Error;

use crate::types::Address;

/// Main error type for heap inspection operations
///
/// ## Error Categories
///
/// 1. **Input errors**: InvalidAddress, UnsupportedSignature
/// 2. **Resolution errors**: ResolutionFailed, NoSuchMethod
/// 3. **Non-fatal diagnostics**: UnknownClass, SnapshotFailed, DecodeFailed
/// 4. **Host call errors**: InvocationFailed, EvaluationFailed
/// 5. **Dump errors**: HeapDump, Io
///
/// Non-fatal kinds never abort an operation. They are carried in
/// [`Report::warnings`](crate::diagnostics::Report) next to a best-effort result.
#[derive(Error, Debug)]
pub enum HeapError
{
    /// The address string could not be parsed
    ///
    /// Accepted forms are `0x`-prefixed hexadecimal and plain decimal.
    #[error("Invalid address: {0:?}")]
    InvalidAddress(String),

    /// The address does not reference a valid, readable object
    ///
    /// This happens when:
    /// - The address points into unmapped or non-object memory
    /// - The object was deallocated since the address was obtained
    /// - The host faulted while reading object metadata
    #[error("Failed to resolve object at {address}: {details}")]
    ResolutionFailed
    {
        /// Address that failed to resolve
        address: Address,
        /// Host-provided description of the failure
        details: String,
    },

    /// Enumeration was requested for a class the runtime does not know
    ///
    /// Non-fatal: enumeration yields an empty result plus this warning.
    #[error("Class not found: {0}")]
    UnknownClass(String),

    /// Building the snapshot of a single instance failed
    ///
    /// Non-fatal: the instance is skipped and enumeration continues.
    #[error("Failed to snapshot {instance}: {details}")]
    SnapshotFailed
    {
        /// Handle string of the instance (or the class name when the batch call failed)
        instance: String,
        /// Host-provided description of the failure
        details: String,
    },

    /// The target does not implement the requested selector
    #[error("No such method: {0}")]
    NoSuchMethod(String),

    /// The selector takes arguments; only nullary selectors can be invoked
    #[error("Unsupported signature: {0} requires arguments")]
    UnsupportedSignature(String),

    /// A byte buffer could not be decoded as UTF-8
    ///
    /// Non-fatal: the original bytes are kept.
    #[error("Failed to decode {ivar} as UTF-8: {details}")]
    DecodeFailed
    {
        /// Name of the ivar whose value failed to decode (empty for anonymous values)
        ivar: String,
        /// Decoder error description
        details: String,
    },

    /// Dynamic dispatch reached the target but the call itself failed
    #[error("Invocation of {selector} failed: {details}")]
    InvocationFailed
    {
        /// Selector that was dispatched
        selector: String,
        /// Host-provided description of the failure
        details: String,
    },

    /// The script evaluation host rejected or failed the script
    #[error("Evaluation failed: {0}")]
    EvaluationFailed(String),

    /// The heap dump document is malformed
    #[error("Invalid heap dump: {0}")]
    HeapDump(#[from] serde_json::Error),

    /// I/O error (for reading heap dumps, scripts, etc.)
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

impl HeapError
{
    /// Whether this error kind is recovered locally and only reported as a warning.
    #[must_use]
    pub fn is_non_fatal(&self) -> bool
    {
        matches!(
            self,
            Self::UnknownClass(_) | Self::SnapshotFailed { .. } | Self::DecodeFailed { .. }
        )
    }
}

/// Convenience type alias for `Result<T, HeapError>`
///
/// ```rust
/// use heapscope_core::error::HeapResult;
/// fn foo() -> HeapResult<()>
/// {
///     Ok(())
/// }
/// ```
pub type HeapResult<T> = std::result::Result<T, HeapError>;

/// Failure reported by an instrumentation host primitive
///
/// Hosts return these from [`ObjcRuntime`](crate::runtime::ObjcRuntime) methods.
/// The engine never shows them to callers directly.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum HostError
{
    /// Nothing that looks like an object lives at this address
    #[error("no object at {0}")]
    NotAnObject(Address),

    /// Object memory or metadata could not be read
    #[error("unreadable: {0}")]
    Unreadable(String),

    /// The receiver does not respond to the selector
    #[error("unrecognized selector {0}")]
    SelectorNotFound(String),

    /// The host faulted while servicing the request (includes caught panics)
    #[error("host fault: {0}")]
    Fault(String),

    /// The host does not provide this capability
    #[error("unsupported: {0}")]
    Unsupported(String),
}

/// Result alias for host primitives
pub type HostResult<T> = std::result::Result<T, HostError>;
