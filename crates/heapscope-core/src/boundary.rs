//! # Host Boundary
//!
//! Every call into the host goes through [`guarded`].
//!
//! Host primitives can fail in two ways: by returning a [`HostError`], or by
//! panicking (a host written in Rust that trips over a malformed object, a
//! binding layer that unwinds on a foreign exception). Both come back out of
//! [`guarded`] as a `HostResult`, so callers classify them with ordinary
//! `map_err` and no host failure escapes as an uncontrolled unwind.
//!
//! This cannot stop a host from crashing the whole process (a segfault in the
//! inspected runtime is not an unwind). That risk is accepted.

use std::any::Any;
use std::panic::{self, AssertUnwindSafe};

use tracing::error;

use crate::error::{HostError, HostResult};

/// Run one host primitive, converting a panic into [`HostError::Fault`].
///
/// `operation` names the primitive for diagnostics.
pub fn guarded<T, F>(operation: &str, call: F) -> HostResult<T>
where
    F: FnOnce() -> HostResult<T>,
{
    match panic::catch_unwind(AssertUnwindSafe(call)) {
        Ok(result) => result,
        Err(payload) => {
            let message = panic_message(payload.as_ref());
            error!(operation, %message, "Host panicked during {operation}");
            Err(HostError::Fault(format!("{operation}: {message}")))
        }
    }
}

/// Like [`guarded`] for primitives that cannot report errors themselves.
pub fn guarded_value<T, F>(operation: &str, call: F) -> HostResult<T>
where
    F: FnOnce() -> T,
{
    guarded(operation, || Ok(call()))
}

fn panic_message(payload: &(dyn Any + Send)) -> String
{
    if let Some(text) = payload.downcast_ref::<&str>() {
        (*text).to_string()
    } else if let Some(text) = payload.downcast_ref::<String>() {
        text.clone()
    } else {
        "non-string panic payload".to_string()
    }
}

#[cfg(test)]
mod tests
{
    use super::*;

    #[test]
    fn test_guarded_passes_results_through()
    {
        assert_eq!(guarded("metadata", || Ok::<_, HostError>(7)), Ok(7));
        assert_eq!(
            guarded::<(), _>("metadata", || Err(HostError::Unreadable("isa".to_string()))),
            Err(HostError::Unreadable("isa".to_string()))
        );
    }

    #[test]
    fn test_guarded_catches_panics()
    {
        let result = guarded::<(), _>("dispatch", || panic!("bad isa pointer"));
        match result {
            Err(HostError::Fault(message)) => {
                assert!(message.contains("dispatch"));
                assert!(message.contains("bad isa pointer"));
            }
            other => panic!("expected Fault, got {other:?}"),
        }
    }

    #[test]
    fn test_guarded_value_catches_formatted_panics()
    {
        let selector = "count";
        let result = guarded_value::<bool, _>("responds_to", || panic!("no receiver for {selector}"));
        assert_eq!(
            result,
            Err(HostError::Fault("responds_to: no receiver for count".to_string()))
        );
    }
}
