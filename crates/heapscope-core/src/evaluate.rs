//! # Script Evaluation
//!
//! Evaluates ad-hoc script source against a resolved object.
//!
//! This is a debugging escape hatch and **not a security boundary**. The host
//! runs the source with the resolved handle bound as `ptr` and with the full
//! capabilities of its execution context; nothing here sandboxes it. Callers
//! that need isolation must get it from the host.

use tracing::{debug, info};

use crate::boundary::guarded;
use crate::error::{HeapError, HeapResult};
use crate::resolver::resolve;
use crate::runtime::ObjcRuntime;

/// Evaluate `source` with the object at `address` bound as `ptr`.
///
/// ## Errors
///
/// - `InvalidAddress` / `ResolutionFailed`: the object could not be resolved
/// - `EvaluationFailed`: the host has no script engine, or the script failed
pub fn evaluate<R: ObjcRuntime + ?Sized>(runtime: &R, address: &str, source: &str) -> HeapResult<()>
{
    let handle = resolve(runtime, address)?;
    info!(handle = %handle, "Evaluating script with ptr bound");
    debug!(source, "Script source");

    guarded("evaluate", || runtime.evaluate(&handle, source)).map_err(|error| HeapError::EvaluationFailed(error.to_string()))
}
