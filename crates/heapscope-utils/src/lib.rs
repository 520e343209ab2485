//! # Heapscope Utilities
//!
//! Shared logging and configuration helpers for heapscope.
//!
//! The CLI calls into this crate once at startup; the engine crate only emits
//! `tracing` events and never installs a subscriber itself.

pub mod logging;

// Re-export commonly used logging functions for convenience
pub use logging::{
    init_logging, init_logging_with, init_logging_with_level, LogConfig, LogFormat, LogLevel, LoggingError, LoggingGuard,
};
pub use tracing::{debug, error, info, trace, warn};
