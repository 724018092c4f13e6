//! Error types for twinsheet.
//!
//! Three kinds of failure reach callers: configuration errors from the
//! open call, handling errors from any read/write/navigation fault, and
//! closing errors raised only when a workbook is flushed and released.

// Submodule declarations
pub mod conversions;
pub mod types;

// Re-exports
pub use types::{Error, Result};
