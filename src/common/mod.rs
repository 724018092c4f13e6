//! Error types, value conversion and date helpers shared by both formats.

// Submodule declarations
pub mod convert;
pub mod date;
pub mod error;

// Re-exports for convenience
pub use convert::{NumberLocale, ValueConverter, to_display_string, without_nulls};
pub use error::{Error, Result};
