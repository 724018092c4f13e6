//! Common types for spreadsheet operations.

use serde::{Deserialize, Serialize};

/// Semantic value read from a cell.
///
/// Absent cells are represented by `Option::None` at the call site.
#[derive(Debug, Clone, PartialEq)]
pub enum Value {
    /// Trimmed text content
    Text(String),
    /// Numeric content, including date serials and formula results
    Number(f64),
    /// Boolean value
    Boolean(bool),
    /// Excel error code, e.g. `0x07` for `#DIV/0!`
    ErrorCode(u8),
}

impl Value {
    pub fn as_number(&self) -> Option<f64> {
        match self {
            Value::Number(number) => Some(*number),
            _ => None,
        }
    }

    pub fn as_boolean(&self) -> Option<bool> {
        match self {
            Value::Boolean(b) => Some(*b),
            _ => None,
        }
    }
}

impl From<&str> for Value {
    fn from(text: &str) -> Self {
        Value::Text(text.to_string())
    }
}

impl From<String> for Value {
    fn from(text: String) -> Self {
        Value::Text(text)
    }
}

impl From<f64> for Value {
    fn from(number: f64) -> Self {
        Value::Number(number)
    }
}

impl From<bool> for Value {
    fn from(b: bool) -> Self {
        Value::Boolean(b)
    }
}

/// Whether a workbook is opened to read an existing file or to write a new one.
///
/// The mode is fixed for the lifetime of a handle.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum HandlingMode {
    Read,
    Write,
}

impl std::fmt::Display for HandlingMode {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            HandlingMode::Read => write!(f, "READ"),
            HandlingMode::Write => write!(f, "WRITE"),
        }
    }
}
