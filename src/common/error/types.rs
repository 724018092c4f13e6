//! Facade error taxonomy.
use thiserror::Error;

use crate::engine::EngineError;

/// Main error type for twinsheet operations.
#[derive(Error, Debug)]
pub enum Error {
    /// Invalid arguments to an open call (empty file name, missing mode)
    #[error("Configuration error: {0}")]
    Configuration(String),

    /// File name suffix is neither `.xls` nor `.xlsx`
    #[error("Unsupported file type: {0}")]
    UnsupportedFormat(String),

    /// Fault while loading, creating, navigating, reading or writing
    #[error("{message}")]
    Handling {
        message: String,
        #[source]
        source: Option<EngineError>,
    },

    /// Fault while flushing or releasing a workbook in `close()`
    #[error("{message}")]
    Closing {
        message: String,
        #[source]
        source: Option<EngineError>,
    },
}

impl Error {
    /// Handling error without an underlying engine cause.
    pub fn handling(message: impl Into<String>) -> Self {
        Error::Handling {
            message: message.into(),
            source: None,
        }
    }

    /// Closing error without an underlying engine cause.
    pub fn closing(message: impl Into<String>) -> Self {
        Error::Closing {
            message: message.into(),
            source: None,
        }
    }

    /// True for errors raised by the open call's argument checks.
    pub fn is_configuration(&self) -> bool {
        matches!(self, Error::Configuration(_) | Error::UnsupportedFormat(_))
    }

    pub fn is_handling(&self) -> bool {
        matches!(self, Error::Handling { .. })
    }

    pub fn is_closing(&self) -> bool {
        matches!(self, Error::Closing { .. })
    }
}

/// Result type for twinsheet operations.
pub type Result<T> = std::result::Result<T, Error>;
