//! Wrapping engine failures into the facade error type.

use super::types::Error;
use crate::engine::EngineError;

/// Engine faults surface as handling errors unless a caller wraps them with
/// more specific context first.
impl From<EngineError> for Error {
    fn from(err: EngineError) -> Self {
        Error::Handling {
            message: err.to_string(),
            source: Some(err),
        }
    }
}

/// Attach a message to an engine result.
pub(crate) trait EngineResultExt<T> {
    /// Wrap a failure as a handling error.
    fn handling_context<F: FnOnce() -> String>(self, message: F) -> Result<T, Error>;

    /// Wrap a failure as a closing error.
    fn closing_context<F: FnOnce() -> String>(self, message: F) -> Result<T, Error>;
}

impl<T> EngineResultExt<T> for Result<T, EngineError> {
    fn handling_context<F: FnOnce() -> String>(self, message: F) -> Result<T, Error> {
        self.map_err(|source| Error::Handling {
            message: message(),
            source: Some(source),
        })
    }

    fn closing_context<F: FnOnce() -> String>(self, message: F) -> Result<T, Error> {
        self.map_err(|source| Error::Closing {
            message: message(),
            source: Some(source),
        })
    }
}
