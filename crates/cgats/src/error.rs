//! CGATS error types.

use crate::NodeId;
use thiserror::Error;

/// Result type for CGATS operations.
pub type CgatsResult<T> = Result<T, CgatsError>;

/// Errors that can occur while loading, editing or writing CGATS data.
#[derive(Debug, Error)]
pub enum CgatsError {
    /// The construction source is neither a file, text, stream nor line list.
    #[error("invalid input: {0}")]
    InvalidInput(String),

    /// The operation is not supported on this kind of node.
    #[error("invalid operation '{operation}' for {kind} node")]
    InvalidOperation {
        /// Type tag of the target node.
        kind: String,
        /// Name of the rejected operation.
        operation: &'static str,
    },

    /// A row does not have one value per `DATA_FORMAT` column.
    #[error("DATA entries take exactly {expected} values ({given} given)")]
    WrongArity {
        /// Number of columns in the governing `DATA_FORMAT`.
        expected: usize,
        /// Number of values supplied.
        given: usize,
    },

    /// A value could not be coerced to the type its column requires.
    #[error("invalid data type for {key} (expected {expected}, got {got})")]
    WrongType {
        /// Column or key the value was destined for.
        key: String,
        /// Expected type.
        expected: &'static str,
        /// Offending value, as text.
        got: String,
    },

    /// A required key is absent.
    #[error("key not found: {key}")]
    KeyNotFound {
        /// The missing key.
        key: String,
    },

    /// The handle does not address a node of this document.
    #[error("no such node: {0:?}")]
    InvalidNode(NodeId),

    /// I/O error.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

impl CgatsError {
    pub(crate) fn wrong_type(key: impl Into<String>, expected: &'static str, got: impl ToString) -> Self {
        Self::WrongType {
            key: key.into(),
            expected,
            got: got.to_string(),
        }
    }

    pub(crate) fn key_not_found(key: impl ToString) -> Self {
        Self::KeyNotFound { key: key.to_string() }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn arity_message() {
        let err = CgatsError::WrongArity { expected: 4, given: 2 };
        assert_eq!(err.to_string(), "DATA entries take exactly 4 values (2 given)");
    }

    #[test]
    fn wrong_type_message() {
        let err = CgatsError::wrong_type("RGB_R", "float", "abc");
        assert_eq!(err.to_string(), "invalid data type for RGB_R (expected float, got abc)");
    }
}
