use thiserror::Error;

use crate::value::ValueType;

pub type Result<T> = std::result::Result<T, Error>;

/// Errors raised by table and column operations.
///
/// All errors are synchronous and leave the receiving value untouched: every
/// operation is copy-on-write, so a failed call never produces a partially
/// mutated result.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum Error {
    #[error("type mismatch in column '{label}': expected {expected}, found {found}")]
    TypeMismatch {
        label: String,
        expected: ValueType,
        found: ValueType,
    },
    #[error("column '{label}' not found")]
    NotFound { label: String },
    #[error("column '{label}' already exists")]
    AlreadyExists { label: String },
    #[error("invalid argument: {message}")]
    InvalidArgument { message: String },
    #[error("invalid state: {message}")]
    InvalidState { message: String },
    #[error("decode failed: {message}")]
    Decode { message: String },
}

impl Error {
    pub fn type_mismatch(label: impl Into<String>, expected: ValueType, found: ValueType) -> Self {
        Error::TypeMismatch {
            label: label.into(),
            expected,
            found,
        }
    }

    pub fn not_found(label: impl Into<String>) -> Self {
        Error::NotFound {
            label: label.into(),
        }
    }

    pub fn already_exists(label: impl Into<String>) -> Self {
        Error::AlreadyExists {
            label: label.into(),
        }
    }

    pub fn invalid_argument(message: impl Into<String>) -> Self {
        Error::InvalidArgument {
            message: message.into(),
        }
    }

    pub fn invalid_state(message: impl Into<String>) -> Self {
        Error::InvalidState {
            message: message.into(),
        }
    }

    pub fn decode(message: impl Into<String>) -> Self {
        Error::Decode {
            message: message.into(),
        }
    }
}
