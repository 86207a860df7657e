//! Data model error types.

use thiserror::Error;

/// Errors raised while building or decoding data model values.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum TypesError {
    #[error("duplicate parameter name: {0}")]
    DuplicateParameter(String),

    #[error("invalid status value: {0:?}")]
    InvalidStatus(String),

    #[error("invalid role value: {0:?}")]
    InvalidRole(String),

    #[error("field must not be empty: {0}")]
    EmptyField(&'static str),

    #[error("invalid base64url: {0}")]
    Encoding(String),
}

pub type TypesResult<T> = Result<T, TypesError>;
