use compvault_types::TypesError;
use thiserror::Error;

pub type CompositionResult<T> = Result<T, CompositionError>;

#[derive(Debug, Error)]
pub enum CompositionError {
    #[error("resource identifier already in use: {0}")]
    DuplicateResource(String),

    #[error("duplicate parameter name: {0}")]
    DuplicateParameter(String),

    #[error("invalid status value: {0:?}")]
    InvalidStatus(String),

    #[error("unknown output format: {0}")]
    UnknownSpecification(String),

    #[error("invalid field: {0}")]
    Invalid(String),

    #[error("serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}

impl From<TypesError> for CompositionError {
    fn from(err: TypesError) -> Self {
        match err {
            TypesError::DuplicateParameter(name) => CompositionError::DuplicateParameter(name),
            TypesError::InvalidStatus(value) => CompositionError::InvalidStatus(value),
            other => CompositionError::Invalid(other.to_string()),
        }
    }
}
