use crate::query_options::QueryError;
use crate::validation::MetadataValidationError;

#[derive(Debug, thiserror::Error)]
pub enum CoreError {
    #[error("Validation failed: {0}")]
    Validation(String),

    #[error(transparent)]
    InvalidMetadata(#[from] MetadataValidationError),

    #[error(transparent)]
    Query(#[from] QueryError),
}
