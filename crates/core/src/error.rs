use paymeta_id::IdError;
use paymeta_store::StoreError;

#[derive(Debug, thiserror::Error)]
pub enum CoreError {
    #[error("invalid input: {0}")]
    InvalidInput(String),
    #[error("invalid identifier: {0}")]
    InvalidId(#[source] IdError),
    #[error("document not found: {0}")]
    NotFound(String),
    #[error("storage failure: {0}")]
    Store(#[source] StoreError),
}

impl From<StoreError> for CoreError {
    fn from(err: StoreError) -> Self {
        match err {
            StoreError::NotFound { id } => CoreError::NotFound(id),
            other => CoreError::Store(other),
        }
    }
}

pub type CoreResult<T> = std::result::Result<T, CoreError>;
