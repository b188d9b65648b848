use crate::shared::errors::ApiError;
use crate::storage::StorageError;

pub type HandlerResult<T> = Result<T, ApiError>;

#[derive(Debug, thiserror::Error)]
pub enum Error {
    #[error("Plant {0} not found")]
    NotFound(i32),

    #[error(transparent)]
    Storage(#[from] StorageError),
}

impl crate::plants_api::error_recorder::IntoApiError for Error {
    fn code(&self) -> &'static str {
        match self {
            Error::NotFound(_) => "not_found",
            Error::Storage(StorageError::Pool(_)) => "pool_error",
            Error::Storage(_) => "storage_error",
        }
    }

    fn into_api_error(self) -> ApiError {
        match self {
            Error::NotFound(_) => ApiError::plant_not_found(),
            // The storage detail stays in the logs.
            Error::Storage(e) => {
                tracing::error!(error = %e, "plant storage failure");
                ApiError::internal_server_error()
            }
        }
    }
}
