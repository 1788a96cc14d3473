use crate::core::error::AppError;

/// Exit codes for the reqpad CLI
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ExitCode {
    Success = 0,
    /// General/unspecified error
    GeneralError = 1,
    /// Collection content or arguments are invalid
    ConfigError = 3,
    /// File not found or IO error
    FileError = 4,
    /// Request or environment not found
    NotFoundError = 5,
    /// At least one request settled with a transport error
    NetworkError = 6,
}

impl ExitCode {
    pub fn code(&self) -> i32 {
        *self as i32
    }
}

impl From<&AppError> for ExitCode {
    fn from(error: &AppError) -> Self {
        match error {
            AppError::Io(_) | AppError::FileSource { .. } | AppError::CollectionNotFound(_) => {
                ExitCode::FileError
            }
            AppError::Json(_) | AppError::Validation(_) | AppError::Store(_) => {
                ExitCode::ConfigError
            }
            AppError::RequestNotFound(_) | AppError::EnvironmentNotFound(_) => {
                ExitCode::NotFoundError
            }
            AppError::ExecutionFailed(_) => ExitCode::NetworkError,
        }
    }
}

impl From<&Box<dyn std::error::Error>> for ExitCode {
    fn from(error: &Box<dyn std::error::Error>) -> Self {
        match error.downcast_ref::<AppError>() {
            Some(app_error) => ExitCode::from(app_error),
            None => ExitCode::GeneralError,
        }
    }
}
