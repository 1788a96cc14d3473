use reqpad_lib::StoreError;
use std::fmt;
use std::io;

#[derive(Debug)]
pub enum AppError {
    Io(io::Error),
    Json(serde_json::Error),
    Store(StoreError),
    FileSource { path: String, source: io::Error },
    Validation(String),
    CollectionNotFound(String),
    RequestNotFound(String),
    EnvironmentNotFound(String),
    /// Requests that settled with a synthetic error.
    ExecutionFailed(usize),
}

impl fmt::Display for AppError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            AppError::Io(err) => write!(f, "IO error: {err}"),
            AppError::Json(err) => write!(f, "Invalid collection file: {err}"),
            AppError::Store(err) => write!(f, "{err}"),
            AppError::FileSource { path, source } => write!(
                f,
                "Cannot read form file {}: {source}",
                crate::core::paths::clean_path_str(path)
            ),
            AppError::Validation(msg) => write!(f, "Validation error: {msg}"),
            AppError::CollectionNotFound(path) => write!(
                f,
                "Collection not found: {}",
                crate::core::paths::clean_path_str(path)
            ),
            AppError::RequestNotFound(name) => write!(f, "Request not found: {name}"),
            AppError::EnvironmentNotFound(name) => write!(f, "Environment not found: {name}"),
            AppError::ExecutionFailed(count) => write!(f, "{count} request(s) failed"),
        }
    }
}

impl std::error::Error for AppError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            AppError::Io(err) => Some(err),
            AppError::Json(err) => Some(err),
            AppError::Store(err) => Some(err),
            AppError::FileSource { source, .. } => Some(source),
            _ => None,
        }
    }
}

impl From<io::Error> for AppError {
    fn from(err: io::Error) -> Self {
        AppError::Io(err)
    }
}

impl From<serde_json::Error> for AppError {
    fn from(err: serde_json::Error) -> Self {
        AppError::Json(err)
    }
}

impl From<StoreError> for AppError {
    fn from(err: StoreError) -> Self {
        AppError::Store(err)
    }
}
