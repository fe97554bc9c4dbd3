use std::error::Error;

#[derive(Debug, Clone, Copy, PartialEq)]
pub enum StorageErrorType {
    NotFound,
    InvalidName,
    NotEmpty,
    Backend,
    IOError,
    InternalError,
}

impl Into<warp::http::StatusCode> for StorageErrorType {
    fn into(self) -> warp::http::StatusCode {
        match self {
            StorageErrorType::NotFound => warp::http::StatusCode::NOT_FOUND,
            StorageErrorType::InvalidName => warp::http::StatusCode::BAD_REQUEST,
            StorageErrorType::NotEmpty => warp::http::StatusCode::CONFLICT,
            StorageErrorType::Backend => warp::http::StatusCode::BAD_GATEWAY,
            _ => warp::http::StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

#[derive(Debug, Clone)]
pub struct StorageError {
    pub error_type: StorageErrorType,
    pub message: String,
}

impl warp::Reply for StorageError {
    fn into_response(self) -> warp::reply::Response {
        warp::reply::with_status(warp::reply::json(&self.message), self.error_type.into())
            .into_response()
    }
}

impl StorageError {
    pub fn new(error_type: StorageErrorType, message: String) -> Self {
        Self {
            error_type,
            message,
        }
    }

    pub fn not_found(message: impl Into<String>) -> Self {
        Self::new(StorageErrorType::NotFound, message.into())
    }

    pub fn backend(message: impl Into<String>) -> Self {
        Self::new(StorageErrorType::Backend, message.into())
    }
}

impl std::fmt::Display for StorageError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{:?}: {}", self.error_type, self.message)
    }
}

impl From<std::io::Error> for StorageError {
    fn from(error: std::io::Error) -> Self {
        Self {
            error_type: StorageErrorType::IOError,
            message: error.to_string(),
        }
    }
}

impl From<serde_json::Error> for StorageError {
    fn from(error: serde_json::Error) -> Self {
        Self {
            error_type: StorageErrorType::InternalError,
            message: error.to_string(),
        }
    }
}

impl From<tokio::task::JoinError> for StorageError {
    fn from(error: tokio::task::JoinError) -> Self {
        Self {
            error_type: StorageErrorType::InternalError,
            message: error.to_string(),
        }
    }
}

impl Error for StorageError {}

pub type Result<T> = std::result::Result<T, StorageError>;
