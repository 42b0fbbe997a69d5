use thiserror::Error;

#[derive(Error, Debug)]
pub enum AppError {
    #[error("Validation failed: {0}")]
    Validation(String),

    #[error("Please log in to continue")]
    NotLoggedIn,

    #[error("Backend rejected request: {message}")]
    Backend {
        status: Option<u16>,
        message: String,
    },

    #[error("Could not reach backend: {0}")]
    Transport(String),

    #[error("Malformed backend response: {0}")]
    Decode(String),

    #[error("Not found: {0}")]
    NotFound(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

impl AppError {
    /// Rejection raised by the backend itself, without an HTTP status.
    pub fn backend(message: impl Into<String>) -> Self {
        AppError::Backend {
            status: None,
            message: message.into(),
        }
    }

    pub fn validation(message: impl Into<String>) -> Self {
        AppError::Validation(message.into())
    }
}

impl From<reqwest::Error> for AppError {
    fn from(err: reqwest::Error) -> Self {
        if err.is_decode() {
            AppError::Decode(err.to_string())
        } else {
            AppError::Transport(err.to_string())
        }
    }
}

impl From<AppError> for String {
    fn from(err: AppError) -> String {
        err.to_string()
    }
}

pub type AppResult<T> = Result<T, AppError>;
