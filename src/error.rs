use thiserror::Error;
use actix_web::{ResponseError, HttpResponse, http::StatusCode};
use serde_json::json;

#[derive(Error, Debug)]
pub enum AppError {
    #[error("Authentication error: {0}")]
    AuthError(#[from] AuthError),

    #[error("Generation error: {0}")]
    GenerationError(#[from] GenerationError),

    #[error("Storage error: {0}")]
    StorageError(#[from] StorageError),

    #[error("Configuration error: {0}")]
    ConfigError(String),

    #[error("Validation error: {0}")]
    ValidationError(String),

    #[error("You've run out of credits. Upgrade to premium or wait for your daily reset.")]
    InsufficientCredits { required: u32, available: u32 },

    #[error("Not found: {0}")]
    NotFound(String),

    #[error("Internal server error: {0}")]
    InternalError(String),
}

impl From<config::ConfigError> for AppError {
    fn from(err: config::ConfigError) -> Self {
        AppError::ConfigError(err.to_string())
    }
}

impl From<std::io::Error> for AppError {
    fn from(err: std::io::Error) -> Self {
        AppError::InternalError(err.to_string())
    }
}

impl ResponseError for AppError {
    fn error_response(&self) -> HttpResponse {
        let status = self.status_code();
        let message = self.to_string();
        let response = json!({
            "error": {
                "status": status.as_u16(),
                "message": message
            }
        });
        HttpResponse::build(status).json(response)
    }

    fn status_code(&self) -> StatusCode {
        match self {
            AppError::AuthError(e) => match e {
                AuthError::InvalidCredentials => StatusCode::UNAUTHORIZED,
                AuthError::NotLoggedIn => StatusCode::UNAUTHORIZED,
                AuthError::NotApproved => StatusCode::FORBIDDEN,
            },
            AppError::GenerationError(GenerationError::InvalidRequest(_)) => StatusCode::INTERNAL_SERVER_ERROR,
            AppError::GenerationError(_) => StatusCode::BAD_GATEWAY,
            AppError::ValidationError(_) => StatusCode::BAD_REQUEST,
            AppError::InsufficientCredits { .. } => StatusCode::PAYMENT_REQUIRED,
            AppError::NotFound(_) => StatusCode::NOT_FOUND,
            _ => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

#[derive(Error, Debug)]
pub enum AuthError {
    #[error("Invalid credentials")]
    InvalidCredentials,

    #[error("Not logged in")]
    NotLoggedIn,

    #[error("Email is not on the approved premium list")]
    NotApproved,
}

#[derive(Error, Debug)]
pub enum GenerationError {
    #[error("API request failed: {0}")]
    RequestFailed(String),

    #[error("API response error: {0}")]
    ResponseError(String),

    #[error("Malformed API response: {0}")]
    MalformedResponse(String),

    #[error("Invalid request: {0}")]
    InvalidRequest(String),
}

impl From<reqwest::Error> for GenerationError {
    fn from(err: reqwest::Error) -> Self {
        if err.is_decode() {
            GenerationError::MalformedResponse(err.to_string())
        } else {
            GenerationError::RequestFailed(err.to_string())
        }
    }
}

#[derive(Error, Debug)]
pub enum StorageError {
    #[error("I/O error on key {key}: {message}")]
    Io { key: String, message: String },

    #[error("Serialization error on key {key}: {message}")]
    Serialization { key: String, message: String },

    #[error("Corrupt record: {0}")]
    Corrupt(String),
}
