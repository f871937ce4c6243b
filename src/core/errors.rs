// Domain error types - Secure error handling with no information disclosure

use thiserror::Error;

/// Main error type for the certificate registry
#[derive(Error, Debug)]
pub enum ServiceError {
    /// Email already registered (HTTP 409)
    #[error("Email already registered")]
    DuplicateEmail,

    /// Malformed or incomplete input (HTTP 400)
    #[error("Validation error: {0}")]
    ValidationError(String),

    /// Unknown certificate id (HTTP 404)
    #[error("Student not found")]
    NotFound,

    /// Unknown email or wrong password (HTTP 400, same body for both)
    #[error("Invalid email or password")]
    InvalidCredentials,

    /// No token in the authorization header (HTTP 401)
    #[error("No token provided")]
    MissingToken,

    /// Bad signature, expired or malformed token (HTTP 401)
    #[error("Unauthorized")]
    Unauthorized,

    /// Password hashing or token signing failed (HTTP 500)
    #[error("Cryptographic error: {0}")]
    CryptoError(String),

    /// QR encoding failed (HTTP 500)
    #[error("Encoding error: {0}")]
    EncodingError(String),

    /// Writing an uploaded file failed (HTTP 500)
    #[error("Upload error: {0}")]
    UploadError(String),

    /// Database unavailable or query failed (HTTP 500)
    #[error("Storage error: {0}")]
    StorageError(String),

    /// Configuration error (HTTP 500)
    #[error("Configuration error: {0}")]
    ConfigurationError(String),
}

impl ServiceError {
    /// Get HTTP status code for this error
    pub fn status_code(&self) -> u16 {
        match self {
            ServiceError::DuplicateEmail => 409,
            ServiceError::ValidationError(_) => 400,
            ServiceError::NotFound => 404,
            ServiceError::InvalidCredentials => 400,
            ServiceError::MissingToken => 401,
            ServiceError::Unauthorized => 401,
            ServiceError::CryptoError(_) => 500,
            ServiceError::EncodingError(_) => 500,
            ServiceError::UploadError(_) => 500,
            ServiceError::StorageError(_) => 500,
            ServiceError::ConfigurationError(_) => 500,
        }
    }

    /// Get user-friendly error message (no sensitive information)
    pub fn user_message(&self) -> String {
        match self {
            ServiceError::DuplicateEmail => "Email already registered".to_string(),
            ServiceError::ValidationError(reason) => reason.clone(),
            ServiceError::NotFound => "Student not found".to_string(),
            ServiceError::InvalidCredentials => "Invalid email or password".to_string(),
            ServiceError::MissingToken => "No token provided".to_string(),
            ServiceError::Unauthorized => "Unauthorized".to_string(),
            ServiceError::CryptoError(_)
            | ServiceError::EncodingError(_)
            | ServiceError::UploadError(_)
            | ServiceError::StorageError(_)
            | ServiceError::ConfigurationError(_) => "Server Error".to_string(),
        }
    }

    /// True for faults on our side rather than the caller's
    pub fn is_infrastructure(&self) -> bool {
        self.status_code() >= 500
    }
}

impl From<sqlx::Error> for ServiceError {
    fn from(err: sqlx::Error) -> Self {
        ServiceError::StorageError(err.to_string())
    }
}
