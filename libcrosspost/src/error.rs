//! Error types for Crosspost

use thiserror::Error;

pub type Result<T> = std::result::Result<T, CrosspostError>;

#[derive(Error, Debug)]
pub enum CrosspostError {
    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    #[error("Database error: {0}")]
    Database(#[from] DbError),

    #[error("Platform error: {0}")]
    Platform(#[from] PlatformError),

    #[error("{0}")]
    Validation(String),

    #[error("{0}")]
    Forbidden(String),

    #[error("{0}")]
    NotFound(String),
}

impl CrosspostError {
    /// Whether the error was caused by the caller rather than the system
    ///
    /// Client errors are reported back verbatim; everything else is logged and
    /// replaced with a generic message at the HTTP boundary.
    pub fn is_client_error(&self) -> bool {
        matches!(
            self,
            CrosspostError::Validation(_) | CrosspostError::Forbidden(_) | CrosspostError::NotFound(_)
        )
    }
}

#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("Failed to read config file: {0}")]
    ReadError(#[from] std::io::Error),

    #[error("Failed to parse config: {0}")]
    ParseError(#[from] toml::de::Error),

    #[error("Missing required field: {0}")]
    MissingField(String),

    #[error("Invalid value for {0}")]
    InvalidValue(String),
}

#[derive(Error, Debug)]
pub enum DbError {
    #[error("Database operation failed: {0}")]
    SqlxError(#[from] sqlx::Error),

    #[error("Migration failed: {0}")]
    MigrationError(#[from] sqlx::migrate::MigrateError),

    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),

    #[error("Corrupt row: {0}")]
    Decode(String),

    #[error("Failed to encode column: {0}")]
    Encode(String),
}

/// Failure of a single platform attempt
///
/// These never abort a publish request; they end up as the `errorMessage` of a
/// failed publishing result.
#[derive(Error, Debug, Clone)]
pub enum PlatformError {
    #[error("Authentication failed: {0}")]
    Authentication(String),

    #[error("Posting failed: {0}")]
    Posting(String),

    #[error("Network error: {0}")]
    Network(String),

    #[error("No publisher configured for {0}")]
    NotConfigured(String),
}
