//! Error types for the vaxsched_core library.

use std::io;

/// Result type alias using our Error type
pub type Result<T> = std::result::Result<T, Error>;

/// Core error type for vaxsched_core operations
#[derive(Debug, thiserror::Error)]
pub enum Error {
    /// IO error occurred
    #[error("IO error: {0}")]
    Io(#[from] io::Error),

    /// JSON serialization/deserialization error
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// CSV error
    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),

    /// TOML parsing error
    #[error("TOML error: {0}")]
    Toml(#[from] toml::de::Error),

    /// Configuration validation error
    #[error("Configuration error: {0}")]
    Config(String),

    /// Catalog validation error
    #[error("Catalog validation error: {0}")]
    CatalogValidation(String),

    /// Identifier that is not one of the supported vaccines
    #[error("Unknown vaccine kind: '{0}'")]
    InvalidVaccineKind(String),

    /// Date that is not a `YYYY-MM-DD` calendar date
    #[error("Invalid date '{0}': expected YYYY-MM-DD")]
    InvalidDate(String),

    /// Dose schedule could not be computed
    #[error("Schedule error: {0}")]
    Schedule(String),

    /// A required field was missing or empty
    #[error("Validation error: {0}")]
    Validation(String),

    /// The request never produced an HTTP response
    #[error("Transport error: {0}")]
    Transport(#[from] reqwest::Error),

    /// The backend answered with a non-2xx status
    #[error("HTTP {status}: {body}")]
    Http { status: u16, body: String },

    /// Staff login was rejected
    #[error("Login failed: {0}")]
    Auth(String),

    /// A staff-only operation was attempted without a session
    #[error("Not logged in: run `vaxsched login` first")]
    NotLoggedIn,

    /// The logged-in staff role may not perform the operation
    #[error("Forbidden: {0}")]
    Forbidden(String),
}
