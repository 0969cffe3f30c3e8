// Error types shared by the controller and its collaborators.
//
// Validation failures are kept in their own enum because their `Display`
// text is exactly what the user sees in the error banner.

use thiserror::Error;

/// Input rejected before any request is made.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum ValidationError {
    #[error("Please enter some text to clean.")]
    NoText,
    #[error("Please select a file to clean.")]
    NoFile,
}

/// Crate-wide error type.
#[derive(Debug, Error)]
pub enum UnicodeFixError {
    #[error(transparent)]
    Validation(#[from] ValidationError),

    /// A request is already in flight.
    #[error("a cleaning request is already in progress")]
    Busy,

    #[error("HTTP client error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("preference store error: {0}")]
    Storage(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

pub type Result<T> = std::result::Result<T, UnicodeFixError>;
