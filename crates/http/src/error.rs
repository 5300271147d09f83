use thiserror::Error;

/// Result type for remote spreadsheet operations.
pub type SheetsResult<T> = Result<T, SheetsError>;

/// Errors raised while talking to the spreadsheet API.
#[derive(Debug, Error)]
pub enum SheetsError {
    /// The key file is missing or malformed.
    #[error("Credentials error: {0}")]
    Credentials(String),

    /// The token endpoint refused the assertion.
    #[error("Token exchange failed: {0}")]
    Token(String),

    /// The URL does not identify a spreadsheet.
    #[error("Invalid spreadsheet URL: {0}")]
    InvalidUrl(String),

    /// Transport failure or non-success status.
    #[error("HTTP error: {0}")]
    Http(String),

    /// Response body did not have the expected shape.
    #[error("Unexpected response: {0}")]
    Decode(String),
}
