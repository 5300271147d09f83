//! Error types for returnboard.
//!
//! Loading has two failure levels that must stay distinct: a [`LoadError`]
//! aborts the whole load and no tabs are shown, while a [`TabError`] only
//! removes the one tab it names.

use serde::Serialize;
use thiserror::Error;

/// Failure that aborts an entire load.
#[derive(Debug, Error)]
pub enum LoadError {
    /// Credentials could not be read or were rejected.
    #[error("Authentication failed: {0}")]
    Auth(String),

    /// The remote document could not be opened or listed.
    #[error("Could not open spreadsheet: {0}")]
    Open(String),

    /// The workbook file could not be read or decoded.
    #[error("Could not read workbook: {0}")]
    Workbook(String),

    /// Internal error (should not happen).
    #[error("Internal error: {0}")]
    Internal(String),
}

impl LoadError {
    /// Short machine-readable kind, used by the JSON API.
    #[must_use]
    pub fn kind(&self) -> &'static str {
        match self {
            Self::Auth(_) => "auth",
            Self::Open(_) => "open",
            Self::Workbook(_) => "workbook",
            Self::Internal(_) => "internal",
        }
    }
}

impl From<returnboard_sheet::SheetError> for LoadError {
    fn from(err: returnboard_sheet::SheetError) -> Self {
        Self::Workbook(err.to_string())
    }
}

/// Failure confined to one tab; the remaining tabs still load.
#[derive(Debug, Clone, PartialEq, Error, Serialize)]
#[error("{sheet}: {message}")]
pub struct TabError {
    pub sheet: String,
    pub message: String,
}

impl TabError {
    pub fn new(sheet: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            sheet: sheet.into(),
            message: message.into(),
        }
    }
}

/// A sheet lacks one or more of the required columns.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("Missing required columns: {}", .missing.join(", "))]
pub struct MissingColumns {
    pub missing: Vec<String>,
}
