//! # returnboard-core
//!
//! Cleaning pipeline and data sources for the returns dashboard.
//!
//! This crate provides:
//! - The row validator/cleaner that turns a raw [`Sheet`](returnboard_sheet::Sheet)
//!   into a [`CleanedTable`]
//! - The [`TableSource`] capability and its local workbook implementation
//! - The load pipeline producing a [`LoadReport`]
//! - The two error kinds: fatal [`LoadError`] and per-tab [`TabError`]

/// Row validation, normalization and aggregation.
pub mod clean;
/// Error types.
pub mod error;
/// Load pipeline from a source to a sheet collection.
pub mod load;
/// Cleaned record and collection types.
pub mod record;
/// Table sources.
pub mod source;

pub use clean::{
    clean, clean_with_stats, is_known_disposition, validate_model, CleanStats, RowRejection,
    DISPOSITION_CODES, DISPOSITION_COLUMN, MODEL_COLUMN, QUANTITY_COLUMN, REQUIRED_COLUMNS,
};
pub use error::{LoadError, MissingColumns, TabError};
pub use load::{collect, load, LoadReport, SkipReason, SkippedSheet};
pub use record::{CleanedRecord, CleanedTable, SheetCollection};
pub use source::{SourceSheet, TableSource, WorkbookSource};
