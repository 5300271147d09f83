use crate::clean::clean_with_stats;
use crate::error::{LoadError, TabError};
use crate::record::SheetCollection;
use crate::source::{SourceSheet, TableSource};
use serde::Serialize;
use std::fmt;
use tracing::{debug, error, info, warn};

/// Why a readable sheet is absent from the collection.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "reason", content = "columns", rename_all = "snake_case")]
pub enum SkipReason {
    /// The tab has no cells at all.
    Empty,
    /// The header lacks these required columns.
    MissingColumns(Vec<String>),
    /// Every row was filtered out or totalled to zero.
    NoValidRows,
}

impl fmt::Display for SkipReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Empty => f.write_str("empty sheet"),
            Self::MissingColumns(columns) => {
                write!(f, "missing required columns: {}", columns.join(", "))
            }
            Self::NoValidRows => f.write_str("no valid rows after cleaning"),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SkippedSheet {
    pub sheet: String,
    #[serde(flatten)]
    pub reason: SkipReason,
}

/// Outcome of a load that was not fatal.
#[derive(Debug, Clone, Default, Serialize)]
pub struct LoadReport {
    pub source: String,
    pub sheets: SheetCollection,
    pub skipped: Vec<SkippedSheet>,
    pub tab_errors: Vec<TabError>,
}

impl LoadReport {
    /// At least one sheet survived cleaning.
    #[must_use]
    pub fn has_data(&self) -> bool {
        !self.sheets.is_empty()
    }
}

/// Clean every listed sheet into a report.
///
/// Failed tabs become [`TabError`]s, skipped tabs become [`SkippedSheet`]s and
/// neither stops the remaining tabs.
pub fn collect(source: impl Into<String>, listing: Vec<SourceSheet>) -> LoadReport {
    let mut report = LoadReport {
        source: source.into(),
        ..LoadReport::default()
    };

    for SourceSheet { name, content } in listing {
        let sheet = match content {
            Ok(sheet) => sheet,
            Err(err) => {
                warn!(sheet = %name, error = %err.message, "sheet failed to load");
                report.tab_errors.push(err);
                continue;
            }
        };

        let reason = if sheet.is_empty() {
            SkipReason::Empty
        } else {
            match clean_with_stats(&sheet) {
                Err(missing) => SkipReason::MissingColumns(missing.missing),
                Ok((table, stats)) => {
                    debug!(sheet = %name, ?stats, "cleaned sheet");
                    if report.sheets.insert(name.clone(), table) {
                        continue;
                    }
                    SkipReason::NoValidRows
                }
            }
        };

        info!(sheet = %name, %reason, "skipping sheet");
        report.skipped.push(SkippedSheet {
            sheet: name,
            reason,
        });
    }

    report
}

/// List a source and clean every sheet.
///
/// Returns `Err` only for failures that abort the whole load.
pub async fn load(source: &dyn TableSource) -> Result<LoadReport, LoadError> {
    let label = source.describe();
    info!(source = %label, "loading sheets");

    let listing = source.list_sheets().await.map_err(|err| {
        error!(source = %label, error = %err, "load failed");
        err
    })?;

    let report = collect(label, listing);
    info!(
        source = %report.source,
        sheets = report.sheets.len(),
        skipped = report.skipped.len(),
        failed = report.tab_errors.len(),
        "load finished"
    );
    Ok(report)
}
