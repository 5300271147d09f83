use crate::views::SheetViews;
use returnboard_core::{LoadReport, SkippedSheet, TabError};
use serde::Serialize;

/// Every sheet's derived views plus the load notices, for the JSON API.
#[derive(Debug, Clone, Serialize)]
pub struct DashboardReport {
    pub source: String,
    pub sheets: Vec<SheetViews>,
    pub skipped: Vec<SkippedSheet>,
    pub tab_errors: Vec<TabError>,
}

impl DashboardReport {
    #[must_use]
    pub fn from_load(report: &LoadReport) -> Self {
        Self {
            source: report.source.clone(),
            sheets: report
                .sheets
                .iter()
                .filter_map(|(name, table)| SheetViews::build(name, table))
                .collect(),
            skipped: report.skipped.clone(),
            tab_errors: report.tab_errors.clone(),
        }
    }
}
