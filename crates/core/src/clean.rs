use crate::error::MissingColumns;
use crate::record::{CleanedRecord, CleanedTable};
use indexmap::IndexMap;
use regex::Regex;
use returnboard_sheet::{CellValue, Sheet};
use std::fmt;

/// Column holding the product model identifier.
pub const MODEL_COLUMN: &str = "모델명";
/// Column holding the disposition code.
pub const DISPOSITION_COLUMN: &str = "처리방식";
/// Column holding the returned quantity.
pub const QUANTITY_COLUMN: &str = "수량";

pub const REQUIRED_COLUMNS: [&str; 3] = [MODEL_COLUMN, DISPOSITION_COLUMN, QUANTITY_COLUMN];

/// Recognized disposition codes, matched verbatim.
///
/// `수거하면할` and `수거하면 할` are distinct entries.
pub const DISPOSITION_CODES: [&str; 9] = [
    "단순변심",
    "수거하면할",
    "물량교환",
    "물량환불",
    "수거하면 할",
    "오배송환불",
    "오배송교환",
    "본사교환(오주문)",
    "택배사사고환불",
];

fn digits_only_regex() -> &'static Regex {
    static RE: std::sync::OnceLock<Regex> = std::sync::OnceLock::new();
    RE.get_or_init(|| Regex::new(r"^\d+$").expect("valid regex"))
}

fn date_like_regex() -> &'static Regex {
    static RE: std::sync::OnceLock<Regex> = std::sync::OnceLock::new();
    RE.get_or_init(|| Regex::new(r"\d{2,4}[-/]\d{1,2}[-/]\d{1,2}").expect("valid regex"))
}

/// Why a raw row was excluded, in the order the checks run.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RowRejection {
    EmptyModel,
    NumericModel,
    DateLikeModel,
    LeadingSymbol,
    UnknownDisposition,
}

impl fmt::Display for RowRejection {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let text = match self {
            Self::EmptyModel => "empty model",
            Self::NumericModel => "numeric model",
            Self::DateLikeModel => "date-like model",
            Self::LeadingSymbol => "model starts with a symbol",
            Self::UnknownDisposition => "unknown disposition",
        };
        f.write_str(text)
    }
}

/// Counters describing one cleaning pass.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CleanStats {
    pub input_rows: usize,
    pub empty_model: usize,
    pub numeric_model: usize,
    pub date_like_model: usize,
    pub leading_symbol: usize,
    pub unknown_disposition: usize,
    pub aggregated_rows: usize,
    pub non_positive: usize,
}

impl CleanStats {
    fn reject(&mut self, reason: RowRejection) {
        let counter = match reason {
            RowRejection::EmptyModel => &mut self.empty_model,
            RowRejection::NumericModel => &mut self.numeric_model,
            RowRejection::DateLikeModel => &mut self.date_like_model,
            RowRejection::LeadingSymbol => &mut self.leading_symbol,
            RowRejection::UnknownDisposition => &mut self.unknown_disposition,
        };
        *counter += 1;
    }

    /// Rows removed by any of the row predicates.
    #[must_use]
    pub fn rejected_rows(&self) -> usize {
        self.empty_model
            + self.numeric_model
            + self.date_like_model
            + self.leading_symbol
            + self.unknown_disposition
    }
}

#[must_use]
pub fn is_known_disposition(code: &str) -> bool {
    DISPOSITION_CODES.contains(&code)
}

fn starts_with_word_char(model: &str) -> bool {
    model
        .chars()
        .next()
        .is_some_and(|c| matches!(c, 'A'..='Z' | 'a'..='z' | '0'..='9' | '가'..='힣'))
}

/// Check a trimmed model identifier against the identifier rules.
pub fn validate_model(model: &str) -> Result<(), RowRejection> {
    if model.is_empty() {
        return Err(RowRejection::EmptyModel);
    }
    if digits_only_regex().is_match(model) {
        return Err(RowRejection::NumericModel);
    }
    if date_like_regex().is_match(model) {
        return Err(RowRejection::DateLikeModel);
    }
    if !starts_with_word_char(model) {
        return Err(RowRejection::LeadingSymbol);
    }
    Ok(())
}

fn validate_row(model: &str, disposition: &str) -> Result<(), RowRejection> {
    validate_model(model)?;
    if !is_known_disposition(disposition) {
        return Err(RowRejection::UnknownDisposition);
    }
    Ok(())
}

fn cell_text(row: &[CellValue], index: usize) -> String {
    row.get(index)
        .map(|cell| cell.as_str().trim().to_string())
        .unwrap_or_default()
}

fn cell_quantity(row: &[CellValue], index: usize) -> f64 {
    row.get(index).and_then(CellValue::as_number).unwrap_or(0.0)
}

/// Clean a raw sheet into aggregated records.
///
/// Fails only when a required column is missing from the header. An empty
/// table is a valid result.
pub fn clean(sheet: &Sheet) -> Result<CleanedTable, MissingColumns> {
    clean_with_stats(sheet).map(|(table, _)| table)
}

/// [`clean`], also returning how many rows each rule removed.
pub fn clean_with_stats(sheet: &Sheet) -> Result<(CleanedTable, CleanStats), MissingColumns> {
    let (Some(model_idx), Some(disposition_idx), Some(quantity_idx)) = (
        sheet.column_index(MODEL_COLUMN),
        sheet.column_index(DISPOSITION_COLUMN),
        sheet.column_index(QUANTITY_COLUMN),
    ) else {
        return Err(MissingColumns {
            missing: sheet.missing_columns(&REQUIRED_COLUMNS),
        });
    };

    let mut stats = CleanStats {
        input_rows: sheet.row_count(),
        ..CleanStats::default()
    };
    let mut totals: IndexMap<(String, String), f64> = IndexMap::new();

    for row in sheet.rows() {
        let model = cell_text(row, model_idx);
        let disposition = cell_text(row, disposition_idx);

        if let Err(reason) = validate_row(&model, &disposition) {
            stats.reject(reason);
            continue;
        }

        *totals.entry((model, disposition)).or_insert(0.0) += cell_quantity(row, quantity_idx);
    }

    stats.aggregated_rows = totals.len();
    let records: Vec<CleanedRecord> = totals
        .into_iter()
        .filter(|(_, quantity)| *quantity > 0.0)
        .map(|((model, disposition), quantity)| CleanedRecord {
            model,
            disposition,
            quantity,
        })
        .collect();
    stats.non_positive = stats.aggregated_rows - records.len();

    Ok((CleanedTable::from_records(records), stats))
}
