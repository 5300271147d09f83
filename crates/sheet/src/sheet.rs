use crate::cell::CellValue;
use crate::error::{Result, SheetError};
use std::collections::HashMap;

/// A sheet representing a 2D grid of cells (row-major storage)
///
/// When a header is present it is kept apart from the data rows, so
/// `row_count()` only counts records.
#[derive(Debug, Clone)]
pub struct Sheet {
    name: String,
    data: Vec<Vec<CellValue>>,
    column_names: Option<Vec<String>>,
    column_index: Option<HashMap<String, usize>>,
}

impl Sheet {
    /// Create a new empty sheet
    #[must_use]
    pub fn new() -> Self {
        Self::with_name("Sheet1")
    }

    /// Create a new empty sheet with a name
    #[must_use]
    pub fn with_name(name: &str) -> Self {
        Sheet {
            name: name.to_string(),
            data: Vec::new(),
            column_names: None,
            column_index: None,
        }
    }

    /// Create a sheet from a 2D vector of values (no header)
    #[must_use]
    pub fn from_data<T: Into<CellValue>>(data: Vec<Vec<T>>) -> Self {
        let mut sheet = Self::new();
        sheet.data = data
            .into_iter()
            .map(|row| row.into_iter().map(Into::into).collect())
            .collect();
        sheet
    }

    /// Create a named sheet from a header and data rows
    #[must_use]
    pub fn with_header<H, T>(name: &str, header: Vec<H>, rows: Vec<Vec<T>>) -> Self
    where
        H: Into<String>,
        T: Into<CellValue>,
    {
        let mut sheet = Self::with_name(name);
        sheet.data = rows
            .into_iter()
            .map(|row| row.into_iter().map(Into::into).collect())
            .collect();
        sheet.set_column_names(header.into_iter().map(Into::into).collect());
        sheet
    }

    /// Get the sheet name
    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Set the sheet name
    pub fn set_name(&mut self, name: &str) {
        self.name = name.to_string();
    }

    /// Get the number of data rows (the header is not counted)
    #[must_use]
    pub fn row_count(&self) -> usize {
        self.data.len()
    }

    /// Check if the sheet has neither a header nor data
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.data.is_empty() && self.column_names.is_none()
    }

    // ===== Row Access =====

    /// Iterate over data rows
    pub fn rows(&self) -> impl Iterator<Item = &Vec<CellValue>> {
        self.data.iter()
    }

    /// Get mutable reference to the raw data rows
    pub fn data_mut(&mut self) -> &mut Vec<Vec<CellValue>> {
        &mut self.data
    }

    // ===== Named Access =====

    /// Consume the first data row and use it as column headers.
    ///
    /// Header cells are converted to text. When a name appears more than
    /// once, lookups resolve to its first occurrence.
    pub fn promote_header_row(&mut self) -> Result<()> {
        if self.data.is_empty() {
            return Err(SheetError::NoHeaderRow);
        }
        let header = self.data.remove(0);
        self.set_column_names(header.iter().map(CellValue::as_str).collect());
        Ok(())
    }

    /// Get column names (if set)
    #[must_use]
    pub fn column_names(&self) -> Option<&Vec<String>> {
        self.column_names.as_ref()
    }

    /// Position of a named column, if the sheet has a header containing it
    #[must_use]
    pub fn column_index(&self, name: &str) -> Option<usize> {
        self.column_index.as_ref()?.get(name).copied()
    }

    /// Names from `required` that the header does not contain, in the given order
    #[must_use]
    pub fn missing_columns(&self, required: &[&str]) -> Vec<String> {
        required
            .iter()
            .filter(|name| self.column_index(name).is_none())
            .map(|name| (*name).to_string())
            .collect()
    }

    fn set_column_names(&mut self, names: Vec<String>) {
        let mut index_map = HashMap::with_capacity(names.len());
        for (i, name) in names.iter().enumerate() {
            index_map.entry(name.clone()).or_insert(i);
        }
        self.column_names = Some(names);
        self.column_index = Some(index_map);
    }
}

impl Default for Sheet {
    fn default() -> Self {
        Self::new()
    }
}
