use crate::book::Book;
use crate::cell::CellValue;
use crate::error::{Result, SheetError};
use crate::sheet::Sheet;
use calamine::{open_workbook_auto_from_rs, Data, Reader};
use chrono::{Duration, NaiveDate};
use rust_xlsxwriter::Workbook;
use std::io::{Cursor, Read, Seek};
use std::path::Path;

/// Options for reading workbooks
#[derive(Debug, Clone, Default)]
pub struct WorkbookReadOptions {
    /// Whether the first row of each sheet contains headers
    pub has_headers: bool,
}

impl WorkbookReadOptions {
    /// Set whether the first row contains headers
    #[must_use]
    pub fn with_headers(mut self, has_headers: bool) -> Self {
        self.has_headers = has_headers;
        self
    }
}

/// One decoded tab. A tab that fails to decode does not fail its siblings.
#[derive(Debug)]
pub struct WorkbookSheet {
    pub name: String,
    pub sheet: Result<Sheet>,
}

/// Render an Excel serial date as `YYYY-MM-DD HH:MM:SS`.
/// Excel counts days from 1899-12-30.
fn excel_serial_to_text(serial: f64) -> Option<String> {
    let epoch = NaiveDate::from_ymd_opt(1899, 12, 30)?.and_hms_opt(0, 0, 0)?;
    let millis = (serial * 86_400_000.0).round() as i64;
    let stamp = epoch.checked_add_signed(Duration::try_milliseconds(millis)?)?;
    Some(stamp.format("%Y-%m-%d %H:%M:%S").to_string())
}

/// Convert calamine Data to CellValue
fn data_to_cell_value(data: &Data) -> CellValue {
    match data {
        Data::Empty => CellValue::Null,
        Data::Bool(b) => CellValue::Bool(*b),
        Data::Int(i) => CellValue::Int(*i),
        Data::Float(f) => CellValue::Float(*f),
        Data::String(s) => CellValue::String(s.clone()),
        Data::DateTime(dt) => excel_serial_to_text(dt.as_f64())
            .map_or_else(|| CellValue::Float(dt.as_f64()), CellValue::String),
        Data::DateTimeIso(s) => CellValue::String(s.clone()),
        Data::DurationIso(s) => CellValue::String(s.clone()),
        Data::Error(e) => CellValue::String(format!("#ERROR: {e:?}")),
    }
}

/// Decode every tab of a workbook (xlsx, xlsm, xlsb, xls or ods).
///
/// Fails only if the workbook itself cannot be opened; a tab whose range
/// cannot be read is returned as an `Err` in its own [`WorkbookSheet`].
pub fn decode_workbook<RS>(reader: RS, options: &WorkbookReadOptions) -> Result<Vec<WorkbookSheet>>
where
    RS: Read + Seek + Clone,
{
    let mut workbook =
        open_workbook_auto_from_rs(reader).map_err(|e| SheetError::Workbook(e.to_string()))?;

    let sheet_names = workbook.sheet_names();
    let mut decoded = Vec::with_capacity(sheet_names.len());

    for name in sheet_names {
        let sheet = workbook
            .worksheet_range(&name)
            .map_err(|e| SheetError::Worksheet {
                sheet: name.clone(),
                message: e.to_string(),
            })
            .map(|range| {
                let mut sheet = Sheet::with_name(&name);
                *sheet.data_mut() = range
                    .rows()
                    .map(|row| row.iter().map(data_to_cell_value).collect())
                    .collect();

                if options.has_headers && sheet.row_count() > 0 {
                    // Non-empty, so promotion cannot fail
                    let _ = sheet.promote_header_row();
                }
                sheet
            });

        decoded.push(WorkbookSheet { name, sheet });
    }

    Ok(decoded)
}

impl Book {
    /// Load a book from in-memory workbook bytes (all sheets)
    ///
    /// # Errors
    ///
    /// Returns error if the workbook or any of its sheets cannot be read.
    pub fn from_bytes(bytes: Vec<u8>, options: &WorkbookReadOptions) -> Result<Self> {
        let mut book = Book::new();
        for decoded in decode_workbook(Cursor::new(bytes), options)? {
            book.add_sheet(&decoded.name, decoded.sheet?)?;
        }
        Ok(book)
    }

    /// Load a book from a workbook file (all sheets)
    ///
    /// # Errors
    ///
    /// Returns error if file cannot be opened or read.
    pub fn from_path<P: AsRef<Path>>(path: P, options: &WorkbookReadOptions) -> Result<Self> {
        let bytes = std::fs::read(path.as_ref())?;
        Self::from_bytes(bytes, options)
    }

    /// Save the book to an xlsx file. Header rows are written first.
    ///
    /// # Errors
    ///
    /// Returns error if file cannot be created or written.
    pub fn save_as_xlsx<P: AsRef<Path>>(&self, path: P) -> Result<()> {
        let mut workbook = Workbook::new();

        for (name, sheet) in self.sheets() {
            let worksheet = workbook.add_worksheet();
            worksheet
                .set_name(name)
                .map_err(|e| SheetError::Write(e.to_string()))?;

            let header: Option<Vec<CellValue>> = sheet
                .column_names()
                .map(|names| names.iter().map(|n| CellValue::from(n.as_str())).collect());

            for (row_idx, row) in header.iter().chain(sheet.rows()).enumerate() {
                let row_num = u32::try_from(row_idx)
                    .map_err(|_| SheetError::Write("Row index overflow".to_string()))?;
                for (col_idx, cell) in row.iter().enumerate() {
                    let col_num = u16::try_from(col_idx)
                        .map_err(|_| SheetError::Write("Column index overflow".to_string()))?;

                    let written = match cell {
                        CellValue::Null => continue,
                        CellValue::Bool(b) => worksheet.write_boolean(row_num, col_num, *b),
                        // Excel stores all numbers as f64
                        CellValue::Int(i) => worksheet.write_number(row_num, col_num, *i as f64),
                        CellValue::Float(f) => worksheet.write_number(row_num, col_num, *f),
                        CellValue::String(s) => worksheet.write_string(row_num, col_num, s),
                    };
                    written.map_err(|e| SheetError::Write(e.to_string()))?;
                }
            }
        }

        workbook
            .save(path.as_ref())
            .map_err(|e| SheetError::Write(e.to_string()))?;

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    fn cell(sheet: &Sheet, row: usize, column: &str) -> CellValue {
        let index = sheet.column_index(column).unwrap();
        sheet.rows().nth(row).unwrap()[index].clone()
    }

    fn headed_options() -> WorkbookReadOptions {
        WorkbookReadOptions::default().with_headers(true)
    }

    #[test]
    fn test_excel_serial_to_text() {
        assert_eq!(
            excel_serial_to_text(45_292.0).as_deref(),
            Some("2024-01-01 00:00:00")
        );
        assert_eq!(
            excel_serial_to_text(45_292.5).as_deref(),
            Some("2024-01-01 12:00:00")
        );
    }

    #[test]
    fn test_book_xlsx_roundtrip_with_headers() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("book.xlsx");

        let mut book = Book::new();
        book.add_sheet(
            "1월",
            Sheet::with_header(
                "1월",
                vec!["모델명", "처리방식", "수량"],
                vec![vec![CellValue::from("M1"), "단순변심".into(), 3.into()]],
            ),
        )
        .unwrap();
        book.add_sheet("Notes", Sheet::from_data(vec![vec!["free text"]]))
            .unwrap();
        book.save_as_xlsx(&path).unwrap();

        let loaded = Book::from_path(&path, &headed_options()).unwrap();
        assert_eq!(loaded.sheet_names(), vec!["1월", "Notes"]);

        let sheet = loaded.get_sheet("1월").unwrap();
        assert_eq!(sheet.row_count(), 1);
        assert_eq!(cell(sheet, 0, "모델명").as_str(), "M1");
        // Integers come back as floats
        assert_eq!(cell(sheet, 0, "수량").as_number(), Some(3.0));
    }

    #[test]
    fn test_decode_without_headers() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("plain.xlsx");

        let mut book = Book::new();
        book.add_sheet("Data", Sheet::from_data(vec![vec![1, 2], vec![3, 4]]))
            .unwrap();
        book.save_as_xlsx(&path).unwrap();

        let bytes = std::fs::read(&path).unwrap();
        let decoded = decode_workbook(Cursor::new(bytes), &WorkbookReadOptions::default()).unwrap();
        assert_eq!(decoded.len(), 1);

        let sheet = decoded[0].sheet.as_ref().unwrap();
        assert!(sheet.column_names().is_none());
        assert_eq!(sheet.row_count(), 2);
    }

    #[test]
    fn test_empty_tab_has_no_header() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("empty.xlsx");

        let mut book = Book::new();
        book.add_sheet("Blank", Sheet::new()).unwrap();
        book.save_as_xlsx(&path).unwrap();

        let loaded = Book::from_path(&path, &headed_options()).unwrap();
        assert!(loaded.get_sheet("Blank").unwrap().is_empty());
    }

    #[test]
    fn test_garbage_bytes_are_rejected() {
        let result = Book::from_bytes(b"not a workbook".to_vec(), &headed_options());
        assert!(matches!(result, Err(SheetError::Workbook(_))));
    }
}
