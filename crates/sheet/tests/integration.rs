use returnboard_sheet::{decode_workbook, Book, CellValue, Sheet, SheetError, WorkbookReadOptions};
use std::io::Cursor;
use tempfile::tempdir;

fn headed() -> WorkbookReadOptions {
    WorkbookReadOptions::default().with_headers(true)
}

fn cell(sheet: &Sheet, row: usize, column: &str) -> CellValue {
    let index = sheet.column_index(column).unwrap();
    sheet.rows().nth(row).unwrap()[index].clone()
}

// ===== Sheet Creation Tests =====

#[test]
fn test_sheet_from_data() {
    let sheet = Sheet::from_data(vec![vec![1, 2, 3], vec![4, 5, 6]]);

    assert_eq!(sheet.row_count(), 2);
    assert!(sheet.column_names().is_none());
    let last: Vec<&CellValue> = sheet.rows().map(|row| &row[2]).collect();
    assert_eq!(last, vec![&CellValue::Int(3), &CellValue::Int(6)]);
}

#[test]
fn test_with_header_lookup() {
    let sheet = Sheet::with_header(
        "Returns",
        vec!["모델명", "처리방식", "수량"],
        vec![
            vec![CellValue::from("A-100"), "물량교환".into(), 2.into()],
            vec![CellValue::from("B-200"), "오배송환불".into(), "5".into()],
        ],
    );

    assert_eq!(sheet.name(), "Returns");
    assert_eq!(sheet.column_names().unwrap().len(), 3);
    let quantity = sheet.column_index("수량").unwrap();
    let counts: Vec<f64> = sheet
        .rows()
        .filter_map(|row| row[quantity].as_number())
        .collect();
    assert_eq!(counts, vec![2.0, 5.0]);
}

// ===== Workbook Decoding Tests =====

#[test]
fn test_multi_tab_workbook_keeps_tab_order() {
    let dir = tempdir().unwrap();
    let path = dir.path().join("multi.xlsx");

    let mut book = Book::new();
    for name in ["Third", "First", "Second"] {
        book.add_sheet(
            name,
            Sheet::with_header(name, vec!["모델명"], vec![vec![CellValue::from(name)]]),
        )
        .unwrap();
    }
    book.save_as_xlsx(&path).unwrap();

    let loaded = Book::from_path(&path, &headed()).unwrap();
    assert_eq!(loaded.sheet_names(), vec!["Third", "First", "Second"]);
    assert_eq!(
        cell(loaded.get_sheet("First").unwrap(), 0, "모델명").as_str(),
        "First"
    );
}

#[test]
fn test_decode_workbook_from_bytes() {
    let dir = tempdir().unwrap();
    let path = dir.path().join("bytes.xlsx");

    let mut book = Book::new();
    book.add_sheet(
        "Data",
        Sheet::with_header(
            "Data",
            vec!["모델명", "수량"],
            vec![vec![CellValue::from("X1"), CellValue::Float(1.5)]],
        ),
    )
    .unwrap();
    book.save_as_xlsx(&path).unwrap();

    let bytes = std::fs::read(&path).unwrap();
    let decoded = decode_workbook(Cursor::new(bytes), &headed()).unwrap();

    assert_eq!(decoded.len(), 1);
    assert_eq!(decoded[0].name, "Data");
    let sheet = decoded[0].sheet.as_ref().unwrap();
    assert_eq!(cell(sheet, 0, "수량").as_number(), Some(1.5));
}

#[test]
fn test_missing_file() {
    let dir = tempdir().unwrap();
    let result = Book::from_path(dir.path().join("absent.xlsx"), &headed());
    assert!(matches!(result, Err(SheetError::Io(_))));
}
