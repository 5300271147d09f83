//! Raw sheet/book model for returnboard
//!
//! A [`Sheet`] is a named grid of [`CellValue`]s with an optional header row;
//! a [`Book`] keeps several sheets in tab order. Workbooks are decoded with
//! calamine from a path or from uploaded bytes.
//!
//! # Examples
//!
//! ## Creating a sheet with a header
//!
//! ```
//! use returnboard_sheet::{CellValue, Sheet};
//!
//! let sheet = Sheet::with_header(
//!     "Returns",
//!     vec!["모델명", "처리방식", "수량"],
//!     vec![vec![CellValue::from("M1"), "단순변심".into(), 3.into()]],
//! );
//!
//! assert_eq!(sheet.row_count(), 1);
//! assert_eq!(sheet.column_index("수량"), Some(2));
//! ```
//!
//! ## Working with books
//!
//! ```
//! use returnboard_sheet::{Book, Sheet};
//!
//! let mut book = Book::new();
//! book.add_sheet("January", Sheet::new()).unwrap();
//! book.add_sheet("February", Sheet::new()).unwrap();
//!
//! assert_eq!(book.sheet_names(), vec!["January", "February"]);
//! ```

mod book;
mod cell;
mod error;
mod sheet;
mod workbook;

/// Re-export book type.
pub use book::Book;
/// Re-export cell value type.
pub use cell::CellValue;
/// Re-export sheet error types.
pub use error::{Result, SheetError};
/// Re-export sheet type.
pub use sheet::Sheet;
/// Re-export workbook decoding.
pub use workbook::{decode_workbook, WorkbookReadOptions, WorkbookSheet};
