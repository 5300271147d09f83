//! # returnboard-http
//!
//! Remote spreadsheet access for returnboard.
//!
//! Reads a shared Google spreadsheet with service-account credentials and
//! exposes it as a [`TableSource`](returnboard_core::TableSource):
//!
//! 1. [`SheetsClient::authenticate`] signs a JWT with the key file and trades
//!    it for a bearer token (failure is fatal)
//! 2. [`SheetsClient::open_by_url`] resolves the document and its tabs
//!    (failure is fatal)
//! 3. [`SheetsClient::get_all_values`] fetches one tab as text (failure only
//!    affects that tab)
//!
//! Every request has a bounded timeout and transient failures get one retry.

mod client;
mod credentials;
mod error;
mod sheets;
mod source;

pub use client::{HttpClient, RemoteOptions};
pub use credentials::{AccessToken, ServiceAccountKey, SHEETS_SCOPES};
pub use error::{SheetsError, SheetsResult};
pub use sheets::{spreadsheet_id_from_url, SheetsClient, Spreadsheet, Worksheet};
pub use source::{rows_to_sheet, RemoteSpreadsheetSource};
