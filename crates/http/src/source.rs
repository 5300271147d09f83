use crate::client::{HttpClient, RemoteOptions};
use crate::credentials::ServiceAccountKey;
use crate::sheets::SheetsClient;
use async_trait::async_trait;
use returnboard_core::{LoadError, SourceSheet, TableSource};
use returnboard_sheet::{CellValue, Sheet};
use tracing::{info, warn};

/// Build a raw table from text rows: the first row is the header, the rest
/// are data. Ragged rows are padded to the widest row.
pub fn rows_to_sheet(title: &str, rows: Vec<Vec<String>>) -> Sheet {
    let mut rows = rows.into_iter();
    let Some(header) = rows.next() else {
        return Sheet::with_name(title);
    };

    let data: Vec<Vec<CellValue>> = rows
        .map(|row| {
            row.into_iter()
                .map(|cell| {
                    if cell.is_empty() {
                        CellValue::Null
                    } else {
                        CellValue::String(cell)
                    }
                })
                .collect()
        })
        .collect();

    let width = data.iter().map(Vec::len).chain([header.len()]).max().unwrap_or(0);
    let mut header = header;
    header.resize(width, String::new());
    let data = data
        .into_iter()
        .map(|mut row| {
            row.resize(width, CellValue::Null);
            row
        })
        .collect();

    Sheet::with_header(title, header, data)
}

/// A shared Google spreadsheet read through the Sheets API.
#[derive(Debug, Clone)]
pub struct RemoteSpreadsheetSource {
    url: String,
    options: RemoteOptions,
}

impl RemoteSpreadsheetSource {
    pub fn new(url: impl Into<String>, options: RemoteOptions) -> Self {
        Self {
            url: url.into(),
            options,
        }
    }

    async fn connect(&self) -> Result<SheetsClient, LoadError> {
        let key = ServiceAccountKey::from_file(&self.options.credentials_path)
            .map_err(|e| LoadError::Auth(e.to_string()))?;
        let http = HttpClient::new(&self.options).map_err(|e| LoadError::Auth(e.to_string()))?;
        SheetsClient::authenticate(http, &key, &self.options)
            .await
            .map_err(|e| LoadError::Auth(e.to_string()))
    }
}

#[async_trait]
impl TableSource for RemoteSpreadsheetSource {
    fn describe(&self) -> String {
        self.url.clone()
    }

    async fn list_sheets(&self) -> Result<Vec<SourceSheet>, LoadError> {
        let client = self.connect().await?;
        let document = client
            .open_by_url(&self.url)
            .await
            .map_err(|e| LoadError::Open(e.to_string()))?;
        info!(
            document = %document.title,
            tabs = document.worksheets().len(),
            "opened spreadsheet"
        );

        let mut listing = Vec::with_capacity(document.worksheets().len());
        for worksheet in document.worksheets() {
            let sheet = match client.get_all_values(&document, worksheet).await {
                Ok(rows) => SourceSheet::ok(&worksheet.title, rows_to_sheet(&worksheet.title, rows)),
                Err(err) => {
                    warn!(sheet = %worksheet.title, error = %err, "could not fetch tab");
                    SourceSheet::failed(&worksheet.title, err.to_string())
                }
            };
            listing.push(sheet);
        }

        Ok(listing)
    }
}
