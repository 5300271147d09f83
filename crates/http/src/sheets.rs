use crate::client::{HttpClient, RemoteOptions};
use crate::credentials::{AccessToken, ServiceAccountKey};
use crate::error::{SheetsError, SheetsResult};
use reqwest::Url;
use serde::Deserialize;
use serde_json::Value as JsonValue;
use tracing::debug;

/// Extract the document id from a spreadsheet URL
/// (`https://docs.google.com/spreadsheets/d/<id>/edit#gid=0`).
pub fn spreadsheet_id_from_url(url: &str) -> SheetsResult<String> {
    let parsed = Url::parse(url.trim()).map_err(|e| SheetsError::InvalidUrl(format!("{url}: {e}")))?;
    let segments: Vec<&str> = parsed
        .path_segments()
        .map(|s| s.collect::<Vec<_>>())
        .unwrap_or_default();

    segments
        .windows(3)
        .find(|w| w[0] == "spreadsheets" && w[1] == "d" && !w[2].is_empty())
        .map(|w| w[2].to_string())
        .ok_or_else(|| SheetsError::InvalidUrl(format!("{url}: no /spreadsheets/d/<id> segment")))
}

/// Quote a tab title as an A1 range covering the whole tab.
fn whole_sheet_range(title: &str) -> String {
    format!("'{}'", title.replace('\'', "''"))
}

/// Formatted cell value as text; the API may still send numbers or booleans.
fn json_cell_to_text(value: JsonValue) -> String {
    match value {
        JsonValue::Null => String::new(),
        JsonValue::String(s) => s,
        other => other.to_string(),
    }
}

#[derive(Debug, Deserialize)]
struct SpreadsheetResponse {
    #[serde(default)]
    properties: Option<TitleProperties>,
    #[serde(default)]
    sheets: Vec<SheetEntry>,
}

#[derive(Debug, Deserialize)]
struct SheetEntry {
    properties: TitleProperties,
}

#[derive(Debug, Deserialize)]
struct TitleProperties {
    title: String,
}

#[derive(Debug, Deserialize)]
struct ValueRangeResponse {
    #[serde(default)]
    values: Vec<Vec<JsonValue>>,
}

/// One tab of a remote spreadsheet.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Worksheet {
    pub title: String,
}

/// An opened remote spreadsheet.
#[derive(Debug, Clone)]
pub struct Spreadsheet {
    pub id: String,
    pub title: String,
    worksheets: Vec<Worksheet>,
}

impl Spreadsheet {
    /// Tabs in document order.
    #[must_use]
    pub fn worksheets(&self) -> &[Worksheet] {
        &self.worksheets
    }
}

/// An authenticated Sheets API client.
#[derive(Debug, Clone)]
pub struct SheetsClient {
    http: HttpClient,
    token: AccessToken,
    api_base: String,
}

impl SheetsClient {
    /// Exchange the service-account key for a token.
    pub async fn authenticate(
        http: HttpClient,
        key: &ServiceAccountKey,
        options: &RemoteOptions,
    ) -> SheetsResult<Self> {
        let token = key.exchange(&http).await?;
        debug!(account = %key.client_email, expires_at = %token.expires_at, "authenticated");
        Ok(Self {
            http,
            token,
            api_base: options.api_base.trim_end_matches('/').to_string(),
        })
    }

    fn endpoint(&self, segments: &[&str]) -> SheetsResult<Url> {
        let mut url = Url::parse(&self.api_base)
            .map_err(|e| SheetsError::InvalidUrl(format!("{}: {e}", self.api_base)))?;
        url.path_segments_mut()
            .map_err(|()| SheetsError::InvalidUrl(self.api_base.clone()))?
            .pop_if_empty()
            .extend(segments);
        Ok(url)
    }

    /// Open a document and list its tabs.
    pub async fn open_by_url(&self, url: &str) -> SheetsResult<Spreadsheet> {
        let id = spreadsheet_id_from_url(url)?;
        let endpoint = self.endpoint(&["spreadsheets", &id])?;

        let response = self
            .http
            .send(|client| {
                client
                    .get(endpoint.clone())
                    .bearer_auth(&self.token.token)
                    .query(&[("fields", "properties.title,sheets.properties.title")])
            })
            .await?;

        let body: SpreadsheetResponse = response
            .json()
            .await
            .map_err(|e| SheetsError::Decode(e.to_string()))?;

        Ok(Spreadsheet {
            title: body.properties.map(|p| p.title).unwrap_or_else(|| id.clone()),
            id,
            worksheets: body
                .sheets
                .into_iter()
                .map(|entry| Worksheet {
                    title: entry.properties.title,
                })
                .collect(),
        })
    }

    /// Fetch every cell of a tab as formatted text, row by row.
    ///
    /// Trailing empty cells are omitted by the API, so rows may be ragged.
    pub async fn get_all_values(
        &self,
        spreadsheet: &Spreadsheet,
        worksheet: &Worksheet,
    ) -> SheetsResult<Vec<Vec<String>>> {
        let range = whole_sheet_range(&worksheet.title);
        let endpoint = self.endpoint(&["spreadsheets", &spreadsheet.id, "values", &range])?;

        let response = self
            .http
            .send(|client| {
                client
                    .get(endpoint.clone())
                    .bearer_auth(&self.token.token)
                    .query(&[
                        ("majorDimension", "ROWS"),
                        ("valueRenderOption", "FORMATTED_VALUE"),
                    ])
            })
            .await?;

        let body: ValueRangeResponse = response
            .json()
            .await
            .map_err(|e| SheetsError::Decode(e.to_string()))?;

        Ok(body
            .values
            .into_iter()
            .map(|row| row.into_iter().map(json_cell_to_text).collect())
            .collect())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_spreadsheet_id_from_url() {
        assert_eq!(
            spreadsheet_id_from_url("https://docs.google.com/spreadsheets/d/1AbC-xyz_9/edit#gid=0")
                .unwrap(),
            "1AbC-xyz_9"
        );
        assert_eq!(
            spreadsheet_id_from_url(" https://docs.google.com/spreadsheets/u/1/d/KEY ").unwrap(),
            "KEY"
        );
    }

    #[test]
    fn test_spreadsheet_id_from_bad_url() {
        assert!(matches!(
            spreadsheet_id_from_url("not a url"),
            Err(SheetsError::InvalidUrl(_))
        ));
        assert!(matches!(
            spreadsheet_id_from_url("https://docs.google.com/document/d/KEY/edit"),
            Err(SheetsError::InvalidUrl(_))
        ));
    }

    #[test]
    fn test_whole_sheet_range_quotes_titles() {
        assert_eq!(whole_sheet_range("1월"), "'1월'");
        assert_eq!(whole_sheet_range("Bob's tab"), "'Bob''s tab'");
    }

    #[test]
    fn test_json_cell_to_text() {
        assert_eq!(json_cell_to_text(JsonValue::from("M1")), "M1");
        assert_eq!(json_cell_to_text(JsonValue::from(3)), "3");
        assert_eq!(json_cell_to_text(JsonValue::Null), "");
    }
}
