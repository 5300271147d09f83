//! Remote spreadsheet tests against a mocked token endpoint and Sheets API.

use returnboard_core::{load, CleanedRecord, LoadError, SkipReason, TableSource};
use returnboard_http::{RemoteOptions, RemoteSpreadsheetSource};
use std::path::{Path, PathBuf};
use tempfile::TempDir;
use wiremock::matchers::{header, method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

const TEST_KEY: &str = include_str!("fixtures/test_service_account_key.pem");
const DOC_URL: &str = "https://docs.google.com/spreadsheets/d/doc123/edit#gid=0";

/// Write a service-account key file whose token endpoint is the mock server.
fn write_credentials(dir: &Path, server: &MockServer) -> PathBuf {
    let key = serde_json::json!({
        "type": "service_account",
        "client_email": "dashboard@test.iam.gserviceaccount.com",
        "private_key_id": "test-kid",
        "private_key": TEST_KEY,
        "token_uri": format!("{}/token", server.uri()),
    });
    let path = dir.join("credentials.json");
    std::fs::write(&path, key.to_string()).unwrap();
    path
}

fn options(credentials_path: PathBuf, server: &MockServer) -> RemoteOptions {
    RemoteOptions {
        credentials_path,
        api_base: server.uri(),
        timeout_secs: 5,
        retry_delay_ms: 10,
    }
}

async fn mount_token(server: &MockServer) {
    Mock::given(method("POST"))
        .and(path("/token"))
        .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
            "access_token": "test-token",
            "expires_in": 3600,
            "token_type": "Bearer"
        })))
        .mount(server)
        .await;
}

async fn mount_document(server: &MockServer, titles: &[&str]) {
    let sheets: Vec<_> = titles
        .iter()
        .map(|t| serde_json::json!({"properties": {"title": t}}))
        .collect();
    Mock::given(method("GET"))
        .and(path("/spreadsheets/doc123"))
        .and(header("authorization", "Bearer test-token"))
        .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
            "properties": {"title": "Returns 2024"},
            "sheets": sheets
        })))
        .mount(server)
        .await;
}

async fn mount_values(server: &MockServer, title: &str, values: serde_json::Value) {
    Mock::given(method("GET"))
        .and(path(format!("/spreadsheets/doc123/values/'{title}'")))
        .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
            "range": format!("{title}!A1:Z100"),
            "majorDimension": "ROWS",
            "values": values
        })))
        .mount(server)
        .await;
}

fn returns_rows() -> serde_json::Value {
    serde_json::json!([
        ["모델명", "처리방식", "수량"],
        ["M1", "단순변심", "3"],
        ["M1", "단순변심", "2"],
        ["M2", "1900-01-01", "5"]
    ])
}

#[tokio::test]
async fn test_remote_load_cleans_every_tab() {
    let server = MockServer::start().await;
    let dir = TempDir::new().unwrap();
    let creds = write_credentials(dir.path(), &server);

    mount_token(&server).await;
    mount_document(&server, &["January", "Notes", "Blank"]).await;
    mount_values(&server, "January", returns_rows()).await;
    mount_values(&server, "Notes", serde_json::json!([["메모"], ["hello"]])).await;
    // The API omits `values` entirely for an empty tab
    Mock::given(method("GET"))
        .and(path("/spreadsheets/doc123/values/'Blank'"))
        .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
            "range": "Blank!A1:Z1000",
            "majorDimension": "ROWS"
        })))
        .mount(&server)
        .await;

    let source = RemoteSpreadsheetSource::new(DOC_URL, options(creds, &server));
    let report = load(&source).await.unwrap();

    assert_eq!(report.sheets.names(), vec!["January"]);
    assert_eq!(
        report.sheets.get("January").unwrap().records(),
        &[CleanedRecord::new("M1", "단순변심", 5.0)]
    );
    assert_eq!(report.skipped.len(), 2);
    assert!(matches!(report.skipped[0].reason, SkipReason::MissingColumns(_)));
    assert_eq!(report.skipped[1].reason, SkipReason::Empty);
    assert!(report.tab_errors.is_empty());
}

#[tokio::test]
async fn test_malformed_tab_does_not_block_others() {
    let server = MockServer::start().await;
    let dir = TempDir::new().unwrap();
    let creds = write_credentials(dir.path(), &server);

    mount_token(&server).await;
    mount_document(&server, &["Broken", "January"]).await;
    Mock::given(method("GET"))
        .and(path("/spreadsheets/doc123/values/'Broken'"))
        .respond_with(ResponseTemplate::new(400).set_body_string("Unable to parse range"))
        .mount(&server)
        .await;
    mount_values(&server, "January", returns_rows()).await;

    let source = RemoteSpreadsheetSource::new(DOC_URL, options(creds, &server));
    let report = load(&source).await.unwrap();

    assert_eq!(report.sheets.names(), vec!["January"]);
    assert_eq!(report.tab_errors.len(), 1);
    assert_eq!(report.tab_errors[0].sheet, "Broken");
    assert!(report.tab_errors[0].message.contains("400"));
}

#[tokio::test]
async fn test_auth_failure_is_fatal_then_recovers() {
    let server = MockServer::start().await;
    let dir = TempDir::new().unwrap();
    let missing = dir.path().join("credentials.json");

    mount_token(&server).await;
    mount_document(&server, &["January"]).await;
    mount_values(&server, "January", returns_rows()).await;

    // No key file yet: the whole load fails and no tabs are produced
    let source = RemoteSpreadsheetSource::new(DOC_URL, options(missing.clone(), &server));
    let err = load(&source).await.unwrap_err();
    assert!(matches!(err, LoadError::Auth(_)));

    // Same URL, working credentials: a fresh attempt fully recovers
    let creds = write_credentials(dir.path(), &server);
    assert_eq!(creds, missing);
    let report = load(&source).await.unwrap();
    assert_eq!(report.sheets.names(), vec!["January"]);
}

#[tokio::test]
async fn test_rejected_token_is_fatal() {
    let server = MockServer::start().await;
    let dir = TempDir::new().unwrap();
    let creds = write_credentials(dir.path(), &server);

    Mock::given(method("POST"))
        .and(path("/token"))
        .respond_with(ResponseTemplate::new(401).set_body_json(serde_json::json!({
            "error": "invalid_grant"
        })))
        .expect(1)
        .mount(&server)
        .await;

    let source = RemoteSpreadsheetSource::new(DOC_URL, options(creds, &server));
    let err = source.list_sheets().await.unwrap_err();
    assert!(matches!(err, LoadError::Auth(msg) if msg.contains("401")));
}

#[tokio::test]
async fn test_open_failure_is_fatal() {
    let server = MockServer::start().await;
    let dir = TempDir::new().unwrap();
    let creds = write_credentials(dir.path(), &server);

    mount_token(&server).await;
    Mock::given(method("GET"))
        .and(path("/spreadsheets/doc123"))
        .respond_with(ResponseTemplate::new(404))
        .mount(&server)
        .await;

    let source = RemoteSpreadsheetSource::new(DOC_URL, options(creds.clone(), &server));
    assert!(matches!(source.list_sheets().await, Err(LoadError::Open(_))));

    let bad_url = RemoteSpreadsheetSource::new("https://example.com/nothing", options(creds, &server));
    assert!(matches!(bad_url.list_sheets().await, Err(LoadError::Open(_))));
}

#[tokio::test]
async fn test_transient_error_is_retried_once() {
    let server = MockServer::start().await;
    let dir = TempDir::new().unwrap();
    let creds = write_credentials(dir.path(), &server);

    mount_token(&server).await;
    mount_document(&server, &["January"]).await;
    Mock::given(method("GET"))
        .and(path("/spreadsheets/doc123/values/'January'"))
        .respond_with(ResponseTemplate::new(503))
        .up_to_n_times(1)
        .expect(1)
        .mount(&server)
        .await;
    mount_values(&server, "January", returns_rows()).await;

    let source = RemoteSpreadsheetSource::new(DOC_URL, options(creds, &server));
    let report = load(&source).await.unwrap();
    assert_eq!(report.sheets.names(), vec!["January"]);
    assert!(report.tab_errors.is_empty());
}

#[tokio::test]
async fn test_persistent_error_gives_up_after_two_attempts() {
    let server = MockServer::start().await;
    let dir = TempDir::new().unwrap();
    let creds = write_credentials(dir.path(), &server);

    mount_token(&server).await;
    mount_document(&server, &["January"]).await;
    Mock::given(method("GET"))
        .and(path("/spreadsheets/doc123/values/'January'"))
        .respond_with(ResponseTemplate::new(503))
        .expect(2)
        .mount(&server)
        .await;

    let source = RemoteSpreadsheetSource::new(DOC_URL, options(creds, &server));
    let report = load(&source).await.unwrap();
    assert!(report.sheets.is_empty());
    assert_eq!(report.tab_errors.len(), 1);
    assert!(report.tab_errors[0].message.contains("503"));
}
