use axum::extract::multipart::MultipartError;
use axum::extract::{DefaultBodyLimit, Multipart, Query, State};
use axum::http::StatusCode;
use axum::response::{Html, IntoResponse, Response};
use axum::routing::{get, post};
use axum::{Json, Router};
use returnboard_core::{load, LoadError, LoadReport, WorkbookSource};
use returnboard_http::{RemoteOptions, RemoteSpreadsheetSource};
use returnboard_viz::{
    escape_html, fatal_notice, notice, page, render_report, DashboardReport, NoticeLevel,
};
use serde::{Deserialize, Serialize};
use tower_http::limit::RequestBodyLimitLayer;
use tower_http::trace::TraceLayer;
use tracing::{error, warn};

/// Shared, read-only handler state.
#[derive(Debug, Clone)]
pub struct AppState {
    pub remote: RemoteOptions,
    /// Upload limit in bytes.
    pub body_limit: usize,
}

/// Health check response.
#[derive(Serialize, Deserialize)]
pub struct Health {
    /// Server status ("ok" when healthy).
    pub status: String,
    /// Server version from Cargo.toml.
    pub version: String,
}

/// Error body of the JSON API.
#[derive(Debug, Serialize, Deserialize)]
pub struct ApiError {
    pub error: String,
    pub message: String,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SourceKind {
    #[default]
    File,
    Remote,
}

#[derive(Debug, Deserialize)]
pub struct IndexQuery {
    #[serde(default)]
    source: SourceKind,
}

#[derive(Debug, Deserialize)]
pub struct RemoteQuery {
    #[serde(default)]
    url: String,
}

/// Health check endpoint handler.
pub async fn health() -> Json<Health> {
    Json(Health {
        status: "ok".to_string(),
        version: env!("CARGO_PKG_VERSION").to_string(),
    })
}

fn source_nav(active: SourceKind) -> String {
    let class = |kind: SourceKind| if kind == active { " class=\"active\"" } else { "" };
    format!(
        "<nav class=\"sources\"><strong>데이터 소스 선택</strong> \
         <a href=\"/?source=file\"{}>엑셀 파일 업로드</a> \
         <a href=\"/?source=remote\"{}>구글 스프레드시트</a></nav>\n",
        class(SourceKind::File),
        class(SourceKind::Remote)
    )
}

fn source_form(kind: SourceKind, url: &str) -> String {
    match kind {
        SourceKind::File => "<form method=\"post\" action=\"/upload\" enctype=\"multipart/form-data\">\
             <label>엑셀 파일을 업로드하세요 \
             <input type=\"file\" name=\"file\" accept=\".xlsx,.xlsm,.xls,.ods\" required></label>\
             <button type=\"submit\">업로드</button></form>\n"
            .to_string(),
        SourceKind::Remote => format!(
            "<form method=\"get\" action=\"/remote\">\
             <label>구글 스프레드시트 URL을 입력하세요 \
             <input type=\"url\" name=\"url\" size=\"60\" value=\"{}\" required></label>\
             <button type=\"submit\">불러오기</button></form>\n\
             <p class=\"help\">공유 설정이 되어 있는 구글 스프레드시트의 URL을 입력하세요.</p>\n",
            escape_html(url)
        ),
    }
}

fn dashboard(kind: SourceKind, url: &str, body: &str) -> Html<String> {
    Html(page(&format!("{}{}{body}", source_nav(kind), source_form(kind, url))))
}

/// Dashboard body for a load outcome: one fatal notice, or the report.
fn render_outcome(outcome: Result<LoadReport, LoadError>) -> String {
    match outcome {
        Ok(report) => render_report(&report).unwrap_or_else(|err| {
            error!(error = %err, "could not render dashboard");
            notice(NoticeLevel::Error, &err.to_string())
        }),
        Err(err) => fatal_notice(&err),
    }
}

/// The `file` field of a multipart upload, or `None` if no file was chosen.
async fn read_upload(mut multipart: Multipart) -> Result<Option<(String, Vec<u8>)>, MultipartError> {
    while let Some(field) = multipart.next_field().await? {
        if field.name() != Some("file") {
            continue;
        }
        let name = field.file_name().unwrap_or("upload").to_string();
        let bytes = field.bytes().await?;
        // Browsers send an empty part when the picker was left blank
        if bytes.is_empty() {
            return Ok(None);
        }
        return Ok(Some((name, bytes.to_vec())));
    }
    Ok(None)
}

async fn index(Query(query): Query<IndexQuery>) -> Html<String> {
    dashboard(query.source, "", "")
}

async fn upload_page(multipart: Multipart) -> Html<String> {
    let body = match read_upload(multipart).await {
        Ok(Some((name, bytes))) => render_outcome(load(&WorkbookSource::from_bytes(name, bytes)).await),
        Ok(None) => notice(NoticeLevel::Warning, "업로드된 파일이 없습니다."),
        Err(err) => {
            warn!(error = %err, "could not read upload");
            notice(
                NoticeLevel::Error,
                &format!("업로드를 읽는 중 오류가 발생했습니다: {err}"),
            )
        }
    };
    dashboard(SourceKind::File, "", &body)
}

async fn remote_page(State(state): State<AppState>, Query(query): Query<RemoteQuery>) -> Html<String> {
    let url = query.url.trim();
    if url.is_empty() {
        return dashboard(SourceKind::Remote, "", "");
    }
    let source = RemoteSpreadsheetSource::new(url, state.remote.clone());
    dashboard(SourceKind::Remote, url, &render_outcome(load(&source).await))
}

fn api_error(status: StatusCode, error: &str, message: impl Into<String>) -> Response {
    let body = ApiError {
        error: error.to_string(),
        message: message.into(),
    };
    (status, Json(body)).into_response()
}

fn api_outcome(outcome: Result<LoadReport, LoadError>) -> Response {
    match outcome {
        Ok(report) => Json(DashboardReport::from_load(&report)).into_response(),
        Err(err) => api_error(StatusCode::UNPROCESSABLE_ENTITY, err.kind(), err.to_string()),
    }
}

async fn api_upload(multipart: Multipart) -> Response {
    match read_upload(multipart).await {
        Ok(Some((name, bytes))) => api_outcome(load(&WorkbookSource::from_bytes(name, bytes)).await),
        Ok(None) => api_error(
            StatusCode::BAD_REQUEST,
            "missing_file",
            "multipart field `file` is required",
        ),
        Err(err) => api_error(StatusCode::BAD_REQUEST, "multipart", err.to_string()),
    }
}

async fn api_remote(State(state): State<AppState>, Query(query): Query<RemoteQuery>) -> Response {
    let url = query.url.trim();
    if url.is_empty() {
        return api_error(StatusCode::BAD_REQUEST, "missing_url", "query parameter `url` is required");
    }
    let source = RemoteSpreadsheetSource::new(url, state.remote.clone());
    api_outcome(load(&source).await)
}

/// Create the application router.
///
/// This is separated from `main()` to allow testing.
pub fn create_router(state: AppState) -> Router {
    let body_limit = state.body_limit;
    Router::new()
        .route("/", get(index))
        .route("/upload", post(upload_page))
        .route("/remote", get(remote_page))
        .route("/api/upload", post(api_upload))
        .route("/api/remote", get(api_remote))
        .route("/health", get(health))
        .layer(DefaultBodyLimit::disable())
        .layer(RequestBodyLimitLayer::new(body_limit))
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}
