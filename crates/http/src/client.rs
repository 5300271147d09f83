use crate::error::{SheetsError, SheetsResult};
use reqwest::{Client, RequestBuilder, Response, StatusCode};
use std::path::PathBuf;
use std::time::Duration;
use tracing::warn;

/// Settings for the remote spreadsheet source.
#[derive(Debug, Clone)]
pub struct RemoteOptions {
    /// Service-account key file.
    pub credentials_path: PathBuf,
    /// Base URL of the Sheets v4 REST API, without trailing slash.
    pub api_base: String,
    /// Per-request timeout.
    pub timeout_secs: u64,
    /// Pause before the single retry of a transient failure.
    pub retry_delay_ms: u64,
}

impl Default for RemoteOptions {
    fn default() -> Self {
        Self {
            credentials_path: PathBuf::from("credentials.json"),
            api_base: "https://sheets.googleapis.com/v4".to_string(),
            timeout_secs: 30,
            retry_delay_ms: 500,
        }
    }
}

/// HTTP client with a bounded timeout and one retry on transient failures.
#[derive(Debug, Clone)]
pub struct HttpClient {
    client: Client,
    retry_delay: Duration,
}

/// Connect errors, timeouts, 429 and 5xx are worth one more attempt.
fn is_transient(result: &Result<Response, reqwest::Error>) -> bool {
    match result {
        Ok(response) => {
            let status = response.status();
            status == StatusCode::TOO_MANY_REQUESTS || status.is_server_error()
        }
        Err(err) => err.is_timeout() || err.is_connect(),
    }
}

impl HttpClient {
    /// Constructs a client from the remote options.
    ///
    /// System proxy lookup is disabled.
    ///
    /// # Errors
    ///
    /// Returns `SheetsError::Http` if building the underlying client fails.
    pub fn new(options: &RemoteOptions) -> SheetsResult<Self> {
        let client = Client::builder()
            .timeout(Duration::from_secs(options.timeout_secs))
            .no_proxy()
            .build()
            .map_err(|e| SheetsError::Http(e.to_string()))?;

        Ok(Self {
            client,
            retry_delay: Duration::from_millis(options.retry_delay_ms),
        })
    }

    /// Send a request, retrying once if the first attempt failed transiently.
    ///
    /// `build` is called once per attempt. A non-success status after the
    /// final attempt is returned as `SheetsError::Http`.
    pub async fn send<F>(&self, build: F) -> SheetsResult<Response>
    where
        F: Fn(&Client) -> RequestBuilder,
    {
        let mut result = build(&self.client).send().await;

        if is_transient(&result) {
            match &result {
                Ok(response) => warn!(status = %response.status(), "transient HTTP status, retrying once"),
                Err(err) => warn!(error = %err, "transient HTTP failure, retrying once"),
            }
            tokio::time::sleep(self.retry_delay).await;
            result = build(&self.client).send().await;
        }

        let response = result.map_err(|e| SheetsError::Http(e.to_string()))?;
        if !response.status().is_success() {
            let status = response.status();
            let body = response.text().await.unwrap_or_default();
            return Err(SheetsError::Http(format!(
                "HTTP {} - {}{}",
                status.as_u16(),
                status.canonical_reason().unwrap_or("Unknown"),
                if body.is_empty() {
                    String::new()
                } else {
                    format!(": {}", body.chars().take(200).collect::<String>())
                }
            )));
        }

        Ok(response)
    }
}
