use clap::Parser;
use returnboard_http::RemoteOptions;
use std::net::SocketAddr;
use std::path::PathBuf;

/// Server settings, from flags or `RETURNBOARD_*` environment variables.
#[derive(Debug, Clone, Parser)]
#[command(name = "returnboard-server")]
#[command(author, version, about = "Product exchange/refund dashboard", long_about = None)]
pub struct ServerConfig {
    /// Address to listen on
    #[arg(long, env = "RETURNBOARD_ADDR", default_value = "0.0.0.0:3000")]
    pub addr: SocketAddr,

    /// Service-account key file for remote spreadsheets
    #[arg(long, env = "RETURNBOARD_CREDENTIALS", default_value = "credentials.json")]
    pub credentials: PathBuf,

    /// Base URL of the Sheets API
    #[arg(
        long = "sheets-api",
        env = "RETURNBOARD_SHEETS_API",
        default_value = "https://sheets.googleapis.com/v4"
    )]
    pub sheets_api: String,

    /// Timeout for each remote request, in seconds
    #[arg(long, env = "RETURNBOARD_TIMEOUT_SECS", default_value_t = 30)]
    pub timeout_secs: u64,

    /// Largest accepted upload, in megabytes
    #[arg(long, env = "RETURNBOARD_MAX_UPLOAD_MB", default_value_t = 20)]
    pub max_upload_mb: usize,
}

impl ServerConfig {
    #[must_use]
    pub fn remote_options(&self) -> RemoteOptions {
        RemoteOptions {
            credentials_path: self.credentials.clone(),
            api_base: self.sheets_api.clone(),
            timeout_secs: self.timeout_secs,
            ..RemoteOptions::default()
        }
    }

    /// Upload limit in bytes.
    #[must_use]
    pub fn body_limit(&self) -> usize {
        self.max_upload_mb.saturating_mul(1024 * 1024)
    }
}
