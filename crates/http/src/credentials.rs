use crate::client::HttpClient;
use crate::error::{SheetsError, SheetsResult};
use chrono::{DateTime, Duration, Utc};
use jsonwebtoken::{Algorithm, EncodingKey, Header};
use serde::{Deserialize, Serialize};
use std::path::Path;

/// OAuth scopes requested for read access to shared spreadsheets.
pub const SHEETS_SCOPES: [&str; 2] = [
    "https://spreadsheets.google.com/feeds",
    "https://www.googleapis.com/auth/drive",
];

const JWT_BEARER_GRANT: &str = "urn:ietf:params:oauth:grant-type:jwt-bearer";
const ASSERTION_LIFETIME_SECS: i64 = 3600;

fn default_token_uri() -> String {
    "https://oauth2.googleapis.com/token".to_string()
}

/// The fields of a Google service-account key file that are needed to sign
/// token requests. Other fields in the file are ignored.
#[derive(Clone, Deserialize)]
pub struct ServiceAccountKey {
    pub client_email: String,
    pub private_key: String,
    #[serde(default)]
    pub private_key_id: Option<String>,
    #[serde(default = "default_token_uri")]
    pub token_uri: String,
}

impl std::fmt::Debug for ServiceAccountKey {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ServiceAccountKey")
            .field("client_email", &self.client_email)
            .field("private_key_id", &self.private_key_id)
            .field("token_uri", &self.token_uri)
            .finish_non_exhaustive()
    }
}

#[derive(Debug, Serialize)]
struct Claims<'a> {
    iss: &'a str,
    scope: String,
    aud: &'a str,
    iat: i64,
    exp: i64,
}

#[derive(Debug, Deserialize)]
struct TokenResponse {
    access_token: String,
    #[serde(default)]
    expires_in: Option<i64>,
}

/// A bearer token and when it stops being valid.
#[derive(Clone)]
pub struct AccessToken {
    pub token: String,
    pub expires_at: DateTime<Utc>,
}

impl std::fmt::Debug for AccessToken {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AccessToken")
            .field("expires_at", &self.expires_at)
            .finish_non_exhaustive()
    }
}

impl ServiceAccountKey {
    /// Read a key file.
    pub fn from_file(path: impl AsRef<Path>) -> SheetsResult<Self> {
        let path = path.as_ref();
        let raw = std::fs::read_to_string(path)
            .map_err(|e| SheetsError::Credentials(format!("{}: {e}", path.display())))?;
        Self::from_json(&raw)
    }

    /// Parse key file contents.
    pub fn from_json(raw: &str) -> SheetsResult<Self> {
        serde_json::from_str(raw).map_err(|e| SheetsError::Credentials(e.to_string()))
    }

    /// Build the signed RS256 assertion for the token request.
    pub fn assertion(&self, now: DateTime<Utc>) -> SheetsResult<String> {
        let claims = Claims {
            iss: &self.client_email,
            scope: SHEETS_SCOPES.join(" "),
            aud: &self.token_uri,
            iat: now.timestamp(),
            exp: now.timestamp() + ASSERTION_LIFETIME_SECS,
        };

        let mut header = Header::new(Algorithm::RS256);
        header.kid.clone_from(&self.private_key_id);

        let key = EncodingKey::from_rsa_pem(self.private_key.as_bytes())
            .map_err(|e| SheetsError::Credentials(format!("invalid private key: {e}")))?;

        jsonwebtoken::encode(&header, &claims, &key)
            .map_err(|e| SheetsError::Credentials(format!("could not sign assertion: {e}")))
    }

    /// Trade a fresh assertion for an access token at `token_uri`.
    pub async fn exchange(&self, http: &HttpClient) -> SheetsResult<AccessToken> {
        let now = Utc::now();
        let assertion = self.assertion(now)?;

        let response = http
            .send(|client| {
                client
                    .post(&self.token_uri)
                    .form(&[("grant_type", JWT_BEARER_GRANT), ("assertion", assertion.as_str())])
            })
            .await
            .map_err(|e| SheetsError::Token(e.to_string()))?;

        let body: TokenResponse = response
            .json()
            .await
            .map_err(|e| SheetsError::Token(format!("malformed token response: {e}")))?;

        Ok(AccessToken {
            token: body.access_token,
            expires_at: now + Duration::seconds(body.expires_in.unwrap_or(ASSERTION_LIFETIME_SECS)),
        })
    }
}
