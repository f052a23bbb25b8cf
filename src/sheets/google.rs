//! Google Sheets v4 store authenticated with a service account.
//!
//! Auth is the OAuth2 JWT-bearer flow: sign an RS256 assertion with the
//! service account key, exchange it for an access token, and reuse that
//! token until shortly before it expires.

use std::time::Duration;

use async_trait::async_trait;
use chrono::{DateTime, TimeDelta, Utc};
use jsonwebtoken::{Algorithm, EncodingKey, Header};
use serde::{Deserialize, Serialize};
use tokio::sync::Mutex;
use tracing::{debug, warn};
use url::Url;

use super::SheetStore;
use crate::publisher::{check_delivery_response, DeliveryError};

const SHEETS_API_BASE: &str = "https://sheets.googleapis.com/v4/spreadsheets";
const SHEETS_SCOPE: &str = "https://www.googleapis.com/auth/spreadsheets";
const DEFAULT_TOKEN_URI: &str = "https://oauth2.googleapis.com/token";
const JWT_BEARER_GRANT: &str = "urn:ietf:params:oauth:grant-type:jwt-bearer";
const ASSERTION_LIFETIME_SECS: i64 = 3600;
/// Refresh this many seconds before the reported expiry.
const TOKEN_EXPIRY_MARGIN_SECS: i64 = 60;

/// Bound on connecting to the token endpoint or Sheets API.
pub const SHEETS_CONNECT_TIMEOUT: Duration = Duration::from_secs(10);
/// Bound on one whole token exchange or Sheets request.
pub const SHEETS_REQUEST_TIMEOUT: Duration = Duration::from_secs(20);

fn http_client(request_timeout: Duration) -> reqwest::Client {
    reqwest::Client::builder()
        .connect_timeout(SHEETS_CONNECT_TIMEOUT.min(request_timeout))
        .timeout(request_timeout)
        .build()
        .unwrap_or_else(|e| {
            warn!(error = %e, "failed to build sheets HTTP client with timeouts, using default");
            reqwest::Client::default()
        })
}

/// Fields used from a service-account key file.
#[derive(Clone, Deserialize)]
pub struct ServiceAccountKey {
    /// Service account e-mail (JWT issuer).
    pub client_email: String,
    /// PEM-encoded RSA private key.
    pub private_key: String,
    /// OAuth2 token endpoint.
    #[serde(default = "default_token_uri")]
    pub token_uri: String,
}

fn default_token_uri() -> String {
    DEFAULT_TOKEN_URI.to_owned()
}

impl std::fmt::Debug for ServiceAccountKey {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ServiceAccountKey")
            .field("client_email", &self.client_email)
            .field("private_key", &"[REDACTED]")
            .field("token_uri", &self.token_uri)
            .finish()
    }
}

impl ServiceAccountKey {
    /// Parse the key from its JSON document.
    ///
    /// # Errors
    ///
    /// Returns [`DeliveryError::Auth`] if the JSON lacks required fields.
    pub fn from_json(text: &str) -> Result<Self, DeliveryError> {
        serde_json::from_str(text)
            .map_err(|e| DeliveryError::Auth(format!("invalid service account JSON: {e}")))
    }
}

/// JWT claim set for the token exchange.
#[doc(hidden)]
#[derive(Debug, Serialize, PartialEq, Eq)]
pub struct AssertionClaims {
    /// Issuer (service account e-mail).
    pub iss: String,
    /// Requested scope.
    pub scope: String,
    /// Audience (token endpoint).
    pub aud: String,
    /// Issued-at, seconds since epoch.
    pub iat: i64,
    /// Expiry, seconds since epoch.
    pub exp: i64,
}

/// Claims for an assertion issued at `now`.
#[doc(hidden)]
pub fn assertion_claims(key: &ServiceAccountKey, now: DateTime<Utc>) -> AssertionClaims {
    let iat = now.timestamp();
    AssertionClaims {
        iss: key.client_email.clone(),
        scope: SHEETS_SCOPE.to_owned(),
        aud: key.token_uri.clone(),
        iat,
        exp: iat.saturating_add(ASSERTION_LIFETIME_SECS),
    }
}

#[derive(Debug, Deserialize)]
struct TokenResponse {
    access_token: String,
    #[serde(default)]
    expires_in: Option<i64>,
}

#[derive(Debug, Clone)]
struct CachedToken {
    token: String,
    expires_at: DateTime<Utc>,
}

/// `values` payload returned by `values.get`.
#[derive(Debug, Deserialize)]
struct ValueRange {
    #[serde(default)]
    values: Vec<Vec<String>>,
}

#[derive(Debug, Serialize)]
struct AppendBody<'a> {
    values: [&'a [String]; 1],
}

/// A1 range on `tab`, quoting the tab name.
#[doc(hidden)]
pub fn a1_range(tab: &str, cells: Option<&str>) -> String {
    let quoted = format!("'{}'", tab.replace('\'', "''"));
    match cells {
        Some(cells) => format!("{quoted}!{cells}"),
        None => quoted,
    }
}

/// Rows from a `values.get` response body; missing `values` means no rows.
///
/// # Errors
///
/// Returns [`DeliveryError::Malformed`] if the body is not a value range.
#[doc(hidden)]
pub fn parse_value_range(body: &str) -> Result<Vec<Vec<String>>, DeliveryError> {
    let range: ValueRange =
        serde_json::from_str(body).map_err(|e| DeliveryError::Malformed(e.to_string()))?;
    Ok(range.values)
}

/// Sheets-backed [`SheetStore`] for one tab.
pub struct GoogleSheetsStore {
    sheet_id: String,
    tab: String,
    key: ServiceAccountKey,
    api_base: String,
    client: reqwest::Client,
    token: Mutex<Option<CachedToken>>,
}

impl std::fmt::Debug for GoogleSheetsStore {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("GoogleSheetsStore")
            .field("sheet_id", &self.sheet_id)
            .field("tab", &self.tab)
            .field("key", &self.key)
            .finish()
    }
}

impl GoogleSheetsStore {
    /// Store for `tab` of spreadsheet `sheet_id`.
    pub fn new(sheet_id: String, tab: String, key: ServiceAccountKey) -> Self {
        Self {
            sheet_id,
            tab,
            key,
            api_base: SHEETS_API_BASE.to_owned(),
            client: http_client(SHEETS_REQUEST_TIMEOUT),
            token: Mutex::new(None),
        }
    }

    /// Replace the per-request timeout (default [`SHEETS_REQUEST_TIMEOUT`]).
    #[must_use]
    pub fn with_request_timeout(mut self, timeout: Duration) -> Self {
        self.client = http_client(timeout);
        self
    }

    /// URL for `values/{range}{suffix}` on this spreadsheet.
    ///
    /// # Errors
    ///
    /// Returns [`DeliveryError::Malformed`] if the base URL is invalid.
    #[doc(hidden)]
    pub fn values_url(&self, range: &str, suffix: &str) -> Result<Url, DeliveryError> {
        let mut url = Url::parse(&self.api_base)
            .map_err(|e| DeliveryError::Malformed(format!("bad sheets base url: {e}")))?;
        url.path_segments_mut()
            .map_err(|()| DeliveryError::Malformed("sheets base url cannot be a base".to_owned()))?
            .push(&self.sheet_id)
            .push("values")
            .push(&format!("{range}{suffix}"));
        Ok(url)
    }

    async fn access_token(&self) -> Result<String, DeliveryError> {
        let mut cached = self.token.lock().await;
        let now = Utc::now();
        if let Some(token) = cached.as_ref() {
            if token.expires_at > now {
                return Ok(token.token.clone());
            }
        }

        let claims = assertion_claims(&self.key, now);
        let signing_key = EncodingKey::from_rsa_pem(self.key.private_key.as_bytes())
            .map_err(|e| DeliveryError::Auth(format!("invalid service account key: {e}")))?;
        let assertion = jsonwebtoken::encode(&Header::new(Algorithm::RS256), &claims, &signing_key)
            .map_err(|e| DeliveryError::Auth(format!("failed to sign assertion: {e}")))?;

        let response = self
            .client
            .post(&self.key.token_uri)
            .form(&[("grant_type", JWT_BEARER_GRANT), ("assertion", assertion.as_str())])
            .send()
            .await?;
        let body = check_delivery_response(response).await?;
        let token: TokenResponse = serde_json::from_str(&body)
            .map_err(|e| DeliveryError::Auth(format!("unexpected token response: {e}")))?;

        let lifetime = TimeDelta::seconds(token.expires_in.unwrap_or(ASSERTION_LIFETIME_SECS));
        let expires_at = now
            .checked_add_signed(lifetime)
            .and_then(|t| t.checked_sub_signed(TimeDelta::seconds(TOKEN_EXPIRY_MARGIN_SECS)))
            .unwrap_or(now);
        debug!(client_email = %self.key.client_email, "sheets access token refreshed");

        *cached = Some(CachedToken {
            token: token.access_token.clone(),
            expires_at,
        });
        Ok(token.access_token)
    }

    async fn get_values(&self, range: &str) -> Result<Vec<Vec<String>>, DeliveryError> {
        let token = self.access_token().await?;
        let url = self.values_url(range, "")?;
        let response = self.client.get(url).bearer_auth(token).send().await?;
        let body = check_delivery_response(response).await?;
        parse_value_range(&body)
    }
}

#[async_trait]
impl SheetStore for GoogleSheetsStore {
    async fn header_row(&self) -> Result<Vec<String>, DeliveryError> {
        let rows = self.get_values(&a1_range(&self.tab, Some("1:1"))).await?;
        Ok(rows.into_iter().next().unwrap_or_default())
    }

    async fn append_row(&self, values: &[String]) -> Result<(), DeliveryError> {
        let token = self.access_token().await?;
        let mut url = self.values_url(&a1_range(&self.tab, Some("A1")), ":append")?;
        url.query_pairs_mut()
            .append_pair("valueInputOption", "RAW")
            .append_pair("insertDataOption", "INSERT_ROWS");
        let response = self
            .client
            .post(url)
            .bearer_auth(token)
            .json(&AppendBody { values: [values] })
            .send()
            .await?;
        check_delivery_response(response).await?;
        Ok(())
    }

    async fn data_rows(&self) -> Result<Vec<Vec<String>>, DeliveryError> {
        let rows = self.get_values(&a1_range(&self.tab, None)).await?;
        Ok(rows.into_iter().skip(1).collect())
    }
}
