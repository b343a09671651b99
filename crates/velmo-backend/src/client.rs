//! # Backend Client
//!
//! Shared HTTP plumbing for the REST API: auth headers, URL building,
//! status mapping and JSON decoding.
//!
//! ## Request Flow
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                                                                         │
//! │  catalog.rs / orders.rs / events.rs                                     │
//! │       │                                                                 │
//! │       ▼                                                                 │
//! │  endpoint("shops", [("slug", "ilike.boutique-fanta"), ...])             │
//! │       │     → https://<project>/rest/v1/shops?slug=ilike.boutique-fanta │
//! │       ▼                                                                 │
//! │  reqwest (apikey + Authorization: Bearer <anon key>)                    │
//! │       │                                                                 │
//! │       ▼                                                                 │
//! │  body as text ──► check_status() ──► decode()                           │
//! │                    429 → RateLimited(Retry-After)                       │
//! │                    406 → NotFound  (single-object request, no row)      │
//! │                    404 → NotFound                                       │
//! │                    other non-2xx → Status { status, body }              │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```

use std::sync::Arc;

use reqwest::header::{HeaderMap, HeaderValue, ACCEPT, AUTHORIZATION, RETRY_AFTER};
use reqwest::StatusCode;
use serde::de::DeserializeOwned;
use serde::Serialize;
use tracing::{debug, error};
use url::Url;

use crate::config::BackendConfig;
use crate::error::{BackendError, BackendResult};

/// Path of the auto-generated REST API under the project URL.
const REST_PATH: &str = "rest/v1/";

/// Accept header asking for a single JSON object instead of an array.
const OBJECT_ACCEPT: &str = "application/vnd.pgrst.object+json";

/// Longest response body excerpt written to logs.
const MAX_LOGGED_BODY: usize = 500;

/// Retry delay used when a 429 carries no usable `Retry-After`.
const DEFAULT_RETRY_AFTER_SECS: u64 = 1;

/// Client for the hosted backend.
///
/// Cheap to clone: all clones share one connection pool.
#[derive(Clone)]
pub struct BackendClient {
    inner: Arc<BackendClientInner>,
}

struct BackendClientInner {
    http: reqwest::Client,
    config: BackendConfig,
}

impl BackendClient {
    /// Creates a client with the auth headers set on every request.
    ///
    /// ## Errors
    /// - [`BackendError::InvalidConfig`] if the key is not a valid header value
    /// - [`BackendError::Http`] if the HTTP client cannot be built
    pub fn new(config: BackendConfig) -> BackendResult<Self> {
        let mut headers = HeaderMap::new();

        let apikey = HeaderValue::from_str(&config.anon_key)
            .map_err(|e| BackendError::InvalidConfig(format!("Invalid anon key: {e}")))?;
        let bearer = HeaderValue::from_str(&format!("Bearer {}", config.anon_key))
            .map_err(|e| BackendError::InvalidConfig(format!("Invalid anon key: {e}")))?;

        headers.insert("apikey", apikey);
        headers.insert(AUTHORIZATION, bearer);
        headers.insert(ACCEPT, HeaderValue::from_static("application/json"));

        let http = reqwest::Client::builder()
            .default_headers(headers)
            .timeout(config.timeout)
            .build()?;

        debug!(base_url = %config.base_url, "Backend client created");

        Ok(BackendClient {
            inner: Arc::new(BackendClientInner { http, config }),
        })
    }

    /// Settings this client was built from.
    pub fn config(&self) -> &BackendConfig {
        &self.inner.config
    }

    // =========================================================================
    // URL Building
    // =========================================================================

    /// REST URL for `table` with the given query pairs, percent-encoded.
    pub(crate) fn endpoint(&self, table: &str, query: &[(&str, &str)]) -> BackendResult<Url> {
        let mut url = self
            .inner
            .config
            .base_url
            .join(REST_PATH)
            .and_then(|rest| rest.join(table))
            .map_err(|e| BackendError::InvalidUrl(format!("{table}: {e}")))?;

        if !query.is_empty() {
            url.query_pairs_mut().extend_pairs(query.iter().copied());
        }

        Ok(url)
    }

    // =========================================================================
    // Requests
    // =========================================================================

    /// GET returning every matching row.
    pub(crate) async fn get_rows<T: DeserializeOwned>(
        &self,
        table: &str,
        query: &[(&str, &str)],
    ) -> BackendResult<Vec<T>> {
        let url = self.endpoint(table, query)?;
        debug!(table = %table, "GET rows");

        let response = self.inner.http.get(url).send().await?;
        let body = read_body(response, table).await?;
        decode(&body)
    }

    /// GET expecting exactly one row. No row gives [`BackendError::NotFound`].
    pub(crate) async fn get_object<T: DeserializeOwned>(
        &self,
        table: &str,
        query: &[(&str, &str)],
    ) -> BackendResult<T> {
        let url = self.endpoint(table, query)?;
        debug!(table = %table, "GET object");

        let response = self
            .inner
            .http
            .get(url)
            .header(ACCEPT, OBJECT_ACCEPT)
            .send()
            .await?;
        let body = read_body(response, table).await?;
        decode(&body)
    }

    /// POST one row and read back the columns named in `select`.
    pub(crate) async fn insert_returning<B, T>(
        &self,
        table: &str,
        select: &str,
        row: &B,
    ) -> BackendResult<T>
    where
        B: Serialize + ?Sized,
        T: DeserializeOwned,
    {
        let url = self.endpoint(table, &[("select", select)])?;
        debug!(table = %table, "POST returning");

        let response = self
            .inner
            .http
            .post(url)
            .header(ACCEPT, OBJECT_ACCEPT)
            .header("Prefer", "return=representation")
            .json(row)
            .send()
            .await?;
        let body = read_body(response, table).await?;
        decode(&body)
    }

    /// POST one row, reading nothing back.
    pub(crate) async fn insert<B>(&self, table: &str, row: &B) -> BackendResult<()>
    where
        B: Serialize + ?Sized,
    {
        let url = self.endpoint(table, &[])?;
        debug!(table = %table, "POST");

        let response = self
            .inner
            .http
            .post(url)
            .header("Prefer", "return=minimal")
            .json(row)
            .send()
            .await?;
        read_body(response, table).await?;
        Ok(())
    }
}

impl std::fmt::Debug for BackendClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("BackendClient")
            .field("config", &self.inner.config)
            .finish_non_exhaustive()
    }
}

// =============================================================================
// Response Handling
// =============================================================================

/// Reads the body as text, then maps the status.
async fn read_body(response: reqwest::Response, what: &str) -> BackendResult<String> {
    let status = response.status();
    let retry_after = response
        .headers()
        .get(RETRY_AFTER)
        .and_then(|v| v.to_str().ok())
        .map(str::to_string);

    let body = response.text().await?;
    check_status(status, retry_after.as_deref(), &body, what)?;
    Ok(body)
}

/// Maps a response status to the matching error, if any.
pub(crate) fn check_status(
    status: StatusCode,
    retry_after: Option<&str>,
    body: &str,
    what: &str,
) -> BackendResult<()> {
    if status.is_success() {
        return Ok(());
    }

    match status {
        StatusCode::TOO_MANY_REQUESTS => {
            let secs = retry_after
                .and_then(|s| s.trim().parse().ok())
                .unwrap_or(DEFAULT_RETRY_AFTER_SECS);
            Err(BackendError::RateLimited(secs))
        }
        // 406: a single object was requested and zero (or several) rows matched
        StatusCode::NOT_ACCEPTABLE | StatusCode::NOT_FOUND => {
            debug!(what = %what, status = status.as_u16(), "No matching row");
            Err(BackendError::NotFound(what.to_string()))
        }
        _ => {
            error!(
                what = %what,
                status = status.as_u16(),
                body = %excerpt(body),
                "Backend request failed"
            );
            Err(BackendError::Status {
                status: status.as_u16(),
                body: body.to_string(),
            })
        }
    }
}

/// Decodes a JSON body, logging an excerpt when it does not match.
pub(crate) fn decode<T: DeserializeOwned>(body: &str) -> BackendResult<T> {
    serde_json::from_str(body).map_err(|e| {
        error!(
            error = %e,
            body = %excerpt(body),
            "Failed to decode backend response"
        );
        BackendError::Parse(e)
    })
}

/// At most [`MAX_LOGGED_BODY`] characters of a body.
fn excerpt(body: &str) -> &str {
    match body.char_indices().nth(MAX_LOGGED_BODY) {
        Some((idx, _)) => &body[..idx],
        None => body,
    }
}
