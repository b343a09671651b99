//! # Backend Configuration
//!
//! Connection settings for the hosted backend.
//!
//! Built by the CLI from its layered `AppConfig`; this crate never reads
//! files or environment variables itself.

use std::time::Duration;

use url::Url;

use crate::error::{BackendError, BackendResult};

/// Default request timeout.
pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(15);

/// Storage bucket holding shop logos, covers and product photos.
pub const DEFAULT_MEDIA_BUCKET: &str = "velmo-media";

/// Settings for [`BackendClient`](crate::BackendClient).
///
/// ## Example
/// ```rust,ignore
/// let config = BackendConfig::new("https://xyz.supabase.co", anon_key)?
///     .timeout(Duration::from_secs(5));
/// ```
#[derive(Clone)]
pub struct BackendConfig {
    /// Project base URL, always ending in `/` so relative joins append.
    pub base_url: Url,

    /// Public (anonymous) API key. Sent as `apikey` and as bearer token.
    pub anon_key: String,

    /// Per-request timeout.
    /// Default: 15 seconds
    pub timeout: Duration,

    /// Public storage bucket for media paths.
    /// Default: "velmo-media"
    pub media_bucket: String,
}

impl BackendConfig {
    /// Creates a configuration for the given project URL and anon key.
    ///
    /// ## Errors
    /// - [`BackendError::InvalidUrl`] if the URL is not absolute http(s)
    /// - [`BackendError::InvalidConfig`] if the key is blank
    pub fn new(base_url: &str, anon_key: impl Into<String>) -> BackendResult<Self> {
        let anon_key = anon_key.into();
        if anon_key.trim().is_empty() {
            return Err(BackendError::InvalidConfig(
                "anon key must not be empty".to_string(),
            ));
        }

        Ok(BackendConfig {
            base_url: normalize_base_url(base_url)?,
            anon_key,
            timeout: DEFAULT_TIMEOUT,
            media_bucket: DEFAULT_MEDIA_BUCKET.to_string(),
        })
    }

    /// Sets the request timeout.
    pub fn timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    /// Sets the public media bucket.
    pub fn media_bucket(mut self, bucket: impl Into<String>) -> Self {
        self.media_bucket = bucket.into();
        self
    }
}

// The key is public, but there is no reason to print it in logs.
impl std::fmt::Debug for BackendConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("BackendConfig")
            .field("base_url", &self.base_url.as_str())
            .field("timeout", &self.timeout)
            .field("media_bucket", &self.media_bucket)
            .finish_non_exhaustive()
    }
}

/// Parses the project URL and makes sure the path ends with `/`.
fn normalize_base_url(raw: &str) -> BackendResult<Url> {
    let mut url =
        Url::parse(raw.trim()).map_err(|e| BackendError::InvalidUrl(format!("{raw}: {e}")))?;

    if !matches!(url.scheme(), "http" | "https") {
        return Err(BackendError::InvalidUrl(format!(
            "{raw}: scheme must be http or https"
        )));
    }

    if !url.path().ends_with('/') {
        let path = format!("{}/", url.path());
        url.set_path(&path);
    }
    url.set_query(None);
    url.set_fragment(None);

    Ok(url)
}
