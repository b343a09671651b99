//! # Public Media URLs
//!
//! Shop logos, covers and product photos are stored either as absolute URLs
//! or as paths inside the public storage bucket.

use crate::client::BackendClient;

const PUBLIC_OBJECT_PATH: &str = "storage/v1/object/public/";

impl BackendClient {
    /// Resolves a stored media reference to a URL a browser can open.
    ///
    /// ```text
    /// "https://cdn.example/a.png"   → unchanged
    /// "/shops/s1/logo.png"          → <base>/storage/v1/object/public/velmo-media/shops/s1/logo.png
    /// "" or blank                   → None
    /// ```
    pub fn public_media_url(&self, path: &str) -> Option<String> {
        let path = path.trim();
        if path.is_empty() {
            return None;
        }

        if path.starts_with("http://") || path.starts_with("https://") {
            return Some(path.to_string());
        }

        let config = self.config();
        Some(format!(
            "{}{}{}/{}",
            config.base_url,
            PUBLIC_OBJECT_PATH,
            config.media_bucket.trim_matches('/'),
            path.trim_start_matches('/')
        ))
    }
}

#[cfg(test)]
mod tests {
    use crate::{BackendClient, BackendConfig};

    fn client() -> BackendClient {
        BackendClient::new(BackendConfig::new("https://abc.supabase.co", "anon-key").unwrap())
            .unwrap()
    }

    #[test]
    fn test_absolute_urls_pass_through() {
        assert_eq!(
            client().public_media_url("https://cdn.example/logo.png").as_deref(),
            Some("https://cdn.example/logo.png")
        );
    }

    #[test]
    fn test_bucket_paths_resolve() {
        let expected = "https://abc.supabase.co/storage/v1/object/public/velmo-media/shops/s1/logo.png";
        assert_eq!(
            client().public_media_url("/shops/s1/logo.png").as_deref(),
            Some(expected)
        );
        assert_eq!(
            client().public_media_url("shops/s1/logo.png").as_deref(),
            Some(expected)
        );
    }

    #[test]
    fn test_blank_path_is_none() {
        assert_eq!(client().public_media_url("   "), None);
    }
}
