//! URL shortening
//!
//! Outgoing text gets every http(s) URL replaced by an opaque short link
//! under the configured base. Codes are minted from random bytes; the
//! store's unique constraint backstops the rare collision, which is
//! retried with a fresh code a bounded number of times.

use base64::engine::general_purpose::URL_SAFE_NO_PAD;
use base64::Engine;
use rand::RngCore;
use regex::Regex;
use tracing::warn;
use wagate_common::{Error, Result};

use super::CampaignService;

/// Length of a short code in characters
const SHORT_CODE_LEN: usize = 8;

/// Attempts before giving up on a colliding code
const SHORT_CODE_ATTEMPTS: usize = 5;

/// Generate an opaque short code from six random bytes
pub(crate) fn generate_short_code() -> String {
    let mut bytes = [0u8; 6];
    rand::thread_rng().fill_bytes(&mut bytes);
    let mut code = URL_SAFE_NO_PAD.encode(bytes);
    code.truncate(SHORT_CODE_LEN);
    code
}

impl CampaignService {
    /// Replace every URL in `text` with a minted short link.
    ///
    /// Returns the text unchanged when no base URL is configured. A URL
    /// whose code cannot be persisted is left as-is.
    pub async fn shorten_urls_in_text(&self, device_id: &str, text: &str) -> Result<String> {
        let base = self.config().short_url_base.trim_end_matches('/');
        if base.is_empty() {
            return Ok(text.to_string());
        }

        let re = Regex::new(r"https?://\S+").expect("url pattern is valid");
        let urls: Vec<String> = re.find_iter(text).map(|m| m.as_str().to_string()).collect();
        if urls.is_empty() {
            return Ok(text.to_string());
        }

        let mut result = text.to_string();
        for url in urls {
            let code = match self.mint_short_code(device_id, &url).await {
                Ok(code) => code,
                Err(e) => {
                    warn!(url = %url, error = %e, "Failed to create short URL");
                    continue;
                }
            };

            let short_link = format!("{}/s/{}", base, code);
            result = result.replacen(&url, &short_link, 1);
        }

        Ok(result)
    }

    /// Resolve a short code to its original URL, counting the click.
    ///
    /// The click increment is best effort; a failed increment does not
    /// block the redirect.
    pub async fn resolve_short_url(&self, code: &str) -> Result<String> {
        let short_url = self
            .store()
            .short_url_by_code(code)
            .await?
            .ok_or_else(|| Error::NotFound("short URL not found".to_string()))?;

        if let Err(e) = self.store().increment_short_url_clicks(code).await {
            warn!(code = %code, error = %e, "Failed to count short URL click");
        }

        Ok(short_url.original_url)
    }

    async fn mint_short_code(&self, device_id: &str, url: &str) -> Result<String> {
        for _ in 0..SHORT_CODE_ATTEMPTS {
            let code = generate_short_code();
            match self.store().create_short_url(device_id, &code, url).await {
                Ok(_) => return Ok(code),
                // Collision with an existing code: try a fresh one
                Err(Error::Conflict(_)) => continue,
                Err(e) => return Err(e),
            }
        }

        Err(Error::Internal(
            "could not allocate a unique short code".to_string(),
        ))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::campaign::test_support::{service_with, service_with_base, MemStore};
    use std::sync::Arc;

    #[test]
    fn test_short_code_shape() {
        let code = generate_short_code();
        assert_eq!(code.len(), SHORT_CODE_LEN);
        assert!(code
            .chars()
            .all(|c| c.is_ascii_alphanumeric() || c == '-' || c == '_'));
    }

    #[tokio::test]
    async fn test_shortening_disabled_without_base() {
        let (service, _) = service_with(Arc::new(MemStore::new()));

        let text = "See https://example.com/a";
        let out = service
            .shorten_urls_in_text("pantone", text)
            .await
            .unwrap();
        assert_eq!(out, text);
    }

    #[tokio::test]
    async fn test_duplicate_urls_get_distinct_codes() {
        let store = Arc::new(MemStore::new());
        let (service, _) = service_with_base(store.clone(), "https://x.io");

        let out = service
            .shorten_urls_in_text(
                "pantone",
                "See https://example.com/a and https://example.com/a",
            )
            .await
            .unwrap();

        assert!(!out.contains("https://example.com/a"));
        let codes: Vec<String> = out
            .split_whitespace()
            .filter_map(|w| w.strip_prefix("https://x.io/s/"))
            .map(|c| c.to_string())
            .collect();
        assert_eq!(codes.len(), 2);
        assert_ne!(codes[0], codes[1]);

        for code in &codes {
            let url = service.resolve_short_url(code).await.unwrap();
            assert_eq!(url, "https://example.com/a");
        }
    }

    #[tokio::test]
    async fn test_trailing_slash_base_normalized() {
        let store = Arc::new(MemStore::new());
        let (service, _) = service_with_base(store, "https://x.io/");

        let out = service
            .shorten_urls_in_text("pantone", "go to http://example.com")
            .await
            .unwrap();
        assert!(out.starts_with("go to https://x.io/s/"));
        assert!(!out.contains("//s/"));
    }

    #[tokio::test]
    async fn test_unknown_code_is_not_found() {
        let (service, _) = service_with(Arc::new(MemStore::new()));

        assert!(matches!(
            service.resolve_short_url("missing1").await,
            Err(Error::NotFound(_))
        ));
    }

    #[tokio::test]
    async fn test_clicks_increment_on_resolve() {
        let store = Arc::new(MemStore::new());
        let (service, _) = service_with_base(store.clone(), "https://x.io");

        let out = service
            .shorten_urls_in_text("pantone", "https://example.com/page")
            .await
            .unwrap();
        let code = out.strip_prefix("https://x.io/s/").unwrap().to_string();

        service.resolve_short_url(&code).await.unwrap();
        service.resolve_short_url(&code).await.unwrap();
        assert_eq!(store.short_url_clicks(&code), 2);
    }
}
