use std::time::Duration;

use anyhow::{anyhow, Result};

pub const DEFAULT_API_BASE: &str = "https://api.botify.com/v1";
pub const DEFAULT_EXPORT_PATH: &str = "siteurlsExport.csv";
pub const DEFAULT_OUTPUT_PATH: &str = "segment.txt";

const TOKEN_VAR: &str = "SEGMENTIFY_API_TOKEN";
const BASE_VAR: &str = "SEGMENTIFY_API_BASE";

/// Connection and export limits for the analytics API.
#[derive(Debug, Clone)]
pub struct Settings {
    pub api_base: String,
    pub api_token: String,
    /// URLs per export page.
    pub page_size: usize,
    pub max_pages: usize,
    /// Export stops once more than this many URLs have been written.
    pub url_cap: usize,
    pub request_timeout: Duration,
    pub max_retries: u32,
    pub base_backoff: Duration,
}

impl Settings {
    pub fn new(api_base: impl Into<String>, api_token: impl Into<String>) -> Self {
        Self {
            api_base: api_base.into().trim_end_matches('/').to_string(),
            api_token: api_token.into(),
            page_size: 1000,
            max_pages: 300,
            url_cap: 190_000,
            request_timeout: Duration::from_secs(30),
            max_retries: 3,
            base_backoff: Duration::from_millis(2000),
        }
    }

    pub fn from_env() -> Result<Self> {
        let token = std::env::var(TOKEN_VAR)
            .map_err(|_| anyhow!("{} environment variable must be set", TOKEN_VAR))?;
        let base = std::env::var(BASE_VAR).unwrap_or_else(|_| DEFAULT_API_BASE.to_string());
        Ok(Self::new(base, token))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults() {
        let s = Settings::new("https://api.example.com/v1/", "abc");
        assert_eq!(s.api_base, "https://api.example.com/v1");
        assert_eq!(s.page_size, 1000);
        assert_eq!(s.max_pages, 300);
        assert_eq!(s.url_cap, 190_000);
        assert_eq!(s.request_timeout, Duration::from_secs(30));
    }
}
