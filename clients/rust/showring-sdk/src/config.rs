//! Client configuration

use std::time::Duration;

use reqwest::Url;

use crate::error::{Result, SdkError};

pub const DEFAULT_BASE_URL: &str = "https://localhost:7157/";

/// Tokens are refreshed once they are this close to expiring.
pub const DEFAULT_TOKEN_EXPIRATION_BUFFER_MINUTES: i64 = 30;

#[derive(Debug, Clone)]
pub struct ClientConfig {
    pub base_url: String,
    pub login_path: String,
    pub refresh_path: String,
    pub token_expiration_buffer: chrono::Duration,
    pub request_timeout: Duration,
    pub connect_timeout: Duration,
    /// Accept self-signed certificates, for local development servers only
    pub accept_invalid_certs: bool,
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self {
            base_url: DEFAULT_BASE_URL.to_string(),
            login_path: "identity/login".to_string(),
            refresh_path: "identity/refresh".to_string(),
            token_expiration_buffer: chrono::Duration::minutes(DEFAULT_TOKEN_EXPIRATION_BUFFER_MINUTES),
            request_timeout: Duration::from_secs(30),
            connect_timeout: Duration::from_secs(10),
            accept_invalid_certs: false,
        }
    }
}

impl ClientConfig {
    pub fn with_base_url(base_url: impl Into<String>) -> Self {
        Self {
            base_url: base_url.into(),
            ..Self::default()
        }
    }

    pub fn base(&self) -> Result<Url> {
        // Url::join drops the last segment unless the base ends with a slash
        let mut base = self.base_url.clone();
        if !base.ends_with('/') {
            base.push('/');
        }
        Url::parse(&base).map_err(|e| SdkError::InvalidUrl(format!("{}: {}", self.base_url, e)))
    }

    /// Resolve `path` against the base URL.
    pub fn url(&self, path: &str) -> Result<Url> {
        self.base()?
            .join(path.trim_start_matches('/'))
            .map_err(|e| SdkError::InvalidUrl(format!("{}: {}", path, e)))
    }

    pub fn login_url(&self) -> Result<Url> {
        self.url(&self.login_path)
    }

    pub fn refresh_url(&self) -> Result<Url> {
        self.url(&self.refresh_path)
    }

    /// Build a plain HTTP client with this configuration's timeouts.
    pub fn build_http_client(&self) -> Result<reqwest::Client> {
        Ok(reqwest::Client::builder()
            .timeout(self.request_timeout)
            .connect_timeout(self.connect_timeout)
            .danger_accept_invalid_certs(self.accept_invalid_certs)
            .build()?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let config = ClientConfig::default();
        assert_eq!(config.base_url, "https://localhost:7157/");
        assert_eq!(config.token_expiration_buffer, chrono::Duration::minutes(30));
        assert_eq!(config.login_url().unwrap().as_str(), "https://localhost:7157/identity/login");
    }

    #[test]
    fn test_url_join_without_trailing_slash() {
        let config = ClientConfig::with_base_url("http://example.test/showring");
        assert_eq!(
            config.url("/api/shows/3").unwrap().as_str(),
            "http://example.test/showring/api/shows/3"
        );
    }

    #[test]
    fn test_invalid_base_url() {
        let config = ClientConfig::with_base_url("not a url");
        assert!(matches!(config.base(), Err(SdkError::InvalidUrl(_))));
    }
}
