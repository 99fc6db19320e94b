//! Connectivity diagnostics

use std::fmt::Write as _;
use std::time::Duration;

use reqwest::Method;
use tokio::net::TcpStream;
use tracing::{debug, warn};

use crate::config::ClientConfig;
use crate::error::Result;

pub struct NetworkDiagnostics {
    config: ClientConfig,
    http: reqwest::Client,
}

impl NetworkDiagnostics {
    pub fn new(config: ClientConfig) -> Result<Self> {
        let http = config.build_http_client()?;
        Ok(Self { config, http })
    }

    /// True when a GET on the base URL returns a success status.
    pub async fn test_connection(&self) -> bool {
        let url = match self.config.base() {
            Ok(url) => url,
            Err(e) => {
                warn!("Diagnostic test failed: {}", e);
                return false;
            }
        };

        debug!(%url, "Performing diagnostic connection test");
        match self.http.get(url).send().await {
            Ok(response) => {
                debug!(status = %response.status(), "Diagnostic test response");
                response.status().is_success()
            }
            Err(e) => {
                warn!("Diagnostic test failed: {}", e);
                false
            }
        }
    }

    /// Human-readable report covering the backend and a raw TCP connect.
    pub async fn run_diagnostics(&self) -> String {
        let mut report = String::new();
        let _ = writeln!(report, "Base URL: {}", self.config.base_url);
        let _ = writeln!(
            report,
            "Backend connectivity: {}",
            if self.test_connection().await { "OK" } else { "Failed" }
        );

        match self.config.base() {
            Ok(url) => {
                let host = url.host_str().unwrap_or_default().to_string();
                let port = url.port_or_known_default().unwrap_or(443);
                let connect = tokio::time::timeout(
                    self.config.connect_timeout,
                    TcpStream::connect((host.as_str(), port)),
                )
                .await;
                let outcome = match connect {
                    Ok(Ok(_)) => "OK".to_string(),
                    Ok(Err(e)) => format!("Failed ({})", e),
                    Err(_) => "Timed out".to_string(),
                };
                let _ = writeln!(report, "TCP {}:{}: {}", host, port, outcome);
            }
            Err(e) => {
                let _ = writeln!(report, "Invalid base URL: {}", e);
            }
        }

        report
    }

    /// Try the login endpoint with OPTIONS and GET. Any HTTP response
    /// means the endpoint is reachable.
    pub async fn test_login_endpoint(&self) -> String {
        let url = match self.config.login_url() {
            Ok(url) => url,
            Err(e) => return format!("Invalid login URL: {}", e),
        };

        let mut report = String::new();
        for method in [Method::OPTIONS, Method::GET] {
            let result = self
                .http
                .request(method.clone(), url.clone())
                .timeout(Duration::from_secs(10))
                .send()
                .await;
            let _ = match result {
                Ok(response) => writeln!(report, "{} {}: {}", method, url, response.status()),
                Err(e) => writeln!(report, "{} {}: error ({})", method, url, e),
            };
        }
        report
    }
}
