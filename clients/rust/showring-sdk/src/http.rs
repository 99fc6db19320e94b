//! Authenticated HTTP
//!
//! Every request made through [`AuthenticatedClient`] asks the
//! [`AuthStateProvider`] for a fresh token first and attaches it as a Bearer
//! header. A 401 from the server wipes the stored credentials.

use std::sync::Arc;

use chrono::Duration;
use reqwest::header::{HeaderMap, HeaderValue, AUTHORIZATION};
use reqwest::{Method, RequestBuilder, Response, StatusCode, Url};
use serde::de::DeserializeOwned;
use serde::Serialize;
use tracing::{debug, warn};

use crate::auth_state::AuthStateProvider;
use crate::config::ClientConfig;
use crate::error::{Result, SdkError};
use crate::jwt;

#[derive(Clone)]
pub struct AuthenticatedClient {
    config: ClientConfig,
    http: reqwest::Client,
    auth: Arc<AuthStateProvider>,
}

impl AuthenticatedClient {
    pub fn new(config: ClientConfig, http: reqwest::Client, auth: Arc<AuthStateProvider>) -> Self {
        Self { config, http, auth }
    }

    pub fn auth(&self) -> &Arc<AuthStateProvider> {
        &self.auth
    }

    pub fn url(&self, path: &str) -> Result<Url> {
        self.config.url(path)
    }

    pub fn request(&self, method: Method, path: &str) -> Result<RequestBuilder> {
        Ok(self.http.request(method, self.url(path)?))
    }

    /// Send `request` with the current Bearer token, if one is usable.
    pub async fn execute(&self, request: RequestBuilder) -> Result<Response> {
        let request = match self.bearer_token().await {
            Some(token) => request.bearer_auth(token),
            None => {
                debug!("Sending request without a token");
                request
            }
        };

        let response = request.send().await?;
        if response.status() == StatusCode::UNAUTHORIZED {
            warn!(url = %response.url(), "Server rejected the token, clearing credentials");
            self.auth.storage().clear_credentials().await;
            self.auth.logout().await;
        }
        Ok(response)
    }

    /// GET a single resource. A 404 is `Ok(None)`.
    pub async fn get_optional<T: DeserializeOwned>(&self, path: &str) -> Result<Option<T>> {
        let response = self.execute(self.request(Method::GET, path)?).await?;
        if response.status() == StatusCode::NOT_FOUND {
            return Ok(None);
        }
        read_json(response).await.map(Some)
    }

    pub async fn get_json<T: DeserializeOwned>(&self, path: &str) -> Result<T> {
        let response = self.execute(self.request(Method::GET, path)?).await?;
        read_json(response).await
    }

    pub async fn get_json_query<T, Q>(&self, path: &str, query: &Q) -> Result<T>
    where
        T: DeserializeOwned,
        Q: Serialize + ?Sized,
    {
        let request = self.request(Method::GET, path)?.query(query);
        read_json(self.execute(request).await?).await
    }

    pub async fn post_json<B, T>(&self, path: &str, body: &B) -> Result<T>
    where
        B: Serialize + ?Sized,
        T: DeserializeOwned,
    {
        let request = self.request(Method::POST, path)?.json(body);
        read_json(self.execute(request).await?).await
    }

    /// POST with query parameters and no body.
    pub async fn post_query<T, Q>(&self, path: &str, query: &Q) -> Result<T>
    where
        T: DeserializeOwned,
        Q: Serialize + ?Sized,
    {
        let request = self.request(Method::POST, path)?.query(query);
        read_json(self.execute(request).await?).await
    }

    pub async fn put_json<B, T>(&self, path: &str, body: &B) -> Result<T>
    where
        B: Serialize + ?Sized,
        T: DeserializeOwned,
    {
        let request = self.request(Method::PUT, path)?.json(body);
        read_json(self.execute(request).await?).await
    }

    pub async fn put_query<T, Q>(&self, path: &str, query: &Q) -> Result<T>
    where
        T: DeserializeOwned,
        Q: Serialize + ?Sized,
    {
        let request = self.request(Method::PUT, path)?.query(query);
        read_json(self.execute(request).await?).await
    }

    /// DELETE a resource. False when the server reports it missing.
    pub async fn delete(&self, path: &str) -> Result<bool> {
        let response = self.execute(self.request(Method::DELETE, path)?).await?;
        let status = response.status();
        if status == StatusCode::NOT_FOUND {
            return Ok(false);
        }
        if !status.is_success() {
            return Err(status_error(response).await);
        }
        Ok(true)
    }

    async fn bearer_token(&self) -> Option<String> {
        let info = self.auth.access_token_info().await?;
        let token = info.login_response.access_token;
        // opaque tokens carry no exp claim; only inspect ones that look like JWTs
        if token.is_empty()
            || (token.matches('.').count() == 2
                && jwt::is_expired(&token, Duration::seconds(jwt::DEFAULT_CLOCK_SKEW_SECS)))
        {
            return None;
        }
        Some(token)
    }
}

async fn read_json<T: DeserializeOwned>(response: Response) -> Result<T> {
    if !response.status().is_success() {
        return Err(status_error(response).await);
    }
    Ok(response.json::<T>().await?)
}

async fn status_error(response: Response) -> SdkError {
    let status = response.status().as_u16();
    let body = response.text().await.unwrap_or_default();
    SdkError::Status { status, body }
}

/// Builds plain and pre-authenticated HTTP clients.
pub struct HttpClientFactory {
    config: ClientConfig,
    auth: Arc<AuthStateProvider>,
}

impl HttpClientFactory {
    pub fn new(config: ClientConfig, auth: Arc<AuthStateProvider>) -> Self {
        Self { config, auth }
    }

    pub fn create_client(&self) -> Result<reqwest::Client> {
        self.config.build_http_client()
    }

    /// A client with the current token baked in as a default header.
    ///
    /// The header is not refreshed; prefer [`Self::authenticated`] for
    /// long-lived use.
    pub async fn create_authenticated_client(&self) -> Result<reqwest::Client> {
        let info = self
            .auth
            .access_token_info()
            .await
            .ok_or(SdkError::NotAuthenticated)?;

        let scheme = match info.login_response.token_type.as_str() {
            "" => "Bearer",
            other => other,
        };
        let mut value = HeaderValue::from_str(&format!("{} {}", scheme, info.access_token()))
            .map_err(|_| SdkError::NotAuthenticated)?;
        value.set_sensitive(true);

        let mut headers = HeaderMap::new();
        headers.insert(AUTHORIZATION, value);

        Ok(reqwest::Client::builder()
            .default_headers(headers)
            .timeout(self.config.request_timeout)
            .connect_timeout(self.config.connect_timeout)
            .danger_accept_invalid_certs(self.config.accept_invalid_certs)
            .build()?)
    }

    pub fn authenticated(&self) -> Result<AuthenticatedClient> {
        Ok(AuthenticatedClient::new(
            self.config.clone(),
            self.create_client()?,
            self.auth.clone(),
        ))
    }
}
