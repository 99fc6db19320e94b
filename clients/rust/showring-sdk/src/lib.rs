//! Showring Rust SDK
//!
//! Client for the Showring Platform API with persistent, self-refreshing
//! authentication.
//!
//! ```ignore
//! use std::sync::Arc;
//! use showring_sdk::{ClientConfig, FileSecureStorage, ShowringClient};
//!
//! let storage = Arc::new(FileSecureStorage::new("secure.json"));
//! let client = ShowringClient::new(ClientConfig::with_base_url("https://shows.example"), storage)?;
//!
//! if client.auth().login("rider@example.com", "secret").await {
//!     let shows = client.shows().list().await?;
//! }
//! ```
//!
//! Tokens are stored through a [`SecureStorageProvider`]. Any request made
//! within [`config::DEFAULT_TOKEN_EXPIRATION_BUFFER_MINUTES`] of the token's
//! expiry refreshes it first; a 401 response clears the stored credentials.

pub mod auth;
pub mod auth_state;
pub mod clients;
pub mod config;
pub mod diagnostics;
pub mod error;
pub mod http;
pub mod jwt;
pub mod storage;
pub mod token;

use std::sync::Arc;

pub use auth::AuthService;
pub use auth_state::{AuthState, AuthStateProvider, LoginStatus};
pub use clients::*;
pub use config::ClientConfig;
pub use diagnostics::NetworkDiagnostics;
pub use error::{Result, SdkError};
pub use http::{AuthenticatedClient, HttpClientFactory};
pub use storage::{FileSecureStorage, MemorySecureStorage, SecureStorageProvider};
pub use token::{AccessTokenInfo, TokenStorage};

pub use sr_common as types;

/// One session shared by every typed client.
#[derive(Clone)]
pub struct ShowringClient {
    auth: Arc<AuthService>,
    http: AuthenticatedClient,
    factory: Arc<HttpClientFactory>,
}

impl ShowringClient {
    pub fn new(config: ClientConfig, storage: Arc<dyn SecureStorageProvider>) -> Result<Self> {
        let provider = Arc::new(AuthStateProvider::new(config.clone(), TokenStorage::new(storage))?);
        let factory = HttpClientFactory::new(config, provider.clone());
        let http = factory.authenticated()?;
        Ok(Self {
            auth: Arc::new(AuthService::new(provider)),
            http,
            factory: Arc::new(factory),
        })
    }

    pub fn auth(&self) -> &AuthService {
        &self.auth
    }

    pub fn state(&self) -> &Arc<AuthStateProvider> {
        self.auth.provider()
    }

    pub fn factory(&self) -> &HttpClientFactory {
        &self.factory
    }

    pub fn http(&self) -> &AuthenticatedClient {
        &self.http
    }

    pub fn identity(&self) -> IdentityClient {
        IdentityClient::new(self.http.clone())
    }

    pub fn shows(&self) -> ShowsClient {
        ShowsClient::new(self.http.clone())
    }

    pub fn show_holder(&self) -> ShowHolderClient {
        ShowHolderClient::new(self.http.clone())
    }

    pub fn divisions(&self) -> DivisionsClient {
        DivisionsClient::new(self.http.clone())
    }

    pub fn show_classes(&self) -> ShowClassesClient {
        ShowClassesClient::new(self.http.clone())
    }

    pub fn entries(&self) -> EntriesClient {
        EntriesClient::new(self.http.clone())
    }

    pub fn results(&self) -> ResultsClient {
        ResultsClient::new(self.http.clone())
    }

    pub fn user_model_objects(&self) -> UserModelObjectsClient {
        UserModelObjectsClient::new(self.http.clone())
    }

    pub fn roles(&self) -> RolesClient {
        RolesClient::new(self.http.clone())
    }

    pub fn users(&self) -> UsersClient {
        UsersClient::new(self.http.clone())
    }
}
