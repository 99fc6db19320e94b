use serde::Deserialize;
use sr_common::{RegisterRequest, UserInfo};

use crate::error::Result;
use crate::http::AuthenticatedClient;

/// Id of a newly registered account
#[derive(Debug, Clone, Deserialize)]
pub struct RegisteredUser {
    pub id: String,
}

/// Account endpoints other than login and refresh, which the
/// [`AuthStateProvider`](crate::AuthStateProvider) owns.
#[derive(Clone)]
pub struct IdentityClient {
    http: AuthenticatedClient,
}

impl IdentityClient {
    pub fn new(http: AuthenticatedClient) -> Self {
        Self { http }
    }

    pub async fn register(&self, request: &RegisterRequest) -> Result<RegisteredUser> {
        self.http.post_json("identity/register", request).await
    }

    pub async fn me(&self) -> Result<UserInfo> {
        self.http.get_json("identity/me").await
    }

    /// Revoke refresh tokens on the server, then drop the local session.
    pub async fn logout(&self) -> Result<()> {
        let request = self.http.request(reqwest::Method::POST, "identity/logout")?;
        let result = self.http.execute(request).await;
        self.http.auth().logout().await;
        result.map(|_| ())
    }
}
