use sr_common::{RoleDto, RoleUserCount};

use super::segment;
use crate::error::Result;
use crate::http::AuthenticatedClient;

#[derive(Clone)]
pub struct RolesClient {
    http: AuthenticatedClient,
}

impl RolesClient {
    pub fn new(http: AuthenticatedClient) -> Self {
        Self { http }
    }

    pub async fn list(&self) -> Result<Vec<RoleDto>> {
        self.http.get_json("api/roles").await
    }

    pub async fn create(&self, name: &str) -> Result<RoleDto> {
        self.http.post_query("api/roles", &[("name", name)]).await
    }

    pub async fn rename(&self, name: &str, new_name: &str) -> Result<RoleDto> {
        self.http
            .put_query(&format!("api/roles/{}", segment(name)), &[("newName", new_name)])
            .await
    }

    pub async fn delete(&self, name: &str) -> Result<bool> {
        self.http.delete(&format!("api/roles/{}", segment(name))).await
    }

    pub async fn user_count(&self, name: &str) -> Result<RoleUserCount> {
        self.http
            .get_json(&format!("api/roles/{}/count", segment(name)))
            .await
    }
}
