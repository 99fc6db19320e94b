use sr_common::UserDto;

use super::segment;
use crate::error::Result;
use crate::http::AuthenticatedClient;

#[derive(Clone)]
pub struct UsersClient {
    http: AuthenticatedClient,
}

impl UsersClient {
    pub fn new(http: AuthenticatedClient) -> Self {
        Self { http }
    }

    pub async fn list(&self) -> Result<Vec<UserDto>> {
        self.http.get_json("api/users").await
    }

    pub async fn get(&self, id: &str) -> Result<Option<UserDto>> {
        self.http.get_optional(&format!("api/users/{}", segment(id))).await
    }

    pub async fn get_by_email(&self, email: &str) -> Result<Option<UserDto>> {
        self.http
            .get_optional(&format!("api/users/by-email/{}", segment(email)))
            .await
    }

    pub async fn roles(&self, id: &str) -> Result<Vec<String>> {
        self.http
            .get_json(&format!("api/users/{}/roles", segment(id)))
            .await
    }

    /// Grant `role`; returns the user's roles afterwards.
    pub async fn add_role(&self, id: &str, role: &str) -> Result<Vec<String>> {
        self.http
            .post_query(&format!("api/users/{}/roles", segment(id)), &[("role", role)])
            .await
    }

    pub async fn remove_role(&self, id: &str, role: &str) -> Result<bool> {
        self.http
            .delete(&format!("api/users/{}/roles/{}", segment(id), segment(role)))
            .await
    }
}
