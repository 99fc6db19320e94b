use sr_common::{UserModelObjectDto, UserModelObjectRequest};

use crate::error::Result;
use crate::http::AuthenticatedClient;

/// Model horses
#[derive(Clone)]
pub struct UserModelObjectsClient {
    http: AuthenticatedClient,
}

impl UserModelObjectsClient {
    pub fn new(http: AuthenticatedClient) -> Self {
        Self { http }
    }

    pub async fn list_for_user(&self, application_user_id: &str) -> Result<Vec<UserModelObjectDto>> {
        self.http
            .get_json_query(
                "api/userModelObjects",
                &[("applicationUserId", application_user_id)],
            )
            .await
    }

    pub async fn get(&self, id: i64) -> Result<Option<UserModelObjectDto>> {
        self.http
            .get_optional(&format!("api/userModelObjects/{}", id))
            .await
    }

    pub async fn create(&self, request: &UserModelObjectRequest) -> Result<UserModelObjectDto> {
        self.http.post_json("api/userModelObjects", request).await
    }

    pub async fn update(&self, id: i64, request: &UserModelObjectRequest) -> Result<UserModelObjectDto> {
        self.http
            .put_json(&format!("api/userModelObjects/{}", id), request)
            .await
    }

    pub async fn delete(&self, id: i64) -> Result<bool> {
        self.http
            .delete(&format!("api/userModelObjects/{}", id))
            .await
    }
}
