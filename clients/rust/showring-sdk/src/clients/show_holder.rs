use sr_common::{ShowDto, ShowRequest};

use crate::error::Result;
use crate::http::AuthenticatedClient;

/// Shows owned by the signed-in show holder
#[derive(Clone)]
pub struct ShowHolderClient {
    http: AuthenticatedClient,
}

impl ShowHolderClient {
    pub fn new(http: AuthenticatedClient) -> Self {
        Self { http }
    }

    pub async fn my_shows(&self) -> Result<Vec<ShowDto>> {
        self.http.get_json("api/showholder/shows").await
    }

    /// The server sets the owning show holder from the caller.
    pub async fn create(&self, request: &ShowRequest) -> Result<ShowDto> {
        self.http.post_json("api/showholder/shows", request).await
    }

    pub async fn update(&self, id: i64, request: &ShowRequest) -> Result<ShowDto> {
        self.http
            .put_json(&format!("api/showholder/shows/{}", id), request)
            .await
    }

    pub async fn delete(&self, id: i64) -> Result<bool> {
        self.http.delete(&format!("api/showholder/shows/{}", id)).await
    }
}
