use sr_common::{ShowDto, ShowRequest};

use super::segment;
use crate::error::Result;
use crate::http::AuthenticatedClient;

#[derive(Clone)]
pub struct ShowsClient {
    http: AuthenticatedClient,
}

impl ShowsClient {
    pub fn new(http: AuthenticatedClient) -> Self {
        Self { http }
    }

    pub async fn list(&self) -> Result<Vec<ShowDto>> {
        self.http.get_json("api/shows").await
    }

    /// Show with its divisions and classes.
    pub async fn get(&self, id: i64) -> Result<Option<ShowDto>> {
        self.http.get_optional(&format!("api/shows/{}", id)).await
    }

    pub async fn list_by_judge(&self, judge_id: &str) -> Result<Vec<ShowDto>> {
        self.http
            .get_json(&format!("api/shows/judge/{}", segment(judge_id)))
            .await
    }

    pub async fn create(&self, request: &ShowRequest) -> Result<ShowDto> {
        self.http.post_json("api/shows", request).await
    }

    pub async fn update(&self, id: i64, request: &ShowRequest) -> Result<ShowDto> {
        self.http.put_json(&format!("api/shows/{}", id), request).await
    }

    pub async fn delete(&self, id: i64) -> Result<bool> {
        self.http.delete(&format!("api/shows/{}", id)).await
    }
}
