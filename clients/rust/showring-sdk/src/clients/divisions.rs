use sr_common::{DivisionDto, DivisionRequest};

use crate::error::Result;
use crate::http::AuthenticatedClient;

#[derive(Clone)]
pub struct DivisionsClient {
    http: AuthenticatedClient,
}

impl DivisionsClient {
    pub fn new(http: AuthenticatedClient) -> Self {
        Self { http }
    }

    pub async fn list_for_show(&self, show_id: i64) -> Result<Vec<DivisionDto>> {
        self.http
            .get_json_query("api/divisions", &[("showId", show_id.to_string())])
            .await
    }

    pub async fn get(&self, id: i64) -> Result<Option<DivisionDto>> {
        self.http.get_optional(&format!("api/divisions/{}", id)).await
    }

    pub async fn create(&self, request: &DivisionRequest) -> Result<DivisionDto> {
        self.http.post_json("api/divisions", request).await
    }

    pub async fn update(&self, id: i64, request: &DivisionRequest) -> Result<DivisionDto> {
        self.http.put_json(&format!("api/divisions/{}", id), request).await
    }

    pub async fn delete(&self, id: i64) -> Result<bool> {
        self.http.delete(&format!("api/divisions/{}", id)).await
    }
}
