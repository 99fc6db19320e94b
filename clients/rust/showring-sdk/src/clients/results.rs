use sr_common::{ResultDto, ResultRequest};

use crate::error::Result;
use crate::http::AuthenticatedClient;

#[derive(Clone)]
pub struct ResultsClient {
    http: AuthenticatedClient,
}

impl ResultsClient {
    pub fn new(http: AuthenticatedClient) -> Self {
        Self { http }
    }

    pub async fn get(&self, id: i64) -> Result<Option<ResultDto>> {
        self.http.get_optional(&format!("api/results/{}", id)).await
    }

    pub async fn get_for_entry(&self, entry_id: i64) -> Result<Option<ResultDto>> {
        self.http
            .get_optional(&format!("api/results/entry/{}", entry_id))
            .await
    }

    pub async fn create(&self, request: &ResultRequest) -> Result<ResultDto> {
        self.http.post_json("api/results", request).await
    }

    pub async fn update(&self, id: i64, request: &ResultRequest) -> Result<ResultDto> {
        self.http.put_json(&format!("api/results/{}", id), request).await
    }

    pub async fn delete(&self, id: i64) -> Result<bool> {
        self.http.delete(&format!("api/results/{}", id)).await
    }
}
