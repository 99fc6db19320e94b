use sr_common::{EntryDto, EntryRequest};

use crate::error::Result;
use crate::http::AuthenticatedClient;

#[derive(Clone)]
pub struct EntriesClient {
    http: AuthenticatedClient,
}

impl EntriesClient {
    pub fn new(http: AuthenticatedClient) -> Self {
        Self { http }
    }

    pub async fn list_for_class(&self, show_class_id: i64) -> Result<Vec<EntryDto>> {
        self.http
            .get_json_query("api/entries", &[("showClassId", show_class_id.to_string())])
            .await
    }

    pub async fn list_for_horse(&self, user_model_object_id: i64) -> Result<Vec<EntryDto>> {
        self.http
            .get_json_query(
                "api/entries",
                &[("userModelObjectId", user_model_object_id.to_string())],
            )
            .await
    }

    pub async fn get(&self, id: i64) -> Result<Option<EntryDto>> {
        self.http.get_optional(&format!("api/entries/{}", id)).await
    }

    pub async fn create(&self, request: &EntryRequest) -> Result<EntryDto> {
        self.http.post_json("api/entries", request).await
    }

    pub async fn update(&self, id: i64, request: &EntryRequest) -> Result<EntryDto> {
        self.http.put_json(&format!("api/entries/{}", id), request).await
    }

    pub async fn delete(&self, id: i64) -> Result<bool> {
        self.http.delete(&format!("api/entries/{}", id)).await
    }
}
