use sr_common::{ShowClassDto, ShowClassRequest};

use crate::error::Result;
use crate::http::AuthenticatedClient;

#[derive(Clone)]
pub struct ShowClassesClient {
    http: AuthenticatedClient,
}

impl ShowClassesClient {
    pub fn new(http: AuthenticatedClient) -> Self {
        Self { http }
    }

    pub async fn list_for_show(&self, show_id: i64) -> Result<Vec<ShowClassDto>> {
        self.http
            .get_json_query("api/showclasses", &[("showId", show_id.to_string())])
            .await
    }

    pub async fn list_for_division(&self, division_id: i64) -> Result<Vec<ShowClassDto>> {
        self.http
            .get_json_query("api/showclasses", &[("divisionId", division_id.to_string())])
            .await
    }

    pub async fn get(&self, id: i64) -> Result<Option<ShowClassDto>> {
        self.http.get_optional(&format!("api/showclasses/{}", id)).await
    }

    pub async fn create(&self, request: &ShowClassRequest) -> Result<ShowClassDto> {
        self.http.post_json("api/showclasses", request).await
    }

    pub async fn update(&self, id: i64, request: &ShowClassRequest) -> Result<ShowClassDto> {
        self.http.put_json(&format!("api/showclasses/{}", id), request).await
    }

    pub async fn delete(&self, id: i64) -> Result<bool> {
        self.http.delete(&format!("api/showclasses/{}", id)).await
    }
}
