use base64::{engine::general_purpose::STANDARD, Engine};
use chrono::{DateTime, Utc};
use sr_common::UserModelObjectRequest;

use crate::error::{PlatformError, Result};

/// A competitor's model horse
#[derive(Debug, Clone, PartialEq)]
pub struct UserModelObject {
    pub id: i64,
    pub tw_entry_id: Option<i32>,
    pub name: String,
    pub description: String,
    /// Owning application user
    pub application_user_id: Option<String>,
    pub color: String,
    pub size: String,
    pub class: String,
    pub breed: String,
    pub notes: String,
    pub hero_shot_image: Option<Vec<u8>>,
    pub created_at: DateTime<Utc>,
    pub updated_at: Option<DateTime<Utc>>,
    pub is_deleted: bool,
}

impl UserModelObject {
    pub fn new(name: impl Into<String>, owner_id: impl Into<String>) -> Self {
        Self {
            id: 0,
            tw_entry_id: None,
            name: name.into(),
            description: String::new(),
            application_user_id: Some(owner_id.into()),
            color: String::new(),
            size: String::new(),
            class: String::new(),
            breed: String::new(),
            notes: String::new(),
            hero_shot_image: None,
            created_at: Utc::now(),
            updated_at: None,
            is_deleted: false,
        }
    }

    pub fn from_request(req: &UserModelObjectRequest, owner_id: &str) -> Result<Self> {
        let mut horse = UserModelObject::new(req.name.clone(), owner_id);
        horse.apply_request(req)?;
        Ok(horse)
    }

    /// Copy editable fields; ownership is never taken from the request.
    pub fn apply_request(&mut self, req: &UserModelObjectRequest) -> Result<()> {
        let name = req.name.trim();
        if name.is_empty() {
            return Err(PlatformError::validation("Name is required"));
        }
        let image = match req.hero_shot_image.as_deref().filter(|s| !s.is_empty()) {
            Some(encoded) => Some(
                STANDARD
                    .decode(encoded)
                    .map_err(|_| PlatformError::validation("heroShotImage must be base64"))?,
            ),
            None => None,
        };

        self.tw_entry_id = req.tw_entry_id;
        self.name = name.to_string();
        self.description = req.description.clone();
        self.color = req.color.clone();
        self.size = req.size.clone();
        self.class = req.class.clone();
        self.breed = req.breed.clone();
        self.notes = req.notes.clone();
        self.hero_shot_image = image;
        Ok(())
    }

    pub fn hero_shot_base64(&self) -> Option<String> {
        self.hero_shot_image.as_ref().map(|bytes| STANDARD.encode(bytes))
    }

    pub fn is_owned_by(&self, user_id: &str) -> bool {
        self.application_user_id.as_deref() == Some(user_id)
    }

    pub fn touch(&mut self) {
        self.updated_at = Some(Utc::now());
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_request_image_is_decoded() {
        let req = UserModelObjectRequest {
            name: "Silver Dollar".to_string(),
            breed: "Arabian".to_string(),
            hero_shot_image: Some(STANDARD.encode([1u8, 2, 3])),
            ..Default::default()
        };
        let horse = UserModelObject::from_request(&req, "owner-1").unwrap();
        assert!(horse.is_owned_by("owner-1"));
        assert_eq!(horse.hero_shot_image, Some(vec![1, 2, 3]));
        assert_eq!(horse.hero_shot_base64(), req.hero_shot_image);
    }

    #[test]
    fn test_invalid_image_rejected() {
        let req = UserModelObjectRequest {
            name: "Silver Dollar".to_string(),
            hero_shot_image: Some("***".to_string()),
            ..Default::default()
        };
        assert!(UserModelObject::from_request(&req, "owner-1").is_err());
    }
}
