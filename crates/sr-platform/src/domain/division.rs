use chrono::{DateTime, Utc};
use sr_common::DivisionRequest;

use super::ShowClass;
use crate::error::{PlatformError, Result};

named_enum! {
    pub enum DivisionType {
        Halter,
        Performance,
        Collectibility,
        Workmanship,
    }
}

impl Default for DivisionType {
    fn default() -> Self {
        Self::Halter
    }
}

/// A grouping of classes within a show
#[derive(Debug, Clone, PartialEq)]
pub struct Division {
    pub id: i64,
    pub name: String,
    pub description: String,
    pub division_type: DivisionType,
    pub sort_order: i32,
    pub show_id: i64,
    /// Populated only by queries that load classes
    pub classes: Vec<ShowClass>,
    pub created_at: DateTime<Utc>,
    pub updated_at: Option<DateTime<Utc>>,
    pub is_deleted: bool,
}

impl Division {
    pub fn new(name: impl Into<String>, show_id: i64) -> Self {
        Self {
            id: 0,
            name: name.into(),
            description: String::new(),
            division_type: DivisionType::default(),
            sort_order: 0,
            show_id,
            classes: Vec::new(),
            created_at: Utc::now(),
            updated_at: None,
            is_deleted: false,
        }
    }

    pub fn from_request(req: &DivisionRequest) -> Result<Self> {
        let mut division = Division::new(req.name.clone(), req.show_id);
        division.apply_request(req)?;
        Ok(division)
    }

    pub fn apply_request(&mut self, req: &DivisionRequest) -> Result<()> {
        let name = req.name.trim();
        if name.is_empty() {
            return Err(PlatformError::validation("Division name is required"));
        }
        self.name = name.to_string();
        self.description = req.description.clone();
        self.division_type = super::parse_or_default(req.division_type.as_deref());
        self.sort_order = req.sort_order;
        self.show_id = req.show_id;
        Ok(())
    }

    pub fn touch(&mut self) {
        self.updated_at = Some(Utc::now());
    }
}
