use chrono::{DateTime, Utc};
use sr_common::ResultRequest;

use crate::error::{PlatformError, Result};

/// Judged placement for a single entry
#[derive(Debug, Clone, PartialEq)]
pub struct ShowResult {
    pub id: i64,
    /// 1 is first place
    pub placement: i32,
    pub comments: String,
    pub judged_date: DateTime<Utc>,
    pub entry_id: i64,
    pub created_at: DateTime<Utc>,
    pub updated_at: Option<DateTime<Utc>>,
    pub is_deleted: bool,
}

impl ShowResult {
    pub fn new(entry_id: i64, placement: i32) -> Self {
        let now = Utc::now();
        Self {
            id: 0,
            placement,
            comments: String::new(),
            judged_date: now,
            entry_id,
            created_at: now,
            updated_at: None,
            is_deleted: false,
        }
    }

    pub fn with_comments(mut self, comments: impl Into<String>) -> Self {
        self.comments = comments.into();
        self
    }

    pub fn from_request(req: &ResultRequest) -> Result<Self> {
        let mut result = ShowResult::new(req.entry_id, req.placement);
        result.apply_request(req)?;
        Ok(result)
    }

    pub fn apply_request(&mut self, req: &ResultRequest) -> Result<()> {
        if req.placement < 1 {
            return Err(PlatformError::validation("Placement must be 1 or greater"));
        }
        self.placement = req.placement;
        self.comments = req.comments.clone();
        if let Some(judged) = req.judged_date {
            self.judged_date = judged;
        }
        self.entry_id = req.entry_id;
        Ok(())
    }

    pub fn touch(&mut self) {
        self.updated_at = Some(Utc::now());
    }
}
