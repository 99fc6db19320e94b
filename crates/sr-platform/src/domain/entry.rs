use chrono::{DateTime, Utc};
use sr_common::EntryRequest;

use super::ShowResult;
use crate::error::{PlatformError, Result};

named_enum! {
    pub enum EntryStatus {
        Submitted,
        Accepted,
        Rejected,
    }
}

impl Default for EntryStatus {
    fn default() -> Self {
        Self::Submitted
    }
}

/// A horse entered into a class
#[derive(Debug, Clone, PartialEq)]
pub struct Entry {
    pub id: i64,
    pub entry_number: i32,
    pub submission_date: DateTime<Utc>,
    pub status: EntryStatus,
    pub user_model_object_id: i64,
    pub show_class_id: i64,
    /// Name of the entered horse, filled by joined reads
    pub horse_name: Option<String>,
    pub result: Option<ShowResult>,
    pub created_at: DateTime<Utc>,
    pub updated_at: Option<DateTime<Utc>>,
    pub is_deleted: bool,
}

impl Entry {
    pub fn new(entry_number: i32, user_model_object_id: i64, show_class_id: i64) -> Self {
        let now = Utc::now();
        Self {
            id: 0,
            entry_number,
            submission_date: now,
            status: EntryStatus::default(),
            user_model_object_id,
            show_class_id,
            horse_name: None,
            result: None,
            created_at: now,
            updated_at: None,
            is_deleted: false,
        }
    }

    pub fn from_request(req: &EntryRequest) -> Result<Self> {
        let mut entry = Entry::new(req.entry_number, req.user_model_object_id, req.show_class_id);
        entry.apply_request(req)?;
        Ok(entry)
    }

    pub fn apply_request(&mut self, req: &EntryRequest) -> Result<()> {
        if req.entry_number < 1 {
            return Err(PlatformError::validation("Entry number must be positive"));
        }
        if let Some(status) = req.status.as_deref() {
            self.status = status.parse()?;
        }
        if let Some(submitted) = req.submission_date {
            self.submission_date = submitted;
        }
        self.entry_number = req.entry_number;
        self.user_model_object_id = req.user_model_object_id;
        self.show_class_id = req.show_class_id;
        Ok(())
    }

    pub fn touch(&mut self) {
        self.updated_at = Some(Utc::now());
    }
}
