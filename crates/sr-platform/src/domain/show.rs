//! Show Entity

use chrono::{DateTime, Utc};
use sr_common::ShowRequest;

use crate::error::{PlatformError, Result};

named_enum! {
    /// Lifecycle of a show
    pub enum ShowStatus {
        Upcoming,
        InProgress,
        Completed,
        Cancelled,
    }
}

impl Default for ShowStatus {
    fn default() -> Self {
        Self::Upcoming
    }
}

named_enum! {
    /// How entries are presented to the judge
    pub enum ShowType {
        /// Models are brought to a physical venue
        LiveShow,
        /// Entries are judged from submitted photographs
        PhotoShow,
        Hybrid,
    }
}

impl Default for ShowType {
    fn default() -> Self {
        Self::LiveShow
    }
}

named_enum! {
    pub enum ShowFormat {
        Regular,
        Specialty,
        Championship,
    }
}

impl Default for ShowFormat {
    fn default() -> Self {
        Self::Regular
    }
}

/// Default cap on entries a single competitor may submit to one show
pub const DEFAULT_MAX_ENTRIES_PER_USER: i32 = 5;

/// A horse show owned by a show holder
#[derive(Debug, Clone, PartialEq)]
pub struct Show {
    pub id: i64,
    pub name: String,
    pub description: String,
    pub show_date: DateTime<Utc>,
    pub end_date: Option<DateTime<Utc>>,
    pub status: ShowStatus,
    /// Application user id of the assigned judge
    pub judge_id: Option<String>,
    /// The show holder's model horse record; its owner owns the show
    pub show_holder_id: i64,
    pub is_active: bool,
    pub entry_deadline: Option<DateTime<Utc>>,
    pub judging_deadline: Option<DateTime<Utc>>,
    pub results_published_at: Option<DateTime<Utc>>,
    pub max_entries_per_user: i32,
    pub show_type: ShowType,
    pub show_format: ShowFormat,
    pub is_private: bool,
    pub allow_member_only_entries: bool,
    pub is_nan_qualifying: bool,
    pub namhsa_guidelines: Option<String>,
    pub additional_metadata: Option<String>,
    /// Display name of the judge, filled by joined reads
    pub judge_name: Option<String>,
    /// Name of the show holder record, filled by joined reads
    pub show_holder_name: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: Option<DateTime<Utc>>,
    pub is_deleted: bool,
}

impl Show {
    pub fn new(name: impl Into<String>, show_date: DateTime<Utc>, show_holder_id: i64) -> Self {
        Self {
            id: 0,
            name: name.into(),
            description: String::new(),
            show_date,
            end_date: None,
            status: ShowStatus::default(),
            judge_id: None,
            show_holder_id,
            is_active: true,
            entry_deadline: None,
            judging_deadline: None,
            results_published_at: None,
            max_entries_per_user: DEFAULT_MAX_ENTRIES_PER_USER,
            show_type: ShowType::default(),
            show_format: ShowFormat::default(),
            is_private: false,
            allow_member_only_entries: false,
            is_nan_qualifying: false,
            namhsa_guidelines: None,
            additional_metadata: None,
            judge_name: None,
            show_holder_name: None,
            created_at: Utc::now(),
            updated_at: None,
            is_deleted: false,
        }
    }

    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = description.into();
        self
    }

    pub fn with_judge(mut self, judge_id: impl Into<String>) -> Self {
        self.judge_id = Some(judge_id.into());
        self
    }

    pub fn with_status(mut self, status: ShowStatus) -> Self {
        self.status = status;
        self
    }

    pub fn from_request(req: &ShowRequest) -> Result<Self> {
        let mut show = Show::new(req.name.clone(), req.show_date, req.show_holder_id);
        show.apply_request(req)?;
        Ok(show)
    }

    /// Copy editable fields from a request.
    ///
    /// An unknown status is rejected; unknown show types and formats fall
    /// back to their defaults.
    pub fn apply_request(&mut self, req: &ShowRequest) -> Result<()> {
        let name = req.name.trim();
        if name.is_empty() {
            return Err(PlatformError::validation("Show name is required"));
        }
        if let Some(end) = req.end_date {
            if end < req.show_date {
                return Err(PlatformError::validation("End date cannot be before the show date"));
            }
        }
        let max_entries_per_user = req.max_entries_per_user.unwrap_or(DEFAULT_MAX_ENTRIES_PER_USER);
        if max_entries_per_user < 1 {
            return Err(PlatformError::validation("maxEntriesPerUser must be at least 1"));
        }

        self.status = match req.status.as_deref() {
            Some(status) => status.parse()?,
            None => self.status,
        };
        self.name = name.to_string();
        self.description = req.description.clone();
        self.show_date = req.show_date;
        self.end_date = req.end_date;
        self.judge_id = req.judge_id.clone().filter(|j| !j.trim().is_empty());
        self.show_holder_id = req.show_holder_id;
        self.show_type = super::parse_or_default(req.show_type.as_deref());
        self.show_format = super::parse_or_default(req.show_format.as_deref());
        if let Some(active) = req.is_active {
            self.is_active = active;
        }
        self.is_private = req.is_private;
        self.max_entries_per_user = max_entries_per_user;
        self.allow_member_only_entries = req.allow_member_only_entries;
        self.entry_deadline = req.entry_deadline;
        self.judging_deadline = req.judging_deadline;
        self.results_published_at = req.results_published_at;
        self.is_nan_qualifying = req.is_nan_qualifying;
        self.namhsa_guidelines = req.namhsa_guidelines.clone();
        self.additional_metadata = req.additional_metadata.clone();
        Ok(())
    }

    /// Entries are accepted until the deadline passes, if one is set.
    pub fn accepts_entries_at(&self, at: DateTime<Utc>) -> bool {
        self.is_active
            && self.status == ShowStatus::Upcoming
            && self.entry_deadline.map_or(true, |deadline| at <= deadline)
    }

    pub fn touch(&mut self) {
        self.updated_at = Some(Utc::now());
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Duration;

    #[test]
    fn test_new_show_defaults() {
        let show = Show::new("Spring Fling", Utc::now(), 7);
        assert_eq!(show.status, ShowStatus::Upcoming);
        assert_eq!(show.show_type, ShowType::LiveShow);
        assert_eq!(show.show_format, ShowFormat::Regular);
        assert_eq!(show.max_entries_per_user, 5);
        assert!(show.is_active);
        assert!(!show.is_deleted);
        assert!(show.updated_at.is_none());
    }

    #[test]
    fn test_status_parse_is_case_insensitive() {
        assert_eq!("inprogress".parse::<ShowStatus>().unwrap(), ShowStatus::InProgress);
        assert_eq!(" Completed ".parse::<ShowStatus>().unwrap(), ShowStatus::Completed);
        assert!("Postponed".parse::<ShowStatus>().is_err());
        assert_eq!(ShowStatus::Cancelled.to_string(), "Cancelled");
    }

    #[test]
    fn test_from_request() {
        let req = ShowRequest {
            name: "  Fall Finale ".to_string(),
            show_date: Utc::now(),
            show_holder_id: 3,
            status: Some("inprogress".to_string()),
            show_type: Some("photoshow".to_string()),
            show_format: Some("mystery".to_string()),
            judge_id: Some("   ".to_string()),
            ..Default::default()
        };
        let show = Show::from_request(&req).unwrap();
        assert_eq!(show.name, "Fall Finale");
        assert_eq!(show.status, ShowStatus::InProgress);
        assert_eq!(show.show_type, ShowType::PhotoShow);
        assert_eq!(show.show_format, ShowFormat::Regular);
        assert_eq!(show.judge_id, None);
        assert_eq!(show.max_entries_per_user, DEFAULT_MAX_ENTRIES_PER_USER);
    }

    #[test]
    fn test_request_validation() {
        let base = ShowRequest {
            name: "Valid".to_string(),
            show_date: Utc::now(),
            show_holder_id: 1,
            ..Default::default()
        };

        let blank = ShowRequest { name: " ".to_string(), ..base.clone() };
        assert!(Show::from_request(&blank).is_err());

        let bad_status = ShowRequest { status: Some("Postponed".to_string()), ..base.clone() };
        assert!(Show::from_request(&bad_status).is_err());

        let backwards = ShowRequest {
            end_date: Some(base.show_date - Duration::days(1)),
            ..base.clone()
        };
        assert!(Show::from_request(&backwards).is_err());
    }

    #[test]
    fn test_entry_window() {
        let now = Utc::now();
        let mut show = Show::new("Summer Classic", now + Duration::days(30), 1);
        assert!(show.accepts_entries_at(now));

        show.entry_deadline = Some(now);
        assert!(show.accepts_entries_at(now));
        assert!(!show.accepts_entries_at(now + Duration::milliseconds(1)));

        show.entry_deadline = Some(now - Duration::hours(1));
        assert!(!show.accepts_entries_at(now));

        show.entry_deadline = None;
        show.status = ShowStatus::Cancelled;
        assert!(!show.accepts_entries_at(now));
    }
}
