//! Showring shared contracts
//!
//! Types that travel over the wire between the platform server and its
//! clients. Everything here serializes as camelCase JSON.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

// ============================================================================
// Roles
// ============================================================================

/// Application role names as stored in the role table and carried in tokens.
pub mod roles {
    pub const ADMIN: &str = "Admin";
    pub const JUDGE: &str = "Judge";
    pub const TRIAL_USER: &str = "TrialUser";
    pub const USER: &str = "User";
    pub const MODERATOR: &str = "Moderator";
    pub const SHOW_HOLDER: &str = "ShowHolder";

    pub const ALL_ROLES: [&str; 6] = [ADMIN, JUDGE, TRIAL_USER, USER, MODERATOR, SHOW_HOLDER];

    /// Role assigned to newly registered accounts
    pub const DEFAULT_ROLE: &str = USER;

    pub fn is_known(role: &str) -> bool {
        ALL_ROLES.iter().any(|r| r.eq_ignore_ascii_case(role))
    }
}

// ============================================================================
// Identity
// ============================================================================

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct LoginRequest {
    pub email: String,
    pub password: String,
}

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct RegisterRequest {
    pub email: String,
    pub password: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub first_name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub last_name: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct RefreshRequest {
    pub refresh_token: String,
}

/// Token pair returned by login and refresh
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct LoginResponse {
    /// Always "Bearer"
    pub token_type: String,
    pub access_token: String,
    /// Access token lifetime in seconds
    pub expires_in: i64,
    pub refresh_token: String,
    #[serde(default)]
    pub user_id: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub roles: Option<Vec<String>>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct UserInfo {
    pub id: String,
    pub email: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub first_name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub last_name: Option<String>,
    #[serde(default)]
    pub roles: Vec<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct UserDto {
    pub id: String,
    pub user_name: Option<String>,
    pub email: Option<String>,
    pub first_name: Option<String>,
    pub last_name: Option<String>,
    pub is_locked_out: bool,
    pub email_confirmed: bool,
    #[serde(default)]
    pub roles: Vec<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct RoleDto {
    pub id: i64,
    pub name: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct RoleUserCount {
    pub role: String,
    pub count: i64,
}

// ============================================================================
// Shows
// ============================================================================

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct ShowDto {
    pub id: i64,
    pub name: String,
    pub description: String,
    pub show_date: DateTime<Utc>,
    pub end_date: Option<DateTime<Utc>>,
    pub status: String,
    pub judge_id: Option<String>,
    #[serde(default)]
    pub judge_name: String,
    pub show_holder_id: i64,
    #[serde(default)]
    pub show_holder_name: String,
    pub show_type: String,
    pub show_format: String,
    pub is_active: bool,
    pub is_private: bool,
    pub max_entries_per_user: i32,
    pub allow_member_only_entries: bool,
    pub entry_deadline: Option<DateTime<Utc>>,
    pub judging_deadline: Option<DateTime<Utc>>,
    pub results_published_at: Option<DateTime<Utc>>,
    pub is_nan_qualifying: bool,
    pub namhsa_guidelines: Option<String>,
    pub additional_metadata: Option<String>,
    #[serde(default)]
    pub divisions: Vec<DivisionDto>,
    pub created_at: DateTime<Utc>,
    pub updated_at: Option<DateTime<Utc>>,
}

/// Body for creating or updating a show
///
/// `id` is ignored on create; on update it must match the path id when present.
#[derive(Debug, Clone, Default, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct ShowRequest {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<i64>,
    pub name: String,
    #[serde(default)]
    pub description: String,
    pub show_date: DateTime<Utc>,
    #[serde(default)]
    pub end_date: Option<DateTime<Utc>>,
    /// Upcoming, InProgress, Completed or Cancelled
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub status: Option<String>,
    #[serde(default)]
    pub judge_id: Option<String>,
    pub show_holder_id: i64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub show_type: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub show_format: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub is_active: Option<bool>,
    #[serde(default)]
    pub is_private: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub max_entries_per_user: Option<i32>,
    #[serde(default)]
    pub allow_member_only_entries: bool,
    #[serde(default)]
    pub entry_deadline: Option<DateTime<Utc>>,
    #[serde(default)]
    pub judging_deadline: Option<DateTime<Utc>>,
    #[serde(default)]
    pub results_published_at: Option<DateTime<Utc>>,
    #[serde(default)]
    pub is_nan_qualifying: bool,
    #[serde(default)]
    pub namhsa_guidelines: Option<String>,
    #[serde(default)]
    pub additional_metadata: Option<String>,
}

// ============================================================================
// Divisions and classes
// ============================================================================

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct DivisionDto {
    pub id: i64,
    pub name: String,
    pub description: String,
    pub division_type: String,
    pub sort_order: i32,
    pub show_id: i64,
    #[serde(default)]
    pub show_classes: Vec<ShowClassDto>,
    pub created_at: DateTime<Utc>,
    pub updated_at: Option<DateTime<Utc>>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct DivisionRequest {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<i64>,
    pub name: String,
    #[serde(default)]
    pub description: String,
    /// Halter, Performance, Collectibility or Workmanship
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub division_type: Option<String>,
    #[serde(default)]
    pub sort_order: i32,
    pub show_id: i64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct ShowClassDto {
    pub id: i64,
    pub name: String,
    pub description: String,
    pub class_number: i32,
    pub max_entries: Option<i32>,
    pub sort_order: i32,
    pub breed_category: Option<String>,
    pub finish_type: Option<String>,
    pub performance_type: Option<String>,
    pub collectibility_type: Option<String>,
    pub gender_restriction: Option<String>,
    pub age_restriction: Option<String>,
    pub color_restriction: Option<String>,
    pub scale_restriction: Option<String>,
    pub division_id: i64,
    #[serde(default)]
    pub division_name: String,
    pub show_id: i64,
    #[serde(default)]
    pub show_name: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: Option<DateTime<Utc>>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct ShowClassRequest {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<i64>,
    pub name: String,
    #[serde(default)]
    pub description: String,
    pub class_number: i32,
    /// Absent means the default capacity; explicit null means unlimited
    #[serde(default = "default_max_entries")]
    pub max_entries: Option<i32>,
    #[serde(default)]
    pub sort_order: i32,
    #[serde(default)]
    pub breed_category: Option<String>,
    #[serde(default)]
    pub finish_type: Option<String>,
    #[serde(default)]
    pub performance_type: Option<String>,
    #[serde(default)]
    pub collectibility_type: Option<String>,
    #[serde(default)]
    pub gender_restriction: Option<String>,
    #[serde(default)]
    pub age_restriction: Option<String>,
    #[serde(default)]
    pub color_restriction: Option<String>,
    #[serde(default)]
    pub scale_restriction: Option<String>,
    pub division_id: i64,
    pub show_id: i64,
}

/// Default per-class entry capacity
pub const DEFAULT_MAX_ENTRIES: i32 = 3;

fn default_max_entries() -> Option<i32> {
    Some(DEFAULT_MAX_ENTRIES)
}

// ============================================================================
// Entries and results
// ============================================================================

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct EntryDto {
    pub id: i64,
    pub entry_number: i32,
    pub submission_date: DateTime<Utc>,
    pub status: String,
    pub user_model_object_id: i64,
    #[serde(default)]
    pub horse_name: String,
    pub show_class_id: i64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub result: Option<ResultDto>,
    pub created_at: DateTime<Utc>,
    pub updated_at: Option<DateTime<Utc>>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct EntryRequest {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<i64>,
    pub entry_number: i32,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub submission_date: Option<DateTime<Utc>>,
    /// Submitted, Accepted or Rejected
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub status: Option<String>,
    pub user_model_object_id: i64,
    pub show_class_id: i64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct ResultDto {
    pub id: i64,
    pub placement: i32,
    pub comments: String,
    pub judged_date: DateTime<Utc>,
    pub entry_id: i64,
    pub created_at: DateTime<Utc>,
    pub updated_at: Option<DateTime<Utc>>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct ResultRequest {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<i64>,
    pub placement: i32,
    #[serde(default)]
    pub comments: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub judged_date: Option<DateTime<Utc>>,
    pub entry_id: i64,
}

// ============================================================================
// Horses
// ============================================================================

/// A competitor's model horse
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct UserModelObjectDto {
    pub id: i64,
    #[serde(rename = "twEntryId")]
    pub tw_entry_id: Option<i32>,
    pub name: String,
    pub description: String,
    pub application_user_id: Option<String>,
    pub color: String,
    pub size: String,
    pub class: String,
    pub breed: String,
    pub notes: String,
    /// Base64-encoded image bytes
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub hero_shot_image: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: Option<DateTime<Utc>>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct UserModelObjectRequest {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<i64>,
    #[serde(rename = "twEntryId", default, skip_serializing_if = "Option::is_none")]
    pub tw_entry_id: Option<i32>,
    pub name: String,
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub color: String,
    #[serde(default)]
    pub size: String,
    #[serde(default)]
    pub class: String,
    #[serde(default)]
    pub breed: String,
    #[serde(default)]
    pub notes: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub hero_shot_image: Option<String>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_login_response_wire_names() {
        let json = r#"{
            "tokenType": "Bearer",
            "accessToken": "abc",
            "expiresIn": 3600,
            "refreshToken": "def",
            "userId": "u-1",
            "roles": ["User"]
        }"#;
        let resp: LoginResponse = serde_json::from_str(json).unwrap();
        assert_eq!(resp.token_type, "Bearer");
        assert_eq!(resp.expires_in, 3600);
        assert_eq!(resp.roles, Some(vec!["User".to_string()]));
    }

    #[test]
    fn test_login_response_without_user_fields() {
        let json = r#"{"tokenType":"Bearer","accessToken":"a","expiresIn":10,"refreshToken":"r"}"#;
        let resp: LoginResponse = serde_json::from_str(json).unwrap();
        assert!(resp.user_id.is_empty());
        assert!(resp.roles.is_none());
    }

    #[test]
    fn test_show_class_request_capacity_defaults() {
        let absent: ShowClassRequest = serde_json::from_str(
            r#"{"name":"Arabian Halter","classNumber":101,"divisionId":1,"showId":1}"#,
        )
        .unwrap();
        assert_eq!(absent.max_entries, Some(DEFAULT_MAX_ENTRIES));

        let unlimited: ShowClassRequest = serde_json::from_str(
            r#"{"name":"Open","classNumber":102,"maxEntries":null,"divisionId":1,"showId":1}"#,
        )
        .unwrap();
        assert_eq!(unlimited.max_entries, None);
    }

    #[test]
    fn test_horse_request_uses_tw_entry_id_name() {
        let req = UserModelObjectRequest {
            name: "Midnight".to_string(),
            tw_entry_id: Some(42),
            ..Default::default()
        };
        let json = serde_json::to_value(&req).unwrap();
        assert_eq!(json["twEntryId"], 42);
        assert!(json.get("heroShotImage").is_none());
    }

    #[test]
    fn test_known_roles_case_insensitive() {
        assert!(roles::is_known("admin"));
        assert!(roles::is_known("ShowHolder"));
        assert!(!roles::is_known("Owner"));
    }
}
