//! Show Repository

use chrono::Utc;
use sqlx::sqlite::SqliteRow;
use sqlx::{Row, SqlitePool};

use crate::domain::{Division, Show};
use crate::error::Result;
use crate::repository::named_column;
use crate::repository::division::load_divisions_for_show;

const SELECT_SHOW: &str = r#"
    SELECT s.id, s.name, s.description, s.show_date, s.end_date, s.status, s.judge_id,
           s.show_holder_id, s.is_active, s.entry_deadline, s.judging_deadline,
           s.results_published_at, s.max_entries_per_user, s.show_type, s.show_format,
           s.is_private, s.allow_member_only_entries, s.is_nan_qualifying,
           s.namhsa_guidelines, s.additional_metadata, s.created_at, s.updated_at, s.is_deleted,
           u.first_name AS judge_first_name, u.last_name AS judge_last_name, u.email AS judge_email,
           h.name AS show_holder_name
    FROM shows s
    LEFT JOIN users u ON u.id = s.judge_id
    LEFT JOIN user_model_objects h ON h.id = s.show_holder_id
    WHERE s.is_deleted = 0
"#;

pub struct ShowRepository {
    pool: SqlitePool,
}

impl ShowRepository {
    pub fn new(pool: &SqlitePool) -> Self {
        Self { pool: pool.clone() }
    }

    pub async fn insert(&self, show: &Show) -> Result<i64> {
        let result = sqlx::query(
            r#"
            INSERT INTO shows (
                name, description, show_date, end_date, status, judge_id, show_holder_id,
                is_active, entry_deadline, judging_deadline, results_published_at,
                max_entries_per_user, show_type, show_format, is_private,
                allow_member_only_entries, is_nan_qualifying, namhsa_guidelines,
                additional_metadata, created_at, updated_at, is_deleted
            ) VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, NULL, 0)
            "#,
        )
        .bind(&show.name)
        .bind(&show.description)
        .bind(show.show_date)
        .bind(show.end_date)
        .bind(show.status.as_str())
        .bind(&show.judge_id)
        .bind(show.show_holder_id)
        .bind(show.is_active)
        .bind(show.entry_deadline)
        .bind(show.judging_deadline)
        .bind(show.results_published_at)
        .bind(show.max_entries_per_user)
        .bind(show.show_type.as_str())
        .bind(show.show_format.as_str())
        .bind(show.is_private)
        .bind(show.allow_member_only_entries)
        .bind(show.is_nan_qualifying)
        .bind(&show.namhsa_guidelines)
        .bind(&show.additional_metadata)
        .bind(show.created_at)
        .execute(&self.pool)
        .await?;

        Ok(result.last_insert_rowid())
    }

    pub async fn find_by_id(&self, id: i64) -> Result<Option<Show>> {
        let sql = format!("{} AND s.id = ?", SELECT_SHOW);
        let row = sqlx::query(&sql)
            .bind(id)
            .fetch_optional(&self.pool)
            .await?;
        row.as_ref().map(map_show).transpose()
    }

    pub async fn find_all(&self) -> Result<Vec<Show>> {
        let sql = format!("{} ORDER BY s.show_date, s.name", SELECT_SHOW);
        let rows = sqlx::query(&sql).fetch_all(&self.pool).await?;
        rows.iter().map(map_show).collect()
    }

    pub async fn find_by_judge_id(&self, judge_id: &str) -> Result<Vec<Show>> {
        let sql = format!("{} AND s.judge_id = ? ORDER BY s.show_date, s.name", SELECT_SHOW);
        let rows = sqlx::query(&sql)
            .bind(judge_id)
            .fetch_all(&self.pool)
            .await?;
        rows.iter().map(map_show).collect()
    }

    pub async fn find_by_name(&self, name: &str) -> Result<Option<Show>> {
        let sql = format!("{} AND s.name = ? ORDER BY s.id LIMIT 1", SELECT_SHOW);
        let row = sqlx::query(&sql)
            .bind(name)
            .fetch_optional(&self.pool)
            .await?;
        row.as_ref().map(map_show).transpose()
    }

    /// Shows whose show-holder record belongs to `user_id`
    pub async fn find_by_show_holder_user_id(&self, user_id: &str) -> Result<Vec<Show>> {
        let sql = format!(
            "{} AND h.application_user_id = ? AND h.is_deleted = 0 ORDER BY s.show_date, s.name",
            SELECT_SHOW
        );
        let rows = sqlx::query(&sql)
            .bind(user_id)
            .fetch_all(&self.pool)
            .await?;
        rows.iter().map(map_show).collect()
    }

    /// Load a show together with its divisions and their classes.
    pub async fn find_with_divisions(&self, id: i64) -> Result<Option<(Show, Vec<Division>)>> {
        let Some(show) = self.find_by_id(id).await? else {
            return Ok(None);
        };
        let divisions = load_divisions_for_show(&self.pool, id).await?;
        Ok(Some((show, divisions)))
    }

    pub async fn exists(&self, id: i64) -> Result<bool> {
        let count: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM shows WHERE id = ? AND is_deleted = 0")
            .bind(id)
            .fetch_one(&self.pool)
            .await?;
        Ok(count > 0)
    }

    pub async fn update(&self, show: &Show) -> Result<bool> {
        let result = sqlx::query(
            r#"
            UPDATE shows SET
                name = ?, description = ?, show_date = ?, end_date = ?, status = ?,
                judge_id = ?, show_holder_id = ?, is_active = ?, entry_deadline = ?,
                judging_deadline = ?, results_published_at = ?, max_entries_per_user = ?,
                show_type = ?, show_format = ?, is_private = ?, allow_member_only_entries = ?,
                is_nan_qualifying = ?, namhsa_guidelines = ?, additional_metadata = ?,
                updated_at = ?
            WHERE id = ? AND is_deleted = 0
            "#,
        )
        .bind(&show.name)
        .bind(&show.description)
        .bind(show.show_date)
        .bind(show.end_date)
        .bind(show.status.as_str())
        .bind(&show.judge_id)
        .bind(show.show_holder_id)
        .bind(show.is_active)
        .bind(show.entry_deadline)
        .bind(show.judging_deadline)
        .bind(show.results_published_at)
        .bind(show.max_entries_per_user)
        .bind(show.show_type.as_str())
        .bind(show.show_format.as_str())
        .bind(show.is_private)
        .bind(show.allow_member_only_entries)
        .bind(show.is_nan_qualifying)
        .bind(&show.namhsa_guidelines)
        .bind(&show.additional_metadata)
        .bind(show.updated_at.unwrap_or_else(Utc::now))
        .bind(show.id)
        .execute(&self.pool)
        .await?;

        Ok(result.rows_affected() > 0)
    }

    pub async fn soft_delete(&self, id: i64) -> Result<bool> {
        let result = sqlx::query("UPDATE shows SET is_deleted = 1, updated_at = ? WHERE id = ? AND is_deleted = 0")
            .bind(Utc::now())
            .bind(id)
            .execute(&self.pool)
            .await?;
        Ok(result.rows_affected() > 0)
    }
}

fn map_show(row: &SqliteRow) -> Result<Show> {
    let judge_first: Option<String> = row.try_get("judge_first_name")?;
    let judge_last: Option<String> = row.try_get("judge_last_name")?;
    let judge_email: Option<String> = row.try_get("judge_email")?;
    let judge_name = judge_display_name(judge_first, judge_last, judge_email);

    Ok(Show {
        id: row.try_get("id")?,
        name: row.try_get("name")?,
        description: row.try_get("description")?,
        show_date: row.try_get("show_date")?,
        end_date: row.try_get("end_date")?,
        status: named_column(row, "status")?,
        judge_id: row.try_get("judge_id")?,
        show_holder_id: row.try_get("show_holder_id")?,
        is_active: row.try_get("is_active")?,
        entry_deadline: row.try_get("entry_deadline")?,
        judging_deadline: row.try_get("judging_deadline")?,
        results_published_at: row.try_get("results_published_at")?,
        max_entries_per_user: row.try_get("max_entries_per_user")?,
        show_type: named_column(row, "show_type")?,
        show_format: named_column(row, "show_format")?,
        is_private: row.try_get("is_private")?,
        allow_member_only_entries: row.try_get("allow_member_only_entries")?,
        is_nan_qualifying: row.try_get("is_nan_qualifying")?,
        namhsa_guidelines: row.try_get("namhsa_guidelines")?,
        additional_metadata: row.try_get("additional_metadata")?,
        judge_name,
        show_holder_name: row.try_get("show_holder_name")?,
        created_at: row.try_get("created_at")?,
        updated_at: row.try_get("updated_at")?,
        is_deleted: row.try_get("is_deleted")?,
    })
}

fn judge_display_name(
    first: Option<String>,
    last: Option<String>,
    email: Option<String>,
) -> Option<String> {
    let name = [first, last]
        .into_iter()
        .flatten()
        .filter(|s| !s.trim().is_empty())
        .collect::<Vec<_>>()
        .join(" ");
    if name.is_empty() {
        email
    } else {
        Some(name)
    }
}
