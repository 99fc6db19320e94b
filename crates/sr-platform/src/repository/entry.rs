//! Entry Repository

use chrono::Utc;
use sqlx::sqlite::SqliteRow;
use sqlx::{Row, SqlitePool};

use crate::domain::{Entry, ShowResult};
use crate::error::Result;
use crate::repository::named_column;

const SELECT_ENTRY: &str = r#"
    SELECT e.id, e.entry_number, e.submission_date, e.status, e.user_model_object_id,
           e.show_class_id, e.created_at, e.updated_at, e.is_deleted,
           h.name AS horse_name,
           r.id AS result_id, r.placement AS result_placement, r.comments AS result_comments,
           r.judged_date AS result_judged_date, r.created_at AS result_created_at,
           r.updated_at AS result_updated_at
    FROM entries e
    LEFT JOIN user_model_objects h ON h.id = e.user_model_object_id
    LEFT JOIN results r ON r.entry_id = e.id AND r.is_deleted = 0
    WHERE e.is_deleted = 0
"#;

pub struct EntryRepository {
    pool: SqlitePool,
}

impl EntryRepository {
    pub fn new(pool: &SqlitePool) -> Self {
        Self { pool: pool.clone() }
    }

    /// Insert only while the class holds fewer than `max_entries` live entries.
    ///
    /// The count and the insert run as one statement, so concurrent callers
    /// cannot overfill the class. Returns `None` when the class is full.
    pub async fn insert_within_capacity(&self, entry: &Entry, max_entries: Option<i32>) -> Result<Option<i64>> {
        let result = sqlx::query(
            r#"
            INSERT INTO entries (
                entry_number, submission_date, status, user_model_object_id, show_class_id,
                created_at, is_deleted
            )
            SELECT ?, ?, ?, ?, ?, ?, 0
            WHERE ? IS NULL
               OR (SELECT COUNT(*) FROM entries WHERE show_class_id = ? AND is_deleted = 0) < ?
            "#,
        )
        .bind(entry.entry_number)
        .bind(entry.submission_date)
        .bind(entry.status.as_str())
        .bind(entry.user_model_object_id)
        .bind(entry.show_class_id)
        .bind(entry.created_at)
        .bind(max_entries)
        .bind(entry.show_class_id)
        .bind(max_entries)
        .execute(&self.pool)
        .await?;

        if result.rows_affected() == 0 {
            return Ok(None);
        }
        Ok(Some(result.last_insert_rowid()))
    }

    /// Entry with its result, if judged
    pub async fn find_by_id(&self, id: i64) -> Result<Option<Entry>> {
        let sql = format!("{} AND e.id = ?", SELECT_ENTRY);
        let row = sqlx::query(&sql)
            .bind(id)
            .fetch_optional(&self.pool)
            .await?;
        row.as_ref().map(map_entry).transpose()
    }

    pub async fn find_by_show_class_id(&self, show_class_id: i64) -> Result<Vec<Entry>> {
        let sql = format!("{} AND e.show_class_id = ? ORDER BY e.entry_number", SELECT_ENTRY);
        let rows = sqlx::query(&sql)
            .bind(show_class_id)
            .fetch_all(&self.pool)
            .await?;
        rows.iter().map(map_entry).collect()
    }

    pub async fn find_by_user_model_object_id(&self, user_model_object_id: i64) -> Result<Vec<Entry>> {
        let sql = format!("{} AND e.user_model_object_id = ? ORDER BY e.submission_date", SELECT_ENTRY);
        let rows = sqlx::query(&sql)
            .bind(user_model_object_id)
            .fetch_all(&self.pool)
            .await?;
        rows.iter().map(map_entry).collect()
    }

    /// Live entries in `show_id` whose horse belongs to `user_id`, not counting `excluding`
    pub async fn count_for_owner_in_show(
        &self,
        user_id: &str,
        show_id: i64,
        excluding: Option<i64>,
    ) -> Result<i64> {
        let count: i64 = sqlx::query_scalar(
            r#"
            SELECT COUNT(*)
            FROM entries e
            JOIN show_classes c ON c.id = e.show_class_id
            JOIN user_model_objects h ON h.id = e.user_model_object_id
            WHERE e.is_deleted = 0 AND c.show_id = ? AND h.application_user_id = ? AND e.id IS NOT ?
            "#,
        )
        .bind(show_id)
        .bind(user_id)
        .bind(excluding)
        .fetch_one(&self.pool)
        .await?;
        Ok(count)
    }

    pub async fn update(&self, entry: &Entry) -> Result<bool> {
        let result = sqlx::query(
            r#"
            UPDATE entries SET
                entry_number = ?, submission_date = ?, status = ?, user_model_object_id = ?,
                show_class_id = ?, updated_at = ?
            WHERE id = ? AND is_deleted = 0
            "#,
        )
        .bind(entry.entry_number)
        .bind(entry.submission_date)
        .bind(entry.status.as_str())
        .bind(entry.user_model_object_id)
        .bind(entry.show_class_id)
        .bind(entry.updated_at.unwrap_or_else(Utc::now))
        .bind(entry.id)
        .execute(&self.pool)
        .await?;

        Ok(result.rows_affected() > 0)
    }

    pub async fn soft_delete(&self, id: i64) -> Result<bool> {
        let result = sqlx::query("UPDATE entries SET is_deleted = 1, updated_at = ? WHERE id = ? AND is_deleted = 0")
            .bind(Utc::now())
            .bind(id)
            .execute(&self.pool)
            .await?;
        Ok(result.rows_affected() > 0)
    }
}

fn map_entry(row: &SqliteRow) -> Result<Entry> {
    let id: i64 = row.try_get("id")?;
    let result_id: Option<i64> = row.try_get("result_id")?;

    let result = match result_id {
        Some(result_id) => Some(ShowResult {
            id: result_id,
            placement: row.try_get("result_placement")?,
            comments: row.try_get("result_comments")?,
            judged_date: row.try_get("result_judged_date")?,
            entry_id: id,
            created_at: row.try_get("result_created_at")?,
            updated_at: row.try_get("result_updated_at")?,
            is_deleted: false,
        }),
        None => None,
    };

    Ok(Entry {
        id,
        entry_number: row.try_get("entry_number")?,
        submission_date: row.try_get("submission_date")?,
        status: named_column(row, "status")?,
        user_model_object_id: row.try_get("user_model_object_id")?,
        show_class_id: row.try_get("show_class_id")?,
        horse_name: row.try_get("horse_name")?,
        result,
        created_at: row.try_get("created_at")?,
        updated_at: row.try_get("updated_at")?,
        is_deleted: row.try_get("is_deleted")?,
    })
}
