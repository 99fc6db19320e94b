//! Result Repository

use chrono::Utc;
use sqlx::sqlite::SqliteRow;
use sqlx::{Row, SqlitePool};

use crate::domain::ShowResult;
use crate::error::{PlatformError, Result};

const SELECT_RESULT: &str = r#"
    SELECT id, placement, comments, judged_date, entry_id, created_at, updated_at, is_deleted
    FROM results
    WHERE is_deleted = 0
"#;

pub struct ResultRepository {
    pool: SqlitePool,
}

impl ResultRepository {
    pub fn new(pool: &SqlitePool) -> Self {
        Self { pool: pool.clone() }
    }

    pub async fn insert(&self, result: &ShowResult) -> Result<i64> {
        let done = sqlx::query(
            r#"
            INSERT INTO results (placement, comments, judged_date, entry_id, created_at, is_deleted)
            VALUES (?, ?, ?, ?, ?, 0)
            "#,
        )
        .bind(result.placement)
        .bind(&result.comments)
        .bind(result.judged_date)
        .bind(result.entry_id)
        .bind(result.created_at)
        .execute(&self.pool)
        .await
        .map_err(|e| duplicate_entry(e, result.entry_id))?;

        Ok(done.last_insert_rowid())
    }

    pub async fn find_by_id(&self, id: i64) -> Result<Option<ShowResult>> {
        let sql = format!("{} AND id = ?", SELECT_RESULT);
        let row = sqlx::query(&sql)
            .bind(id)
            .fetch_optional(&self.pool)
            .await?;
        row.as_ref().map(map_result).transpose()
    }

    pub async fn find_by_entry_id(&self, entry_id: i64) -> Result<Option<ShowResult>> {
        let sql = format!("{} AND entry_id = ? ORDER BY id LIMIT 1", SELECT_RESULT);
        let row = sqlx::query(&sql)
            .bind(entry_id)
            .fetch_optional(&self.pool)
            .await?;
        row.as_ref().map(map_result).transpose()
    }

    pub async fn update(&self, result: &ShowResult) -> Result<bool> {
        let done = sqlx::query(
            r#"
            UPDATE results SET placement = ?, comments = ?, judged_date = ?, entry_id = ?, updated_at = ?
            WHERE id = ? AND is_deleted = 0
            "#,
        )
        .bind(result.placement)
        .bind(&result.comments)
        .bind(result.judged_date)
        .bind(result.entry_id)
        .bind(result.updated_at.unwrap_or_else(Utc::now))
        .bind(result.id)
        .execute(&self.pool)
        .await
        .map_err(|e| duplicate_entry(e, result.entry_id))?;

        Ok(done.rows_affected() > 0)
    }

    pub async fn soft_delete(&self, id: i64) -> Result<bool> {
        let done = sqlx::query("UPDATE results SET is_deleted = 1, updated_at = ? WHERE id = ? AND is_deleted = 0")
            .bind(Utc::now())
            .bind(id)
            .execute(&self.pool)
            .await?;
        Ok(done.rows_affected() > 0)
    }
}

fn duplicate_entry(e: sqlx::Error, entry_id: i64) -> PlatformError {
    match e {
        sqlx::Error::Database(ref db) if db.is_unique_violation() => {
            PlatformError::duplicate("Result", "entryId", entry_id.to_string())
        }
        other => other.into(),
    }
}

fn map_result(row: &SqliteRow) -> Result<ShowResult> {
    Ok(ShowResult {
        id: row.try_get("id")?,
        placement: row.try_get("placement")?,
        comments: row.try_get("comments")?,
        judged_date: row.try_get("judged_date")?,
        entry_id: row.try_get("entry_id")?,
        created_at: row.try_get("created_at")?,
        updated_at: row.try_get("updated_at")?,
        is_deleted: row.try_get("is_deleted")?,
    })
}
