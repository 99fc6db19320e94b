//! Division Repository

use std::collections::HashMap;

use chrono::Utc;
use sqlx::sqlite::SqliteRow;
use sqlx::{Row, SqlitePool};

use crate::domain::Division;
use crate::error::Result;
use crate::repository::named_column;
use crate::repository::show_class::{load_classes_for_division, load_classes_for_show};

const SELECT_DIVISION: &str = r#"
    SELECT id, name, description, division_type, sort_order, show_id,
           created_at, updated_at, is_deleted
    FROM divisions
    WHERE is_deleted = 0
"#;

pub struct DivisionRepository {
    pool: SqlitePool,
}

impl DivisionRepository {
    pub fn new(pool: &SqlitePool) -> Self {
        Self { pool: pool.clone() }
    }

    pub async fn insert(&self, division: &Division) -> Result<i64> {
        let result = sqlx::query(
            r#"
            INSERT INTO divisions (name, description, division_type, sort_order, show_id, created_at, is_deleted)
            VALUES (?, ?, ?, ?, ?, ?, 0)
            "#,
        )
        .bind(&division.name)
        .bind(&division.description)
        .bind(division.division_type.as_str())
        .bind(division.sort_order)
        .bind(division.show_id)
        .bind(division.created_at)
        .execute(&self.pool)
        .await?;

        Ok(result.last_insert_rowid())
    }

    /// Division with its classes
    pub async fn find_by_id(&self, id: i64) -> Result<Option<Division>> {
        let sql = format!("{} AND id = ?", SELECT_DIVISION);
        let row = sqlx::query(&sql)
            .bind(id)
            .fetch_optional(&self.pool)
            .await?;

        let Some(mut division) = row.as_ref().map(map_division).transpose()? else {
            return Ok(None);
        };
        division.classes = load_classes_for_division(&self.pool, division.id).await?;
        Ok(Some(division))
    }

    pub async fn find_by_name(&self, name: &str) -> Result<Option<Division>> {
        let sql = format!("{} AND name = ? ORDER BY id LIMIT 1", SELECT_DIVISION);
        let row = sqlx::query(&sql)
            .bind(name)
            .fetch_optional(&self.pool)
            .await?;
        row.as_ref().map(map_division).transpose()
    }

    /// Divisions of a show ordered by sort order then name, classes included
    pub async fn find_by_show_id(&self, show_id: i64) -> Result<Vec<Division>> {
        load_divisions_for_show(&self.pool, show_id).await
    }

    pub async fn exists(&self, id: i64) -> Result<bool> {
        let count: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM divisions WHERE id = ? AND is_deleted = 0")
            .bind(id)
            .fetch_one(&self.pool)
            .await?;
        Ok(count > 0)
    }

    pub async fn update(&self, division: &Division) -> Result<bool> {
        let result = sqlx::query(
            r#"
            UPDATE divisions SET
                name = ?, description = ?, division_type = ?, sort_order = ?, show_id = ?, updated_at = ?
            WHERE id = ? AND is_deleted = 0
            "#,
        )
        .bind(&division.name)
        .bind(&division.description)
        .bind(division.division_type.as_str())
        .bind(division.sort_order)
        .bind(division.show_id)
        .bind(division.updated_at.unwrap_or_else(Utc::now))
        .bind(division.id)
        .execute(&self.pool)
        .await?;

        Ok(result.rows_affected() > 0)
    }

    pub async fn soft_delete(&self, id: i64) -> Result<bool> {
        let result = sqlx::query("UPDATE divisions SET is_deleted = 1, updated_at = ? WHERE id = ? AND is_deleted = 0")
            .bind(Utc::now())
            .bind(id)
            .execute(&self.pool)
            .await?;
        Ok(result.rows_affected() > 0)
    }
}

pub(crate) async fn load_divisions_for_show(pool: &SqlitePool, show_id: i64) -> Result<Vec<Division>> {
    let sql = format!("{} AND show_id = ? ORDER BY sort_order, name", SELECT_DIVISION);
    let rows = sqlx::query(&sql).bind(show_id).fetch_all(pool).await?;
    let mut divisions = rows.iter().map(map_division).collect::<Result<Vec<_>>>()?;

    let mut by_division: HashMap<i64, Vec<_>> = HashMap::new();
    for class in load_classes_for_show(pool, show_id).await? {
        by_division.entry(class.division_id).or_default().push(class);
    }
    for division in &mut divisions {
        division.classes = by_division.remove(&division.id).unwrap_or_default();
    }

    Ok(divisions)
}

fn map_division(row: &SqliteRow) -> Result<Division> {
    Ok(Division {
        id: row.try_get("id")?,
        name: row.try_get("name")?,
        description: row.try_get("description")?,
        division_type: named_column(row, "division_type")?,
        sort_order: row.try_get("sort_order")?,
        show_id: row.try_get("show_id")?,
        classes: Vec::new(),
        created_at: row.try_get("created_at")?,
        updated_at: row.try_get("updated_at")?,
        is_deleted: row.try_get("is_deleted")?,
    })
}
