//! Show Class Repository

use chrono::Utc;
use sqlx::sqlite::SqliteRow;
use sqlx::{Row, SqlitePool};

use crate::domain::ShowClass;
use crate::error::Result;

const SELECT_CLASS: &str = r#"
    SELECT c.id, c.name, c.description, c.class_number, c.max_entries, c.sort_order,
           c.breed_category, c.finish_type, c.performance_type, c.collectibility_type,
           c.gender_restriction, c.age_restriction, c.color_restriction, c.scale_restriction,
           c.division_id, c.show_id, c.created_at, c.updated_at, c.is_deleted,
           d.name AS division_name, s.name AS show_name
    FROM show_classes c
    LEFT JOIN divisions d ON d.id = c.division_id
    LEFT JOIN shows s ON s.id = c.show_id
    WHERE c.is_deleted = 0
"#;

const CLASS_ORDER: &str = "ORDER BY c.sort_order, c.class_number";

pub struct ShowClassRepository {
    pool: SqlitePool,
}

impl ShowClassRepository {
    pub fn new(pool: &SqlitePool) -> Self {
        Self { pool: pool.clone() }
    }

    pub async fn insert(&self, class: &ShowClass) -> Result<i64> {
        let result = sqlx::query(
            r#"
            INSERT INTO show_classes (
                name, description, class_number, max_entries, sort_order,
                breed_category, finish_type, performance_type, collectibility_type,
                gender_restriction, age_restriction, color_restriction, scale_restriction,
                division_id, show_id, created_at, is_deleted
            ) VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, 0)
            "#,
        )
        .bind(&class.name)
        .bind(&class.description)
        .bind(class.class_number)
        .bind(class.max_entries)
        .bind(class.sort_order)
        .bind(class.breed_category.map(|v| v.as_str()))
        .bind(class.finish_type.map(|v| v.as_str()))
        .bind(class.performance_type.map(|v| v.as_str()))
        .bind(class.collectibility_type.map(|v| v.as_str()))
        .bind(class.gender_restriction.map(|v| v.as_str()))
        .bind(class.age_restriction.map(|v| v.as_str()))
        .bind(class.color_restriction.map(|v| v.as_str()))
        .bind(class.scale_restriction.map(|v| v.as_str()))
        .bind(class.division_id)
        .bind(class.show_id)
        .bind(class.created_at)
        .execute(&self.pool)
        .await?;

        Ok(result.last_insert_rowid())
    }

    pub async fn find_by_id(&self, id: i64) -> Result<Option<ShowClass>> {
        let sql = format!("{} AND c.id = ?", SELECT_CLASS);
        let row = sqlx::query(&sql)
            .bind(id)
            .fetch_optional(&self.pool)
            .await?;
        row.as_ref().map(map_class).transpose()
    }

    pub async fn find_by_show_id(&self, show_id: i64) -> Result<Vec<ShowClass>> {
        load_classes_for_show(&self.pool, show_id).await
    }

    pub async fn find_by_division_id(&self, division_id: i64) -> Result<Vec<ShowClass>> {
        load_classes_for_division(&self.pool, division_id).await
    }

    /// Live entries currently in the class, not counting `excluding`
    pub async fn count_entries(&self, class_id: i64, excluding: Option<i64>) -> Result<i64> {
        let count: i64 = sqlx::query_scalar(
            "SELECT COUNT(*) FROM entries WHERE show_class_id = ? AND is_deleted = 0 AND id IS NOT ?",
        )
        .bind(class_id)
        .bind(excluding)
        .fetch_one(&self.pool)
        .await?;
        Ok(count)
    }

    pub async fn update(&self, class: &ShowClass) -> Result<bool> {
        let result = sqlx::query(
            r#"
            UPDATE show_classes SET
                name = ?, description = ?, class_number = ?, max_entries = ?, sort_order = ?,
                breed_category = ?, finish_type = ?, performance_type = ?, collectibility_type = ?,
                gender_restriction = ?, age_restriction = ?, color_restriction = ?,
                scale_restriction = ?, division_id = ?, show_id = ?, updated_at = ?
            WHERE id = ? AND is_deleted = 0
            "#,
        )
        .bind(&class.name)
        .bind(&class.description)
        .bind(class.class_number)
        .bind(class.max_entries)
        .bind(class.sort_order)
        .bind(class.breed_category.map(|v| v.as_str()))
        .bind(class.finish_type.map(|v| v.as_str()))
        .bind(class.performance_type.map(|v| v.as_str()))
        .bind(class.collectibility_type.map(|v| v.as_str()))
        .bind(class.gender_restriction.map(|v| v.as_str()))
        .bind(class.age_restriction.map(|v| v.as_str()))
        .bind(class.color_restriction.map(|v| v.as_str()))
        .bind(class.scale_restriction.map(|v| v.as_str()))
        .bind(class.division_id)
        .bind(class.show_id)
        .bind(class.updated_at.unwrap_or_else(Utc::now))
        .bind(class.id)
        .execute(&self.pool)
        .await?;

        Ok(result.rows_affected() > 0)
    }

    pub async fn soft_delete(&self, id: i64) -> Result<bool> {
        let result = sqlx::query("UPDATE show_classes SET is_deleted = 1, updated_at = ? WHERE id = ? AND is_deleted = 0")
            .bind(Utc::now())
            .bind(id)
            .execute(&self.pool)
            .await?;
        Ok(result.rows_affected() > 0)
    }
}

pub(crate) async fn load_classes_for_show(pool: &SqlitePool, show_id: i64) -> Result<Vec<ShowClass>> {
    let sql = format!("{} AND c.show_id = ? {}", SELECT_CLASS, CLASS_ORDER);
    let rows = sqlx::query(&sql).bind(show_id).fetch_all(pool).await?;
    rows.iter().map(map_class).collect()
}

pub(crate) async fn load_classes_for_division(pool: &SqlitePool, division_id: i64) -> Result<Vec<ShowClass>> {
    let sql = format!("{} AND c.division_id = ? {}", SELECT_CLASS, CLASS_ORDER);
    let rows = sqlx::query(&sql).bind(division_id).fetch_all(pool).await?;
    rows.iter().map(map_class).collect()
}

fn optional_enum<T: std::str::FromStr>(row: &SqliteRow, column: &str) -> Result<Option<T>> {
    let raw: Option<String> = row.try_get(column)?;
    Ok(raw.and_then(|v| v.parse().ok()))
}

fn map_class(row: &SqliteRow) -> Result<ShowClass> {
    Ok(ShowClass {
        id: row.try_get("id")?,
        name: row.try_get("name")?,
        description: row.try_get("description")?,
        class_number: row.try_get("class_number")?,
        max_entries: row.try_get("max_entries")?,
        sort_order: row.try_get("sort_order")?,
        breed_category: optional_enum(row, "breed_category")?,
        finish_type: optional_enum(row, "finish_type")?,
        performance_type: optional_enum(row, "performance_type")?,
        collectibility_type: optional_enum(row, "collectibility_type")?,
        gender_restriction: optional_enum(row, "gender_restriction")?,
        age_restriction: optional_enum(row, "age_restriction")?,
        color_restriction: optional_enum(row, "color_restriction")?,
        scale_restriction: optional_enum(row, "scale_restriction")?,
        division_id: row.try_get("division_id")?,
        show_id: row.try_get("show_id")?,
        division_name: row.try_get("division_name")?,
        show_name: row.try_get("show_name")?,
        created_at: row.try_get("created_at")?,
        updated_at: row.try_get("updated_at")?,
        is_deleted: row.try_get("is_deleted")?,
    })
}
