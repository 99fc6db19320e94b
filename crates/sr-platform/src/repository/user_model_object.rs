//! Model Horse Repository

use chrono::Utc;
use sqlx::sqlite::SqliteRow;
use sqlx::{Row, SqlitePool};

use crate::domain::UserModelObject;
use crate::error::Result;

const SELECT_HORSE: &str = r#"
    SELECT id, tw_entry_id, name, description, application_user_id, color, size, class,
           breed, notes, hero_shot_image, created_at, updated_at, is_deleted
    FROM user_model_objects
    WHERE is_deleted = 0
"#;

pub struct UserModelObjectRepository {
    pool: SqlitePool,
}

impl UserModelObjectRepository {
    pub fn new(pool: &SqlitePool) -> Self {
        Self { pool: pool.clone() }
    }

    pub async fn insert(&self, horse: &UserModelObject) -> Result<i64> {
        let result = sqlx::query(
            r#"
            INSERT INTO user_model_objects (
                tw_entry_id, name, description, application_user_id, color, size, class,
                breed, notes, hero_shot_image, created_at, is_deleted
            ) VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, 0)
            "#,
        )
        .bind(horse.tw_entry_id)
        .bind(&horse.name)
        .bind(&horse.description)
        .bind(&horse.application_user_id)
        .bind(&horse.color)
        .bind(&horse.size)
        .bind(&horse.class)
        .bind(&horse.breed)
        .bind(&horse.notes)
        .bind(&horse.hero_shot_image)
        .bind(horse.created_at)
        .execute(&self.pool)
        .await?;

        Ok(result.last_insert_rowid())
    }

    pub async fn find_by_id(&self, id: i64) -> Result<Option<UserModelObject>> {
        let sql = format!("{} AND id = ?", SELECT_HORSE);
        let row = sqlx::query(&sql)
            .bind(id)
            .fetch_optional(&self.pool)
            .await?;
        row.as_ref().map(map_horse).transpose()
    }

    /// Horses owned by an application user
    pub async fn find_by_user(&self, application_user_id: &str) -> Result<Vec<UserModelObject>> {
        let sql = format!("{} AND application_user_id = ? ORDER BY name", SELECT_HORSE);
        let rows = sqlx::query(&sql)
            .bind(application_user_id)
            .fetch_all(&self.pool)
            .await?;
        rows.iter().map(map_horse).collect()
    }

    pub async fn find_by_name(&self, name: &str) -> Result<Option<UserModelObject>> {
        let sql = format!("{} AND name = ? ORDER BY id LIMIT 1", SELECT_HORSE);
        let row = sqlx::query(&sql)
            .bind(name)
            .fetch_optional(&self.pool)
            .await?;
        row.as_ref().map(map_horse).transpose()
    }

    pub async fn update(&self, horse: &UserModelObject) -> Result<bool> {
        let result = sqlx::query(
            r#"
            UPDATE user_model_objects SET
                tw_entry_id = ?, name = ?, description = ?, application_user_id = ?, color = ?,
                size = ?, class = ?, breed = ?, notes = ?, hero_shot_image = ?, updated_at = ?
            WHERE id = ? AND is_deleted = 0
            "#,
        )
        .bind(horse.tw_entry_id)
        .bind(&horse.name)
        .bind(&horse.description)
        .bind(&horse.application_user_id)
        .bind(&horse.color)
        .bind(&horse.size)
        .bind(&horse.class)
        .bind(&horse.breed)
        .bind(&horse.notes)
        .bind(&horse.hero_shot_image)
        .bind(horse.updated_at.unwrap_or_else(Utc::now))
        .bind(horse.id)
        .execute(&self.pool)
        .await?;

        Ok(result.rows_affected() > 0)
    }

    pub async fn soft_delete(&self, id: i64) -> Result<bool> {
        let result = sqlx::query("UPDATE user_model_objects SET is_deleted = 1, updated_at = ? WHERE id = ? AND is_deleted = 0")
            .bind(Utc::now())
            .bind(id)
            .execute(&self.pool)
            .await?;
        Ok(result.rows_affected() > 0)
    }
}

fn map_horse(row: &SqliteRow) -> Result<UserModelObject> {
    Ok(UserModelObject {
        id: row.try_get("id")?,
        tw_entry_id: row.try_get("tw_entry_id")?,
        name: row.try_get("name")?,
        description: row.try_get("description")?,
        application_user_id: row.try_get("application_user_id")?,
        color: row.try_get("color")?,
        size: row.try_get("size")?,
        class: row.try_get("class")?,
        breed: row.try_get("breed")?,
        notes: row.try_get("notes")?,
        hero_shot_image: row.try_get("hero_shot_image")?,
        created_at: row.try_get("created_at")?,
        updated_at: row.try_get("updated_at")?,
        is_deleted: row.try_get("is_deleted")?,
    })
}
