//! Role Repository

use sqlx::sqlite::SqliteRow;
use sqlx::{Row, SqlitePool};

use crate::domain::Role;
use crate::error::{PlatformError, Result};

pub struct RoleRepository {
    pool: SqlitePool,
}

fn normalize(name: &str) -> String {
    name.trim().to_uppercase()
}

impl RoleRepository {
    pub fn new(pool: &SqlitePool) -> Self {
        Self { pool: pool.clone() }
    }

    pub async fn create(&self, name: &str) -> Result<Role> {
        let name = name.trim();
        let result = sqlx::query("INSERT INTO roles (name, normalized_name) VALUES (?, ?)")
            .bind(name)
            .bind(normalize(name))
            .execute(&self.pool)
            .await
            .map_err(|e| match e {
                sqlx::Error::Database(ref db) if db.is_unique_violation() => {
                    PlatformError::duplicate("Role", "name", name)
                }
                other => other.into(),
            })?;

        Ok(Role {
            id: result.last_insert_rowid(),
            name: name.to_string(),
        })
    }

    /// Insert the role unless it already exists. Returns true when created.
    pub async fn ensure(&self, name: &str) -> Result<bool> {
        let result = sqlx::query("INSERT OR IGNORE INTO roles (name, normalized_name) VALUES (?, ?)")
            .bind(name.trim())
            .bind(normalize(name))
            .execute(&self.pool)
            .await?;
        Ok(result.rows_affected() > 0)
    }

    pub async fn find_all(&self) -> Result<Vec<Role>> {
        let rows = sqlx::query("SELECT id, name FROM roles ORDER BY name")
            .fetch_all(&self.pool)
            .await?;
        rows.iter().map(map_role).collect()
    }

    pub async fn find_by_name(&self, name: &str) -> Result<Option<Role>> {
        let row = sqlx::query("SELECT id, name FROM roles WHERE normalized_name = ?")
            .bind(normalize(name))
            .fetch_optional(&self.pool)
            .await?;
        row.as_ref().map(map_role).transpose()
    }

    pub async fn exists(&self, name: &str) -> Result<bool> {
        let count: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM roles WHERE normalized_name = ?")
            .bind(normalize(name))
            .fetch_one(&self.pool)
            .await?;
        Ok(count > 0)
    }

    pub async fn rename(&self, old_name: &str, new_name: &str) -> Result<bool> {
        let new_name = new_name.trim();
        let result = sqlx::query("UPDATE roles SET name = ?, normalized_name = ? WHERE normalized_name = ?")
            .bind(new_name)
            .bind(normalize(new_name))
            .bind(normalize(old_name))
            .execute(&self.pool)
            .await
            .map_err(|e| match e {
                sqlx::Error::Database(ref db) if db.is_unique_violation() => {
                    PlatformError::duplicate("Role", "name", new_name)
                }
                other => other.into(),
            })?;
        Ok(result.rows_affected() > 0)
    }

    /// Delete a role; memberships go with it.
    pub async fn delete(&self, name: &str) -> Result<bool> {
        let result = sqlx::query("DELETE FROM roles WHERE normalized_name = ?")
            .bind(normalize(name))
            .execute(&self.pool)
            .await?;
        Ok(result.rows_affected() > 0)
    }
}

fn map_role(row: &SqliteRow) -> Result<Role> {
    Ok(Role {
        id: row.try_get("id")?,
        name: row.try_get("name")?,
    })
}
