//! Application User Repository

use chrono::Utc;
use sqlx::sqlite::SqliteRow;
use sqlx::{Row, SqlitePool};

use crate::domain::user::normalize_email;
use crate::domain::ApplicationUser;
use crate::error::{PlatformError, Result};

const SELECT_USER: &str = r#"
    SELECT id, user_name, email, password_hash, first_name, last_name, email_confirmed,
           lockout_end, access_failed_count, created_at, updated_at
    FROM users
"#;

pub struct UserRepository {
    pool: SqlitePool,
}

impl UserRepository {
    pub fn new(pool: &SqlitePool) -> Self {
        Self { pool: pool.clone() }
    }

    pub async fn insert(&self, user: &ApplicationUser) -> Result<()> {
        sqlx::query(
            r#"
            INSERT INTO users (
                id, user_name, email, normalized_email, password_hash, first_name, last_name,
                email_confirmed, lockout_end, access_failed_count, created_at
            ) VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?)
            "#,
        )
        .bind(&user.id)
        .bind(&user.user_name)
        .bind(&user.email)
        .bind(user.normalized_email())
        .bind(&user.password_hash)
        .bind(&user.first_name)
        .bind(&user.last_name)
        .bind(user.email_confirmed)
        .bind(user.lockout_end)
        .bind(user.access_failed_count)
        .bind(user.created_at)
        .execute(&self.pool)
        .await
        .map_err(|e| match e {
            sqlx::Error::Database(ref db) if db.is_unique_violation() => {
                PlatformError::duplicate("User", "email", &user.email)
            }
            other => other.into(),
        })?;
        Ok(())
    }

    pub async fn find_by_id(&self, id: &str) -> Result<Option<ApplicationUser>> {
        let sql = format!("{} WHERE id = ?", SELECT_USER);
        let row = sqlx::query(&sql)
            .bind(id)
            .fetch_optional(&self.pool)
            .await?;
        row.as_ref().map(map_user).transpose()
    }

    pub async fn find_by_email(&self, email: &str) -> Result<Option<ApplicationUser>> {
        let sql = format!("{} WHERE normalized_email = ?", SELECT_USER);
        let row = sqlx::query(&sql)
            .bind(normalize_email(email))
            .fetch_optional(&self.pool)
            .await?;
        row.as_ref().map(map_user).transpose()
    }

    pub async fn find_all(&self) -> Result<Vec<ApplicationUser>> {
        let sql = format!("{} ORDER BY email", SELECT_USER);
        let rows = sqlx::query(&sql).fetch_all(&self.pool).await?;
        rows.iter().map(map_user).collect()
    }

    pub async fn exists_by_email(&self, email: &str) -> Result<bool> {
        let count: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM users WHERE normalized_email = ?")
            .bind(normalize_email(email))
            .fetch_one(&self.pool)
            .await?;
        Ok(count > 0)
    }

    pub async fn update(&self, user: &ApplicationUser) -> Result<bool> {
        let result = sqlx::query(
            r#"
            UPDATE users SET
                user_name = ?, email = ?, normalized_email = ?, password_hash = ?, first_name = ?,
                last_name = ?, email_confirmed = ?, lockout_end = ?, access_failed_count = ?,
                updated_at = ?
            WHERE id = ?
            "#,
        )
        .bind(&user.user_name)
        .bind(&user.email)
        .bind(user.normalized_email())
        .bind(&user.password_hash)
        .bind(&user.first_name)
        .bind(&user.last_name)
        .bind(user.email_confirmed)
        .bind(user.lockout_end)
        .bind(user.access_failed_count)
        .bind(user.updated_at.unwrap_or_else(Utc::now))
        .bind(&user.id)
        .execute(&self.pool)
        .await?;

        Ok(result.rows_affected() > 0)
    }

    pub async fn roles_for(&self, user_id: &str) -> Result<Vec<String>> {
        let roles: Vec<String> = sqlx::query_scalar(
            r#"
            SELECT r.name FROM roles r
            JOIN user_roles ur ON ur.role_id = r.id
            WHERE ur.user_id = ?
            ORDER BY r.name
            "#,
        )
        .bind(user_id)
        .fetch_all(&self.pool)
        .await?;
        Ok(roles)
    }

    /// Grant a role by name. Returns false if the user already had it or the role is unknown.
    pub async fn add_role(&self, user_id: &str, role: &str) -> Result<bool> {
        let result = sqlx::query(
            r#"
            INSERT OR IGNORE INTO user_roles (user_id, role_id)
            SELECT ?, id FROM roles WHERE normalized_name = ?
            "#,
        )
        .bind(user_id)
        .bind(role.trim().to_uppercase())
        .execute(&self.pool)
        .await?;
        Ok(result.rows_affected() > 0)
    }

    pub async fn remove_role(&self, user_id: &str, role: &str) -> Result<bool> {
        let result = sqlx::query(
            r#"
            DELETE FROM user_roles
            WHERE user_id = ? AND role_id IN (SELECT id FROM roles WHERE normalized_name = ?)
            "#,
        )
        .bind(user_id)
        .bind(role.trim().to_uppercase())
        .execute(&self.pool)
        .await?;
        Ok(result.rows_affected() > 0)
    }

    pub async fn count_in_role(&self, role: &str) -> Result<i64> {
        let count: i64 = sqlx::query_scalar(
            r#"
            SELECT COUNT(*) FROM user_roles ur
            JOIN roles r ON r.id = ur.role_id
            WHERE r.normalized_name = ?
            "#,
        )
        .bind(role.trim().to_uppercase())
        .fetch_one(&self.pool)
        .await?;
        Ok(count)
    }
}

fn map_user(row: &SqliteRow) -> Result<ApplicationUser> {
    Ok(ApplicationUser {
        id: row.try_get("id")?,
        user_name: row.try_get("user_name")?,
        email: row.try_get("email")?,
        password_hash: row.try_get("password_hash")?,
        first_name: row.try_get("first_name")?,
        last_name: row.try_get("last_name")?,
        email_confirmed: row.try_get("email_confirmed")?,
        lockout_end: row.try_get("lockout_end")?,
        access_failed_count: row.try_get("access_failed_count")?,
        created_at: row.try_get("created_at")?,
        updated_at: row.try_get("updated_at")?,
    })
}
