//! Database schema
//!
//! Idempotent DDL applied at startup. Timestamps are stored as RFC 3339
//! text, booleans as 0/1 integers.

use sqlx::SqlitePool;
use tracing::debug;

use crate::error::Result;

const STATEMENTS: &[&str] = &[
    r#"
    CREATE TABLE IF NOT EXISTS users (
        id TEXT PRIMARY KEY,
        user_name TEXT NOT NULL,
        email TEXT NOT NULL,
        normalized_email TEXT NOT NULL UNIQUE,
        password_hash TEXT NOT NULL,
        first_name TEXT,
        last_name TEXT,
        email_confirmed INTEGER NOT NULL DEFAULT 0,
        lockout_end TEXT,
        access_failed_count INTEGER NOT NULL DEFAULT 0,
        created_at TEXT NOT NULL,
        updated_at TEXT
    )
    "#,
    r#"
    CREATE TABLE IF NOT EXISTS roles (
        id INTEGER PRIMARY KEY AUTOINCREMENT,
        name TEXT NOT NULL,
        normalized_name TEXT NOT NULL UNIQUE
    )
    "#,
    r#"
    CREATE TABLE IF NOT EXISTS user_roles (
        user_id TEXT NOT NULL REFERENCES users(id) ON DELETE CASCADE,
        role_id INTEGER NOT NULL REFERENCES roles(id) ON DELETE CASCADE,
        PRIMARY KEY (user_id, role_id)
    )
    "#,
    r#"
    CREATE TABLE IF NOT EXISTS refresh_tokens (
        token_hash TEXT PRIMARY KEY,
        user_id TEXT NOT NULL REFERENCES users(id) ON DELETE CASCADE,
        expires_at TEXT NOT NULL,
        revoked INTEGER NOT NULL DEFAULT 0,
        created_at TEXT NOT NULL
    )
    "#,
    r#"
    CREATE TABLE IF NOT EXISTS user_model_objects (
        id INTEGER PRIMARY KEY AUTOINCREMENT,
        tw_entry_id INTEGER,
        name TEXT NOT NULL,
        description TEXT NOT NULL DEFAULT '',
        application_user_id TEXT REFERENCES users(id),
        color TEXT NOT NULL DEFAULT '',
        size TEXT NOT NULL DEFAULT '',
        class TEXT NOT NULL DEFAULT '',
        breed TEXT NOT NULL DEFAULT '',
        notes TEXT NOT NULL DEFAULT '',
        hero_shot_image BLOB,
        created_at TEXT NOT NULL,
        updated_at TEXT,
        is_deleted INTEGER NOT NULL DEFAULT 0
    )
    "#,
    r#"
    CREATE TABLE IF NOT EXISTS shows (
        id INTEGER PRIMARY KEY AUTOINCREMENT,
        name TEXT NOT NULL,
        description TEXT NOT NULL DEFAULT '',
        show_date TEXT NOT NULL,
        end_date TEXT,
        status TEXT NOT NULL,
        judge_id TEXT,
        show_holder_id INTEGER NOT NULL REFERENCES user_model_objects(id),
        is_active INTEGER NOT NULL DEFAULT 1,
        entry_deadline TEXT,
        judging_deadline TEXT,
        results_published_at TEXT,
        max_entries_per_user INTEGER NOT NULL DEFAULT 5,
        show_type TEXT NOT NULL,
        show_format TEXT NOT NULL,
        is_private INTEGER NOT NULL DEFAULT 0,
        allow_member_only_entries INTEGER NOT NULL DEFAULT 0,
        is_nan_qualifying INTEGER NOT NULL DEFAULT 0,
        namhsa_guidelines TEXT,
        additional_metadata TEXT,
        created_at TEXT NOT NULL,
        updated_at TEXT,
        is_deleted INTEGER NOT NULL DEFAULT 0
    )
    "#,
    r#"
    CREATE TABLE IF NOT EXISTS divisions (
        id INTEGER PRIMARY KEY AUTOINCREMENT,
        name TEXT NOT NULL,
        description TEXT NOT NULL DEFAULT '',
        division_type TEXT NOT NULL,
        sort_order INTEGER NOT NULL DEFAULT 0,
        show_id INTEGER NOT NULL REFERENCES shows(id),
        created_at TEXT NOT NULL,
        updated_at TEXT,
        is_deleted INTEGER NOT NULL DEFAULT 0
    )
    "#,
    r#"
    CREATE TABLE IF NOT EXISTS show_classes (
        id INTEGER PRIMARY KEY AUTOINCREMENT,
        name TEXT NOT NULL,
        description TEXT NOT NULL DEFAULT '',
        class_number INTEGER NOT NULL,
        max_entries INTEGER,
        sort_order INTEGER NOT NULL DEFAULT 0,
        breed_category TEXT,
        finish_type TEXT,
        performance_type TEXT,
        collectibility_type TEXT,
        gender_restriction TEXT,
        age_restriction TEXT,
        color_restriction TEXT,
        scale_restriction TEXT,
        division_id INTEGER NOT NULL REFERENCES divisions(id),
        show_id INTEGER NOT NULL REFERENCES shows(id),
        created_at TEXT NOT NULL,
        updated_at TEXT,
        is_deleted INTEGER NOT NULL DEFAULT 0
    )
    "#,
    r#"
    CREATE TABLE IF NOT EXISTS entries (
        id INTEGER PRIMARY KEY AUTOINCREMENT,
        entry_number INTEGER NOT NULL,
        submission_date TEXT NOT NULL,
        status TEXT NOT NULL,
        user_model_object_id INTEGER NOT NULL REFERENCES user_model_objects(id),
        show_class_id INTEGER NOT NULL REFERENCES show_classes(id),
        created_at TEXT NOT NULL,
        updated_at TEXT,
        is_deleted INTEGER NOT NULL DEFAULT 0
    )
    "#,
    r#"
    CREATE TABLE IF NOT EXISTS results (
        id INTEGER PRIMARY KEY AUTOINCREMENT,
        placement INTEGER NOT NULL,
        comments TEXT NOT NULL DEFAULT '',
        judged_date TEXT NOT NULL,
        entry_id INTEGER NOT NULL REFERENCES entries(id),
        created_at TEXT NOT NULL,
        updated_at TEXT,
        is_deleted INTEGER NOT NULL DEFAULT 0
    )
    "#,
    "CREATE INDEX IF NOT EXISTS idx_shows_judge ON shows(judge_id)",
    "CREATE INDEX IF NOT EXISTS idx_shows_holder ON shows(show_holder_id)",
    "CREATE INDEX IF NOT EXISTS idx_divisions_show ON divisions(show_id)",
    "CREATE INDEX IF NOT EXISTS idx_classes_division ON show_classes(division_id)",
    "CREATE INDEX IF NOT EXISTS idx_classes_show ON show_classes(show_id)",
    "CREATE INDEX IF NOT EXISTS idx_entries_class ON entries(show_class_id)",
    "CREATE INDEX IF NOT EXISTS idx_entries_horse ON entries(user_model_object_id)",
    // one live result per entry
    "CREATE UNIQUE INDEX IF NOT EXISTS ux_results_entry ON results(entry_id) WHERE is_deleted = 0",
    "CREATE INDEX IF NOT EXISTS idx_horses_owner ON user_model_objects(application_user_id)",
];

pub async fn init_schema(pool: &SqlitePool) -> Result<()> {
    for statement in STATEMENTS {
        sqlx::query(statement).execute(pool).await?;
    }
    debug!(statements = STATEMENTS.len(), "Schema initialized");
    Ok(())
}
