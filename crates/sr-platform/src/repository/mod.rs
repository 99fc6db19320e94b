//! Repository Layer
//!
//! SQLite repositories for platform entities. Reads never return
//! soft-deleted rows and deletes only flag rows as deleted.

pub mod schema;
pub mod show;
pub mod division;
pub mod show_class;
pub mod entry;
pub mod result;
pub mod user_model_object;
pub mod user;
pub mod role;
pub mod refresh_token;

use std::str::FromStr;
use std::time::Duration;

use sqlx::sqlite::{SqliteConnectOptions, SqlitePoolOptions, SqliteRow};
use sqlx::{Row, SqlitePool};

use crate::error::{PlatformError, Result};

pub use schema::init_schema;
pub use show::ShowRepository;
pub use division::DivisionRepository;
pub use show_class::ShowClassRepository;
pub use entry::EntryRepository;
pub use result::ResultRepository;
pub use user_model_object::UserModelObjectRepository;
pub use user::UserRepository;
pub use role::RoleRepository;
pub use refresh_token::RefreshTokenRepository;

/// Open a pool for `url`, creating the database file when missing.
///
/// In-memory databases live only as long as their connection, so they get a
/// single connection that is never recycled.
pub async fn connect(url: &str, max_connections: u32) -> Result<SqlitePool> {
    let options = SqliteConnectOptions::from_str(url)?
        .create_if_missing(true)
        .foreign_keys(true);

    let pool = if url.contains(":memory:") {
        SqlitePoolOptions::new()
            .max_connections(1)
            .idle_timeout(None)
            .max_lifetime(None)
            .connect_with(options)
            .await?
    } else {
        SqlitePoolOptions::new()
            .max_connections(max_connections)
            .acquire_timeout(Duration::from_secs(10))
            .connect_with(options)
            .await?
    };

    Ok(pool)
}

/// Connect and apply the schema.
pub async fn open(url: &str, max_connections: u32) -> Result<SqlitePool> {
    let pool = connect(url, max_connections).await?;
    init_schema(&pool).await?;
    Ok(pool)
}

/// Read a column stored by enum variant name. Names the enum does not know
/// mean the row was written outside the platform.
pub(crate) fn named_column<T>(row: &SqliteRow, column: &str) -> Result<T>
where
    T: FromStr<Err = PlatformError>,
{
    let raw: String = row.try_get(column)?;
    raw.parse()
        .map_err(|_| PlatformError::internal(format!("Unrecognized {} {:?} in database", column, raw)))
}
