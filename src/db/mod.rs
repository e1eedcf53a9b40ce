//! Database module: models, schema and the storage layer.
//!
//! Layout:
//! - `models.rs`: Rust structs mirroring DB rows
//! - `schema.rs`: SQL DDL for initializing the database (SQLite-first)
//! - `store.rs`: user / session / allow-list operations over a pool

pub mod models;
pub mod schema;
pub mod store;

pub use models::{AllowedEmail, SESSION_TTL_MS, Session, User, UserRole, now_ms};
pub use schema::SQLITE_INIT;
pub use store::{SqlitePool, Storage};

use std::str::FromStr;

use sqlx::sqlite::{SqliteConnectOptions, SqlitePoolOptions};

use crate::error::DataroomError;

/// Open (creating if missing) the SQLite database and run the schema DDL.
pub async fn connect(database_url: &str) -> Result<Storage, DataroomError> {
    let options = SqliteConnectOptions::from_str(database_url)?.create_if_missing(true);
    let pool = SqlitePoolOptions::new()
        .max_connections(5)
        .connect_with(options)
        .await?;
    let storage = Storage::new(pool);
    storage.init_schema().await?;
    Ok(storage)
}
