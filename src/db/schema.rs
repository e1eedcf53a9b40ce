//! SQL DDL for the user / session / allow-list tables.
//! SQLite-first design; can be adapted for other RDBMS.

/// SQLite schema:
/// - `users`: identity records, `oauth_id` / `email` / `access_token` unique
/// - `sessions`: one row per login, `expires_at` stored as epoch milliseconds
/// - `allowed_user_emails`: self-registration gate for OAuth logins
pub const SQLITE_INIT: &str = r#"
CREATE TABLE IF NOT EXISTS users (
    id TEXT PRIMARY KEY,
    oauth_id TEXT NULL UNIQUE,
    name TEXT NULL,
    email TEXT NULL UNIQUE,
    role TEXT NOT NULL DEFAULT 'user',
    access_token TEXT NULL UNIQUE,
    stripe_customer_id TEXT NULL
);

CREATE TABLE IF NOT EXISTS sessions (
    id TEXT PRIMARY KEY,
    user_id TEXT NOT NULL,
    token TEXT NOT NULL,
    expires_at INTEGER NOT NULL
);

CREATE INDEX IF NOT EXISTS idx_sessions_user_id ON sessions(user_id);

CREATE TABLE IF NOT EXISTS allowed_user_emails (
    id TEXT PRIMARY KEY,
    email TEXT NOT NULL UNIQUE
);
"#;
