use chrono::Utc;
use serde::{Deserialize, Serialize};
use sqlx::FromRow;

/// Fixed session lifetime: 24 hours, in milliseconds.
pub const SESSION_TTL_MS: i64 = 24 * 60 * 60 * 1000;

/// Current wall-clock time as epoch milliseconds, the unit used by
/// `sessions.expires_at`.
pub fn now_ms() -> i64 {
    Utc::now().timestamp_millis()
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, sqlx::Type)]
#[serde(rename_all = "lowercase")]
#[sqlx(rename_all = "lowercase")]
pub enum UserRole {
    User,
    Admin,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, FromRow)]
pub struct User {
    pub id: String,
    pub oauth_id: Option<String>,
    pub name: Option<String>,
    pub email: Option<String>,
    pub role: UserRole,
    pub access_token: Option<String>,
    pub stripe_customer_id: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, FromRow)]
pub struct Session {
    pub id: String,
    pub user_id: String,
    /// Copy of the owning user's access token at login time.
    pub token: String,
    /// Absolute expiry, epoch milliseconds.
    pub expires_at: i64,
}

impl Session {
    pub fn is_expired(&self) -> bool {
        now_ms() >= self.expires_at
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, FromRow)]
pub struct AllowedEmail {
    pub id: String,
    pub email: String,
}
