use sqlx::{Pool, Sqlite};
use tracing::info;
use uuid::Uuid;

use crate::db::models::{AllowedEmail, SESSION_TTL_MS, Session, User, UserRole, now_ms};
use crate::db::schema::SQLITE_INIT;
use crate::error::DataroomError;

pub type SqlitePool = Pool<Sqlite>;

#[derive(Clone)]
pub struct Storage {
    pool: SqlitePool,
}

impl Storage {
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }

    pub fn pool(&self) -> &SqlitePool {
        &self.pool
    }

    /// Initialize the schema by executing the bundled DDL.
    pub async fn init_schema(&self) -> Result<(), DataroomError> {
        // execute statements one by one (sqlx::query rejects multi-commands)
        for stmt in SQLITE_INIT.split(';') {
            let s = stmt.trim();
            if s.is_empty() {
                continue;
            }
            sqlx::query(s).execute(&self.pool).await?;
        }
        Ok(())
    }

    /// One-time startup seed: make sure the admin email is allow-listed and an
    /// admin user exists. Runs before the server accepts requests.
    pub async fn bootstrap(&self, admin_name: &str, admin_email: &str) -> Result<(), DataroomError> {
        if !self.is_email_allowed(admin_email).await? {
            self.add_allowed_email(admin_email).await?;
            info!(email = %admin_email, "allow-listed admin email");
        }
        if self.user_by_email(admin_email).await?.is_none() {
            self.create_user(admin_name, admin_email, "admin", UserRole::Admin, None)
                .await?;
            info!(email = %admin_email, "created admin user");
        }
        Ok(())
    }

    // Users

    pub async fn users(&self) -> Result<Vec<User>, DataroomError> {
        let users = sqlx::query_as::<_, User>(
            "SELECT id, oauth_id, name, email, role, access_token, stripe_customer_id FROM users",
        )
        .fetch_all(&self.pool)
        .await?;
        Ok(users)
    }

    pub async fn user_by_access_token(
        &self,
        access_token: &str,
    ) -> Result<Option<User>, DataroomError> {
        let user = sqlx::query_as::<_, User>(
            r#"SELECT id, oauth_id, name, email, role, access_token, stripe_customer_id
               FROM users WHERE access_token = ?"#,
        )
        .bind(access_token)
        .fetch_optional(&self.pool)
        .await?;
        Ok(user)
    }

    pub async fn user_by_email(&self, email: &str) -> Result<Option<User>, DataroomError> {
        let user = sqlx::query_as::<_, User>(
            r#"SELECT id, oauth_id, name, email, role, access_token, stripe_customer_id
               FROM users WHERE email = ?"#,
        )
        .bind(email)
        .fetch_optional(&self.pool)
        .await?;
        Ok(user)
    }

    pub async fn user_by_oauth_id(&self, oauth_id: &str) -> Result<Option<User>, DataroomError> {
        let user = sqlx::query_as::<_, User>(
            r#"SELECT id, oauth_id, name, email, role, access_token, stripe_customer_id
               FROM users WHERE oauth_id = ?"#,
        )
        .bind(oauth_id)
        .fetch_optional(&self.pool)
        .await?;
        Ok(user)
    }

    /// Resolve the user owning a session row. Does not check session expiry;
    /// callers wanting expiry semantics go through `get_session` first.
    pub async fn user_by_session_id(&self, session_id: &str) -> Result<Option<User>, DataroomError> {
        let user = sqlx::query_as::<_, User>(
            r#"SELECT u.id, u.oauth_id, u.name, u.email, u.role, u.access_token, u.stripe_customer_id
               FROM users u JOIN sessions s ON s.user_id = u.id
               WHERE s.id = ?"#,
        )
        .bind(session_id)
        .fetch_optional(&self.pool)
        .await?;
        Ok(user)
    }

    /// Create a user with a freshly minted id and access token.
    pub async fn create_user(
        &self,
        name: &str,
        email: &str,
        oauth_id: &str,
        role: UserRole,
        stripe_customer_id: Option<String>,
    ) -> Result<User, DataroomError> {
        let user = User {
            id: Uuid::new_v4().to_string(),
            oauth_id: Some(oauth_id.to_string()),
            name: Some(name.to_string()),
            email: Some(email.to_string()),
            role,
            access_token: Some(Uuid::new_v4().simple().to_string()),
            stripe_customer_id,
        };
        sqlx::query(
            r#"INSERT INTO users (id, oauth_id, name, email, role, access_token, stripe_customer_id)
               VALUES (?, ?, ?, ?, ?, ?, ?)"#,
        )
        .bind(&user.id)
        .bind(&user.oauth_id)
        .bind(&user.name)
        .bind(&user.email)
        .bind(user.role)
        .bind(&user.access_token)
        .bind(&user.stripe_customer_id)
        .execute(&self.pool)
        .await?;
        Ok(user)
    }

    /// Delete users by id in a single transaction.
    pub async fn delete_users(&self, ids: &[String]) -> Result<(), DataroomError> {
        let mut tx = self.pool.begin().await?;
        for id in ids {
            sqlx::query("DELETE FROM users WHERE id = ?")
                .bind(id)
                .execute(&mut *tx)
                .await?;
        }
        tx.commit().await?;
        Ok(())
    }

    // Sessions

    /// Insert a session row with a generated id.
    pub async fn create_session(
        &self,
        user_id: &str,
        token: &str,
        expires_at: i64,
    ) -> Result<Session, DataroomError> {
        let session = Session {
            id: Uuid::new_v4().to_string(),
            user_id: user_id.to_string(),
            token: token.to_string(),
            expires_at,
        };
        sqlx::query("INSERT INTO sessions (id, user_id, token, expires_at) VALUES (?, ?, ?, ?)")
            .bind(&session.id)
            .bind(&session.user_id)
            .bind(&session.token)
            .bind(session.expires_at)
            .execute(&self.pool)
            .await?;
        Ok(session)
    }

    /// Fetch a session; a found-but-expired row is reported as absent (the row
    /// is left in place, matching the original cleanup gap).
    pub async fn get_session(&self, id: &str) -> Result<Option<Session>, DataroomError> {
        let session = sqlx::query_as::<_, Session>(
            "SELECT id, user_id, token, expires_at FROM sessions WHERE id = ?",
        )
        .bind(id)
        .fetch_optional(&self.pool)
        .await?;
        Ok(session.filter(|s| !s.is_expired()))
    }

    /// Latest session for a user, expiry not considered.
    pub async fn session_by_user(&self, user_id: &str) -> Result<Option<Session>, DataroomError> {
        let session = sqlx::query_as::<_, Session>(
            "SELECT id, user_id, token, expires_at FROM sessions WHERE user_id = ?",
        )
        .bind(user_id)
        .fetch_optional(&self.pool)
        .await?;
        Ok(session)
    }

    /// True iff the session exists and has not expired.
    pub async fn validate_session(&self, id: &str) -> Result<bool, DataroomError> {
        Ok(self.get_session(id).await?.is_some())
    }

    /// Extend the user's current session to `now + 24h`. Returns the updated
    /// session, or `None` when the user has no session to refresh.
    pub async fn refresh_session(&self, user_id: &str) -> Result<Option<Session>, DataroomError> {
        let Some(mut session) = self.session_by_user(user_id).await? else {
            return Ok(None);
        };
        session.expires_at = now_ms() + SESSION_TTL_MS;
        sqlx::query("UPDATE sessions SET expires_at = ? WHERE id = ?")
            .bind(session.expires_at)
            .bind(&session.id)
            .execute(&self.pool)
            .await?;
        Ok(Some(session))
    }

    /// Idempotent removal by session id.
    pub async fn delete_session(&self, id: &str) -> Result<(), DataroomError> {
        sqlx::query("DELETE FROM sessions WHERE id = ?")
            .bind(id)
            .execute(&self.pool)
            .await?;
        Ok(())
    }

    /// Idempotent removal of every session owned by a user.
    pub async fn delete_sessions_for_user(&self, user_id: &str) -> Result<(), DataroomError> {
        sqlx::query("DELETE FROM sessions WHERE user_id = ?")
            .bind(user_id)
            .execute(&self.pool)
            .await?;
        Ok(())
    }

    // Allowed emails

    pub async fn allowed_emails(&self) -> Result<Vec<AllowedEmail>, DataroomError> {
        let rows =
            sqlx::query_as::<_, AllowedEmail>("SELECT id, email FROM allowed_user_emails")
                .fetch_all(&self.pool)
                .await?;
        Ok(rows)
    }

    pub async fn add_allowed_email(&self, email: &str) -> Result<AllowedEmail, DataroomError> {
        let entry = AllowedEmail {
            id: Uuid::new_v4().to_string(),
            email: email.to_string(),
        };
        sqlx::query("INSERT INTO allowed_user_emails (id, email) VALUES (?, ?)")
            .bind(&entry.id)
            .bind(&entry.email)
            .execute(&self.pool)
            .await?;
        Ok(entry)
    }

    pub async fn remove_allowed_emails(&self, ids: &[String]) -> Result<(), DataroomError> {
        let mut tx = self.pool.begin().await?;
        for id in ids {
            sqlx::query("DELETE FROM allowed_user_emails WHERE id = ?")
                .bind(id)
                .execute(&mut *tx)
                .await?;
        }
        tx.commit().await?;
        Ok(())
    }

    pub async fn is_email_allowed(&self, email: &str) -> Result<bool, DataroomError> {
        let row: Option<(String,)> =
            sqlx::query_as("SELECT id FROM allowed_user_emails WHERE email = ? LIMIT 1")
                .bind(email)
                .fetch_optional(&self.pool)
                .await?;
        Ok(row.is_some())
    }
}
