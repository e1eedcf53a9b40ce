//! Login resolution: turn either an access token or an OAuth identity tuple
//! into a session, creating the user on first OAuth login.

use thiserror::Error as ThisError;
use tracing::info;

use crate::billing::Billing;
use crate::db::models::{SESSION_TTL_MS, Session, UserRole, now_ms};
use crate::db::store::Storage;
use crate::error::DataroomError;

/// Either `access_token` or the full OAuth tuple; the two inputs are never
/// meaningfully combined.
#[derive(Debug, Clone, Default)]
pub struct LoginRequest {
    pub access_token: Option<String>,
    pub name: Option<String>,
    pub email: Option<String>,
    pub oauth_id: Option<String>,
}

impl LoginRequest {
    pub fn token(access_token: impl Into<String>) -> Self {
        Self {
            access_token: Some(access_token.into()),
            ..Self::default()
        }
    }

    pub fn oauth(
        oauth_id: impl Into<String>,
        name: impl Into<String>,
        email: impl Into<String>,
    ) -> Self {
        Self {
            access_token: None,
            name: Some(name.into()),
            email: Some(email.into()),
            oauth_id: Some(oauth_id.into()),
        }
    }
}

/// Login denials are tagged values rather than transport errors; the `Display`
/// text is what reaches the user as a flash message. Store failures pass
/// through unchanged.
#[derive(Debug, ThisError)]
pub enum LoginError {
    #[error("Failed to login user. Invalid access token.")]
    InvalidAccessToken,

    #[error("Failed to login user. Missing OAuth ID, name, or email.")]
    MissingOauthFields,

    #[error("Account denied. Please request access.")]
    AccountDenied,

    #[error("Failed to login user.")]
    Failed,

    #[error(transparent)]
    Store(#[from] DataroomError),
}

/// Resolve a login request to a session.
///
/// Token path: the token must match an existing user. OAuth path: the email
/// must be allow-listed (checked before any user lookup, so denial applies to
/// existing users too); a known `oauth_id` has its previous session deleted,
/// an unknown one gets a fresh user row (with a billing customer when billing
/// is configured). Either way an existing session is returned as-is, otherwise
/// a 24-hour session is minted. The delete-then-recheck sequence is not
/// atomic; concurrent logins for one user can race.
pub async fn get_or_create_session(
    store: &Storage,
    billing: &Billing,
    request: LoginRequest,
) -> Result<Session, LoginError> {
    let (user_id, token) = if let Some(access_token) = request.access_token.as_deref() {
        let user = store
            .user_by_access_token(access_token)
            .await?
            .ok_or(LoginError::InvalidAccessToken)?;
        (user.id, user.access_token)
    } else {
        let (Some(oauth_id), Some(name), Some(email)) = (
            request.oauth_id.as_deref(),
            request.name.as_deref(),
            request.email.as_deref(),
        ) else {
            return Err(LoginError::MissingOauthFields);
        };

        if !store.is_email_allowed(email).await? {
            return Err(LoginError::AccountDenied);
        }

        match store.user_by_oauth_id(oauth_id).await? {
            Some(existing) => {
                // single active session: drop whatever this user had before
                store.delete_sessions_for_user(&existing.id).await?;
                (existing.id, existing.access_token)
            }
            None => {
                let customer_id = billing.create_customer(name, email).await?;
                let user = store
                    .create_user(name, email, oauth_id, UserRole::User, customer_id)
                    .await?;
                info!(user_id = %user.id, "created user on first OAuth login");
                (user.id, user.access_token)
            }
        }
    };

    let Some(token) = token else {
        return Err(LoginError::Failed);
    };

    if let Some(existing) = store.session_by_user(&user_id).await? {
        return Ok(existing);
    }

    let expires_at = now_ms() + SESSION_TTL_MS;
    let session = store.create_session(&user_id, &token, expires_at).await?;
    info!(user_id = %user_id, session_id = %session.id, "minted session");
    Ok(session)
}
