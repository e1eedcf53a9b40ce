use axum::{Json, extract::State, response::IntoResponse};
use axum_extra::extract::cookie::CookieJar;
use serde::Deserialize;
use serde_json::json;
use tracing::error;

use crate::db::models::AllowedEmail;
use crate::error::DataroomError;
use crate::flash::{Flash, set_flash};
use crate::handlers::auth::UserInfo;
use crate::router::AppState;

#[derive(Debug, Deserialize)]
pub struct IdsBody {
    pub ids: Vec<String>,
}

#[derive(Debug, Deserialize)]
pub struct AllowedEmailBody {
    pub email: String,
}

/// GET /api/users -> every user, tokens omitted.
pub async fn list_users(
    State(state): State<AppState>,
) -> Result<Json<Vec<UserInfo>>, DataroomError> {
    let users = state
        .store
        .users()
        .await?
        .into_iter()
        .map(|u| UserInfo {
            id: u.id,
            name: u.name,
            email: u.email,
            role: u.role,
        })
        .collect();
    Ok(Json(users))
}

/// DELETE /api/users -> delete users by id, flash the outcome.
pub async fn delete_users(
    State(state): State<AppState>,
    jar: CookieJar,
    Json(body): Json<IdsBody>,
) -> impl IntoResponse {
    let (flash, success) = match state.store.delete_users(&body.ids).await {
        Ok(()) => (Flash::success("Users deleted"), true),
        Err(err) => {
            error!(error = %err, "failed to delete users");
            (Flash::error("Failed to delete users"), false)
        }
    };
    let jar = set_flash(jar, &flash);
    (jar, Json(json!({ "success": success })))
}

/// GET /api/users/allowed -> current allow-list.
pub async fn list_allowed(
    State(state): State<AppState>,
) -> Result<Json<Vec<AllowedEmail>>, DataroomError> {
    Ok(Json(state.store.allowed_emails().await?))
}

/// POST /api/users/allowed -> add an email to the allow-list.
pub async fn add_allowed(
    State(state): State<AppState>,
    Json(body): Json<AllowedEmailBody>,
) -> Result<Json<AllowedEmail>, DataroomError> {
    Ok(Json(state.store.add_allowed_email(&body.email).await?))
}

/// DELETE /api/users/allowed -> remove allow-list entries by id.
pub async fn delete_allowed(
    State(state): State<AppState>,
    jar: CookieJar,
    Json(body): Json<IdsBody>,
) -> impl IntoResponse {
    let (flash, success) = match state.store.remove_allowed_emails(&body.ids).await {
        Ok(()) => (Flash::success("Users deleted"), true),
        Err(err) => {
            error!(error = %err, "failed to delete allowed emails");
            (Flash::error("Failed to delete users"), false)
        }
    };
    let jar = set_flash(jar, &flash);
    (jar, Json(json!({ "success": success })))
}
