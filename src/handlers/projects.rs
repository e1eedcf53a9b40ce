use axum::{
    Json,
    extract::{Path, State},
    http::StatusCode,
    response::{IntoResponse, Response},
};
use serde::Deserialize;
use serde_json::json;
use tracing::warn;

use crate::config::CONFIG;
use crate::dataroom::ProjectEntry;
use crate::error::DataroomError;
use crate::router::AppState;

#[derive(Debug, Deserialize)]
pub struct CreateProjectBody {
    pub name: String,
}

/// GET /api/projects -> project directories with their result files.
pub async fn list_projects(
    State(state): State<AppState>,
) -> Result<Json<Vec<ProjectEntry>>, DataroomError> {
    Ok(Json(state.dataroom.list_projects()?))
}

/// POST /api/projects -> create an empty project directory.
pub async fn create_project(
    State(state): State<AppState>,
    Json(body): Json<CreateProjectBody>,
) -> Result<Json<serde_json::Value>, DataroomError> {
    state.dataroom.create_project(&body.name)?;
    Ok(Json(json!({ "message": "Project created successfully" })))
}

/// DELETE /api/projects/{name} -> notify the backend API (when configured),
/// then remove the project directory.
pub async fn delete_project(
    State(state): State<AppState>,
    Path(name): Path<String>,
) -> Result<Response, DataroomError> {
    if let Some(api_url) = CONFIG.api_url.as_ref() {
        let url = format!(
            "{}/projects/{}",
            api_url.as_str().trim_end_matches('/'),
            name
        );
        let response = state.http.delete(&url).send().await?;
        if !response.status().is_success() {
            warn!(project = %name, status = %response.status(), "backend refused project deletion");
            return Ok((
                StatusCode::INTERNAL_SERVER_ERROR,
                Json(json!({ "message": "Failed to delete project" })),
            )
                .into_response());
        }
    }

    state.dataroom.delete_project(&name)?;
    Ok(Json(json!({ "message": "Project deleted successfully" })).into_response())
}
