use axum::{
    Json,
    extract::{Multipart, Path, State},
};
use serde_json::json;

use crate::error::DataroomError;
use crate::router::AppState;

/// POST /api/files/upload -> multipart form with a `project` field and any
/// number of `files` parts. The project directory is replaced wholesale.
pub async fn upload_files(
    State(state): State<AppState>,
    mut multipart: Multipart,
) -> Result<Json<serde_json::Value>, DataroomError> {
    let mut project: Option<String> = None;
    let mut files: Vec<(String, Vec<u8>)> = Vec::new();

    while let Some(field) = multipart.next_field().await? {
        match field.name() {
            Some("project") => project = Some(field.text().await?),
            Some("files") => {
                let name = field
                    .file_name()
                    .map(str::to_string)
                    .ok_or_else(|| {
                        DataroomError::BadRequest("file part without a filename".to_string())
                    })?;
                files.push((name, field.bytes().await?.to_vec()));
            }
            _ => {}
        }
    }

    let project = project
        .ok_or_else(|| DataroomError::BadRequest("missing `project` field".to_string()))?;

    let written = state.dataroom.replace_uploads(&project, &files)?;
    let uploaded: Vec<String> = written
        .iter()
        .map(|p| p.to_string_lossy().into_owned())
        .collect();

    Ok(Json(json!({
        "message": "Files uploaded successfully",
        "uploadedFiles": uploaded,
    })))
}

/// GET /api/files/{project}/{name} -> contents of a generated result file.
pub async fn get_result_file(
    State(state): State<AppState>,
    Path((project, name)): Path<(String, String)>,
) -> Result<Json<serde_json::Value>, DataroomError> {
    let contents = state.dataroom.read_result_file(&project, &name)?;
    Ok(Json(json!({ "fileContents": contents })))
}
