use axum::{
    Json,
    extract::{Path, State},
    http::StatusCode,
};
use tracing::info;

use crate::api::error::AppError;
use crate::models::FileRecord;
use crate::services::events::FileEvent;

#[utoipa::path(
    get,
    path = "/files",
    responses(
        (status = 200, description = "Every stored file record", body = Vec<FileRecord>)
    )
)]
pub async fn list_files(
    State(state): State<crate::AppState>,
) -> Result<Json<Vec<FileRecord>>, AppError> {
    let records = state.storage.list().await?;
    Ok(Json(records))
}

#[utoipa::path(
    get,
    path = "/files/{id}",
    params(
        ("id" = String, Path, description = "File ID")
    ),
    responses(
        (status = 200, description = "Record for one stored file", body = FileRecord),
        (status = 404, description = "File not found")
    )
)]
pub async fn get_file(
    State(state): State<crate::AppState>,
    Path(id): Path<String>,
) -> Result<Json<FileRecord>, AppError> {
    let record = state.storage.get_metadata(&id).await?;
    Ok(Json(record))
}

#[utoipa::path(
    delete,
    path = "/files/{id}",
    params(
        ("id" = String, Path, description = "File ID")
    ),
    responses(
        (status = 204, description = "File and content removed"),
        (status = 404, description = "File not found")
    )
)]
pub async fn delete_file(
    State(state): State<crate::AppState>,
    Path(id): Path<String>,
) -> Result<StatusCode, AppError> {
    if !state.storage.exists(&id).await? {
        return Err(AppError::NotFound(format!("No file stored under id {}", id)));
    }

    state.storage.delete(&id).await?;

    info!("🗑️ Deleted {}", id);
    state.events.publish(FileEvent::Deleted(id));

    Ok(StatusCode::NO_CONTENT)
}
