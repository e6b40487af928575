use axum::{
    extract::{Multipart, State},
    http::StatusCode,
};
use tracing::info;

use crate::api::error::AppError;
use crate::services::events::FileEvent;

/// Multipart field name that carries file content. Parts under any other
/// name (or without a filename) are skipped without failing the request.
const FILES_FIELD: &str = "files";

#[utoipa::path(
    post,
    path = "/upload",
    request_body(
        content = String,
        description = "multipart/form-data body with one or more file parts under the `files` field",
        content_type = "multipart/form-data"
    ),
    responses(
        (status = 204, description = "All files stored"),
        (status = 400, description = "Malformed multipart body or no files field"),
        (status = 500, description = "Backend write failed")
    )
)]
pub async fn upload_files(
    State(state): State<crate::AppState>,
    mut multipart: Multipart,
) -> Result<StatusCode, AppError> {
    let mut stored = 0usize;

    while let Some(mut field) = multipart
        .next_field()
        .await
        .map_err(|e| AppError::BadRequest(e.to_string()))?
    {
        let name = field.name().unwrap_or_default().to_string();
        if name != FILES_FIELD {
            continue;
        }
        let filename = match field.file_name() {
            Some(value) => value.to_string(),
            None => continue,
        };
        let content_type = field
            .content_type()
            .unwrap_or(mime::APPLICATION_OCTET_STREAM.as_ref())
            .to_string();

        let mut sink = state.storage.open_write(&filename, &content_type).await?;

        loop {
            match field.chunk().await {
                Ok(Some(bytes)) => {
                    if let Err(err) = sink.write(&bytes).await {
                        let _ = sink.abort().await;
                        return Err(err.into());
                    }
                }
                Ok(None) => break,
                Err(err) => {
                    // Framing or transport error mid-part. The partial
                    // write is reclaimed; anything stored by earlier
                    // parts stays stored.
                    let _ = sink.abort().await;
                    return Err(AppError::BadRequest(err.to_string()));
                }
            }
        }

        let record = sink.finish().await?;
        info!(
            "📦 Stored '{}' as {} ({} bytes)",
            record.filename, record.id, record.length
        );
        state.events.publish(FileEvent::Added(record));
        stored += 1;
    }

    if stored == 0 {
        return Err(AppError::BadRequest(
            "No file parts under the `files` field".to_string(),
        ));
    }

    Ok(StatusCode::NO_CONTENT)
}
