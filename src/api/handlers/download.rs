use axum::{
    body::Body,
    extract::{Path, State},
    http::header,
    response::{IntoResponse, Response},
};
use percent_encoding::{NON_ALPHANUMERIC, utf8_percent_encode};

use crate::api::error::AppError;

#[utoipa::path(
    get,
    path = "/download/{id}",
    params(
        ("id" = String, Path, description = "File ID")
    ),
    responses(
        (status = 200, description = "File content stream"),
        (status = 404, description = "File not found"),
        (status = 500, description = "Backend read failed")
    )
)]
pub async fn download_file(
    State(state): State<crate::AppState>,
    Path(id): Path<String>,
) -> Result<Response, AppError> {
    let handle = state.storage.open_read(&id).await?;

    let headers = [
        (header::CONTENT_TYPE, handle.record.content_type.clone()),
        (
            header::CONTENT_DISPOSITION,
            content_disposition(&handle.record.filename),
        ),
    ];

    // Chunks go straight from the store into the response body; a chunk
    // lost mid-stream (concurrent delete) aborts the transfer.
    Ok((headers, Body::from_stream(handle.stream)).into_response())
}

/// `attachment` disposition with an ASCII fallback name plus the RFC 5987
/// encoded original for non-ASCII filenames.
fn content_disposition(filename: &str) -> String {
    let ascii_filename = filename
        .chars()
        .filter(|c| c.is_ascii() && !c.is_control() && *c != '"' && *c != '\\' && *c != ';')
        .take(64)
        .collect::<String>();
    let fallback_filename = if ascii_filename.is_empty() {
        "file"
    } else {
        &ascii_filename
    };

    let encoded_filename = utf8_percent_encode(filename, NON_ALPHANUMERIC).to_string();

    format!(
        "attachment; filename=\"{}\"; filename*=UTF-8''{}",
        fallback_filename, encoded_filename
    )
}
