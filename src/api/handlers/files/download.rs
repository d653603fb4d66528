use crate::api::error::AppError;
use axum::{
    extract::{Path, State},
    http::{StatusCode, header},
    response::{IntoResponse, Response},
};

use super::types::DOWNLOAD_FAILED;

#[utoipa::path(
    get,
    path = "/download/{filename}",
    params(
        ("filename" = String, Path, description = "Object key")
    ),
    responses(
        (status = 302, description = "Redirect to a short-lived signed URL"),
        (status = 500, description = "URL could not be signed")
    ),
    tag = "files"
)]
pub async fn download_file(
    State(state): State<crate::AppState>,
    Path(filename): Path<String>,
) -> Result<Response, AppError> {
    // The key goes to the backend as an opaque string; it never touches the local filesystem.
    let presigned_url = state
        .file_service
        .download_url(&filename)
        .await
        .map_err(|e| {
            tracing::error!("Download error: {:#}", e);
            AppError::Internal(DOWNLOAD_FAILED.to_string())
        })?;

    tracing::info!("📎 Presigned redirect for key={}", filename);

    Ok((StatusCode::FOUND, [(header::LOCATION, presigned_url)]).into_response())
}
