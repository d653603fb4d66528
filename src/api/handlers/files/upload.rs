use crate::api::error::AppError;
use crate::services::staging::StagedUpload;
use axum::{
    extract::{Multipart, State, multipart::MultipartError},
    http::StatusCode,
};
use futures::TryStreamExt;
use tokio_util::io::StreamReader;

use super::types::*;

struct ReceivedFile {
    key: String,
    content_type: Option<String>,
    staged: StagedUpload,
}

#[utoipa::path(
    post,
    path = "/upload",
    request_body(content = UploadForm, content_type = "multipart/form-data"),
    responses(
        (status = 200, description = "File uploaded successfully", body = String),
        (status = 400, description = "No file in the `image` field"),
        (status = 413, description = "Request body too large"),
        (status = 500, description = "Staging or storage failure")
    ),
    tag = "files"
)]
pub async fn upload_file(
    State(state): State<crate::AppState>,
    mut multipart: Multipart,
) -> Result<(StatusCode, &'static str), AppError> {
    let result: Result<(), AppError> = async {
        let mut received: Option<ReceivedFile> = None;

        while let Some(field) = multipart.next_field().await.map_err(multipart_error)? {
            // Only the first file part named `image` counts; anything else is skipped.
            if received.is_some() || field.name() != Some(UPLOAD_FIELD) {
                continue;
            }
            let Some(key) = field
                .file_name()
                .filter(|name| !name.is_empty())
                .map(str::to_string)
            else {
                continue;
            };
            let content_type = field.content_type().map(str::to_string);

            let reader = StreamReader::new(field.map_err(std::io::Error::other));
            let staged = state
                .file_service
                .upload_to_staging(reader)
                .await
                .map_err(staging_error)?;

            received = Some(ReceivedFile {
                key,
                content_type,
                staged,
            });
        }

        let Some(file) = received else {
            return Err(AppError::BadRequest(NO_FILE.to_string()));
        };
        if file.staged.is_empty() {
            return Err(AppError::BadRequest(NO_FILE.to_string()));
        }

        state
            .file_service
            .process_upload(file.staged, &file.key, file.content_type.as_deref())
            .await
            .map_err(|e| {
                tracing::error!("Upload error: {:#}", e);
                AppError::Internal(UPLOAD_FAILED.to_string())
            })?;

        tracing::info!("✅ Stored '{}'", file.key);
        Ok(())
    }
    .await;

    match result {
        Ok(()) => Ok((StatusCode::OK, UPLOAD_OK)),
        Err(e) => {
            // Consume the remaining multipart stream to avoid a TCP reset on the client
            tracing::warn!("Upload failed early: {}. Consuming remaining stream...", e);
            while let Ok(Some(mut field)) = multipart.next_field().await {
                while let Ok(Some(_)) = field.chunk().await {}
            }
            Err(e)
        }
    }
}

fn multipart_error(e: MultipartError) -> AppError {
    if e.status() == StatusCode::PAYLOAD_TOO_LARGE {
        AppError::PayloadTooLarge("Request body exceeds the maximum allowed limit".to_string())
    } else {
        AppError::BadRequest(e.body_text())
    }
}

/// Failures while staging are either the client's stream breaking (reported as
/// a multipart error wrapped in `io::Error`) or local disk trouble.
fn staging_error(e: anyhow::Error) -> AppError {
    let stream_error = e
        .chain()
        .filter_map(|cause| cause.downcast_ref::<std::io::Error>())
        .filter_map(|io| io.get_ref())
        .find_map(|inner| inner.downcast_ref::<MultipartError>());

    match stream_error {
        Some(me) if me.status() == StatusCode::PAYLOAD_TOO_LARGE => {
            AppError::PayloadTooLarge("Request body exceeds the maximum allowed limit".to_string())
        }
        Some(me) => AppError::BadRequest(me.body_text()),
        None => {
            tracing::error!("Upload error: {:#}", e);
            AppError::Internal(UPLOAD_FAILED.to_string())
        }
    }
}
