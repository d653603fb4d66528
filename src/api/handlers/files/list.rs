use crate::services::storage::StoredObject;
use axum::{Json, extract::State, http::StatusCode};

#[utoipa::path(
    get,
    path = "/list-json",
    responses(
        (status = 200, description = "Objects in the bucket", body = Vec<StoredObject>),
        (status = 500, description = "Backend failure; body is an empty array", body = Vec<StoredObject>)
    ),
    tag = "files"
)]
pub async fn list_json(
    State(state): State<crate::AppState>,
) -> (StatusCode, Json<Vec<StoredObject>>) {
    match state.file_service.list_objects().await {
        Ok(objects) => (StatusCode::OK, Json(objects)),
        Err(e) => {
            tracing::error!("List error: {:#}", e);
            (StatusCode::INTERNAL_SERVER_ERROR, Json(Vec::new()))
        }
    }
}
