pub mod api;
pub mod config;
pub mod infrastructure;
pub mod services;

use crate::api::middleware::request_id::{REQUEST_ID_HEADER, request_id_middleware};
use crate::config::GatewayConfig;
use crate::services::file_service::FileService;
use crate::services::storage::StorageService;
use axum::{
    Router,
    http::{HeaderValue, Request, Response},
    middleware::from_fn,
    routing::{get, post},
};
use std::sync::Arc;
use tower_http::cors::{AllowOrigin, Any, CorsLayer};
use tower_http::trace::TraceLayer;
use utoipa::OpenApi;
use utoipa_swagger_ui::SwaggerUi;

/// Multipart framing allowance on top of `max_file_size`.
const MULTIPART_OVERHEAD: usize = 10 * 1024 * 1024;

#[derive(OpenApi)]
#[openapi(
    paths(
        api::handlers::files::upload::upload_file,
        api::handlers::files::list::list_json,
        api::handlers::files::download::download_file,
        api::handlers::health::health_check,
    ),
    components(
        schemas(
            api::handlers::files::UploadForm,
            services::storage::StoredObject,
            api::handlers::health::HealthResponse,
        )
    ),
    tags(
        (name = "files", description = "Upload, list and download objects"),
        (name = "system", description = "Service health")
    )
)]
pub struct ApiDoc;

#[derive(Clone)]
pub struct AppState {
    pub storage: Arc<dyn StorageService>,
    pub file_service: Arc<FileService>,
    pub config: GatewayConfig,
}

impl AppState {
    pub fn new(storage: Arc<dyn StorageService>, config: GatewayConfig) -> Self {
        let file_service = Arc::new(FileService::new(storage.clone(), &config));
        Self {
            storage,
            file_service,
            config,
        }
    }
}

pub fn create_app(state: AppState) -> Router {
    Router::new()
        .merge(SwaggerUi::new("/swagger-ui").url("/api-docs/openapi.json", ApiDoc::openapi()))
        .route("/health", get(api::handlers::health::health_check))
        .route("/upload", post(api::handlers::files::upload_file))
        .route("/list-json", get(api::handlers::files::list_json))
        .route(
            "/download/:filename",
            get(api::handlers::files::download_file),
        )
        .layer(cors_layer(&state.config.allowed_origins))
        .layer(axum::extract::DefaultBodyLimit::max(
            state.config.max_file_size.saturating_add(MULTIPART_OVERHEAD),
        ))
        .layer(
            TraceLayer::new_for_http()
                .make_span_with(|request: &Request<_>| {
                    let request_id = request
                        .headers()
                        .get(&REQUEST_ID_HEADER)
                        .and_then(|v| v.to_str().ok())
                        .unwrap_or("unknown");
                    tracing::info_span!(
                        "http_request",
                        method = %request.method(),
                        uri = %request.uri(),
                        request_id = %request_id,
                    )
                })
                .on_request(|request: &Request<_>, _span: &tracing::Span| {
                    tracing::info!("📥 {} {}", request.method(), request.uri());
                })
                .on_response(
                    |response: &Response<_>, latency: std::time::Duration, _span: &tracing::Span| {
                        tracing::info!(
                            "📤 Finished in {:?} with status {}",
                            latency,
                            response.status()
                        );
                    },
                ),
        )
        // Outermost, so the trace span already sees the id
        .layer(from_fn(request_id_middleware))
        .with_state(state)
}

fn cors_layer(allowed_origins: &[String]) -> CorsLayer {
    let origins: Vec<HeaderValue> = allowed_origins
        .iter()
        .filter_map(|origin| match HeaderValue::from_str(origin) {
            Ok(value) => Some(value),
            Err(_) => {
                tracing::warn!("Ignoring invalid CORS origin '{}'", origin);
                None
            }
        })
        .collect();

    let layer = CorsLayer::new().allow_methods(Any).allow_headers(Any);
    if origins.is_empty() {
        layer.allow_origin(Any)
    } else {
        layer.allow_origin(AllowOrigin::list(origins))
    }
}
