pub mod api;
pub mod config;
pub mod entities;
pub mod infrastructure;
pub mod models;
pub mod services;

use crate::config::ServerConfig;
use crate::services::events::EventHub;
use crate::services::storage::StorageBackend;
use axum::{
    Router,
    routing::{get, post},
};
use sea_orm::DatabaseConnection;
use std::sync::Arc;
use tower_http::cors::{Any, CorsLayer};
use utoipa::OpenApi;
use utoipa_swagger_ui::SwaggerUi;

#[derive(OpenApi)]
#[openapi(
    paths(
        api::handlers::upload::upload_files,
        api::handlers::files::list_files,
        api::handlers::files::get_file,
        api::handlers::files::delete_file,
        api::handlers::download::download_file,
        api::handlers::health::health_check,
    ),
    components(
        schemas(
            models::FileRecord,
            api::handlers::health::HealthResponse,
        )
    ),
    tags(
        (name = "files", description = "File storage endpoints"),
        (name = "system", description = "Service health")
    )
)]
pub struct ApiDoc;

#[derive(Clone)]
pub struct AppState {
    pub db: DatabaseConnection,
    pub storage: Arc<dyn StorageBackend>,
    pub events: Arc<EventHub>,
    pub config: ServerConfig,
}

pub fn create_app(state: AppState) -> Router {
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    Router::new()
        .merge(SwaggerUi::new("/swagger-ui").url("/api-docs/openapi.json", ApiDoc::openapi()))
        .route("/health", get(api::handlers::health::health_check))
        .route("/upload", post(api::handlers::upload::upload_files))
        .route("/files", get(api::handlers::files::list_files))
        .route(
            "/files/:id",
            get(api::handlers::files::get_file).delete(api::handlers::files::delete_file),
        )
        .route("/download/:id", get(api::handlers::download::download_file))
        .route("/events", get(api::handlers::events::events_ws))
        .layer(cors)
        .with_state(state)
}
