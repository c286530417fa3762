pub mod api;
pub mod config;
pub mod models;
pub mod services;

use crate::config::RelayConfig;
use crate::services::relay::Relay;
use axum::{
    Router,
    http::{HeaderName, Method, header},
    middleware::from_fn,
    routing::{get, post},
};
use std::sync::Arc;
use tower_http::cors::{Any, CorsLayer};
use utoipa::OpenApi;
use utoipa_swagger_ui::SwaggerUi;

#[derive(OpenApi)]
#[openapi(
    paths(
        api::handlers::relay::relay_upload,
        api::handlers::enhance::enhance_upload,
        api::handlers::health::health_check,
    ),
    components(
        schemas(
            models::ClarificationBody,
            models::EnhanceResponse,
            models::ErrorBody,
            api::handlers::health::HealthResponse,
        )
    ),
    tags(
        (name = "relay", description = "Document upload and relay endpoints"),
        (name = "system", description = "Operational endpoints")
    )
)]
pub struct ApiDoc;

#[derive(Clone)]
pub struct AppState {
    pub relay: Arc<dyn Relay>,
    pub config: RelayConfig,
}

pub fn create_app(state: AppState) -> Router {
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods([Method::POST, Method::OPTIONS])
        .allow_headers([header::CONTENT_TYPE, HeaderName::from_static("x-session-id")]);

    Router::new()
        .merge(SwaggerUi::new("/swagger-ui").url("/api-docs/openapi.json", ApiDoc::openapi()))
        .route("/health", get(api::handlers::health::health_check))
        .route(
            "/api/relay",
            post(api::handlers::relay::relay_upload)
                .options(api::handlers::relay::preflight)
                .fallback(api::handlers::relay::method_not_allowed),
        )
        .route(
            "/api/enhance",
            post(api::handlers::enhance::enhance_upload)
                .options(api::handlers::relay::preflight)
                .fallback(api::handlers::relay::method_not_allowed),
        )
        .layer(from_fn(api::middleware::request_id::request_id_middleware))
        .layer(cors)
        .layer(axum::extract::DefaultBodyLimit::max(
            state.config.max_body_size(),
        ))
        .with_state(state)
}
