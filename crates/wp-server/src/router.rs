//! Axum router construction.
//!
//! Builds the application router with all routes, the upload size limit and
//! the middleware layers.

use axum::extract::DefaultBodyLimit;
use axum::middleware;
use axum::routing::{get, post};
use axum::Router;
use tower_http::cors::{Any, CorsLayer};
use tower_http::trace::TraceLayer;
use utoipa::OpenApi;
use utoipa_swagger_ui::SwaggerUi;

use crate::context::AppContext;
use crate::middleware::request_id::request_id_middleware;
use crate::routes;

#[derive(OpenApi)]
#[openapi(
    paths(
        routes::health::health_check,
        routes::convert::convert,
        routes::debug::debug_encoder,
    ),
    components(schemas(
        routes::health::HealthResponse,
        routes::convert::ConvertForm,
        crate::error::ErrorBody,
        wp_encoder::EncoderReport,
        wp_encoder::LocationOrigin,
    ))
)]
struct ApiDoc;

/// Build the complete Axum router.
pub fn build_router(ctx: AppContext) -> Router {
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    let mut app = Router::new()
        .route("/health", get(routes::health::health_check))
        .route("/convert", post(routes::convert::convert));

    if ctx.config.server.debug_endpoint {
        tracing::info!("Debug endpoint enabled at /debug");
        app = app.route("/debug", get(routes::debug::debug_encoder));
    }

    let body_limit = match ctx.config.server.max_upload_bytes {
        Some(max) => DefaultBodyLimit::max(max),
        None => DefaultBodyLimit::disable(),
    };

    app.merge(SwaggerUi::new("/api-docs").url("/api-docs/openapi.json", ApiDoc::openapi()))
        .layer(body_limit)
        .layer(middleware::from_fn(request_id_middleware))
        .layer(cors)
        .layer(TraceLayer::new_for_http())
        .with_state(ctx)
}
