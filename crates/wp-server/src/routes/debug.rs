//! Encoder introspection route.

use axum::extract::State;
use axum::Json;
use wp_encoder::EncoderReport;

use crate::context::AppContext;

/// GET /debug
#[utoipa::path(
    get,
    path = "/debug",
    responses(
        (status = 200, description = "Encoder location, version and install tree", body = EncoderReport)
    )
)]
pub async fn debug_encoder(State(ctx): State<AppContext>) -> Json<EncoderReport> {
    Json(EncoderReport::collect(&ctx.locator).await)
}
