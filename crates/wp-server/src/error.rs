//! Error-to-HTTP response conversion.
//!
//! Implements `IntoResponse` for [`wp_core::Error`] so that route handlers
//! can return `Result<T, AppError>` directly. The body is always
//! `{"error": <summary>}` plus `"details"` when the encoder produced output.

use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use serde::Serialize;

/// JSON error body.
#[derive(Debug, Serialize, utoipa::ToSchema)]
pub struct ErrorBody {
    /// Short human-readable summary.
    pub error: String,
    /// Captured encoder output, for encoder failures only.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub details: Option<String>,
}

/// Wrapper so we can implement `IntoResponse` for an external type.
#[derive(Debug)]
pub struct AppError(pub wp_core::Error);

impl From<wp_core::Error> for AppError {
    fn from(e: wp_core::Error) -> Self {
        Self(e)
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let status = StatusCode::from_u16(self.0.http_status())
            .unwrap_or(StatusCode::INTERNAL_SERVER_ERROR);

        if status.is_server_error() {
            tracing::error!(
                status = %status,
                error = %self.0,
                details = self.0.details().unwrap_or_default(),
                "request failed"
            );
        } else {
            tracing::debug!(status = %status, error = %self.0, "request rejected");
        }

        let body = ErrorBody {
            error: self.0.summary(),
            details: self.0.details().map(str::to_owned),
        };

        (status, axum::Json(body)).into_response()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use http_body_util::BodyExt;
    use wp_core::Error;

    async fn body_json(response: Response) -> serde_json::Value {
        let bytes = response.into_body().collect().await.unwrap().to_bytes();
        serde_json::from_slice(&bytes).unwrap()
    }

    #[tokio::test]
    async fn input_missing_produces_400() {
        let response = AppError(Error::InputMissing).into_response();
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
        assert_eq!(
            body_json(response).await,
            serde_json::json!({"error": "No image file provided"})
        );
    }

    #[tokio::test]
    async fn encoder_failure_includes_details() {
        let response = AppError(Error::encoder("exited with 1", "bad header")).into_response();
        assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);
        assert_eq!(
            body_json(response).await,
            serde_json::json!({"error": "Failed to convert image", "details": "bad header"})
        );
    }

    #[tokio::test]
    async fn timeout_produces_504() {
        let response =
            AppError(Error::EncoderTimeout(std::time::Duration::from_secs(1))).into_response();
        assert_eq!(response.status(), StatusCode::GATEWAY_TIMEOUT);
    }

    #[tokio::test]
    async fn resource_error_hides_io_details() {
        let io = std::io::Error::new(std::io::ErrorKind::Other, "disk full at /tmp");
        let response = AppError(Error::resource("Failed to save uploaded file", io)).into_response();
        assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);
        let json = body_json(response).await;
        assert_eq!(json["error"], "Failed to save uploaded file");
        assert!(json.get("details").is_none());
    }
}
