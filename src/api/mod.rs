pub mod analysis;
#[cfg(feature = "email")]
pub mod email;
pub mod form;
pub mod health;

use axum::{
    Json, Router,
    http::StatusCode,
    response::{IntoResponse, Response},
    routing::{get, post},
};
use serde_json::json;

use crate::infrastructure::AppState;

/// `{"error": message}` with the given status.
pub(crate) fn error_response(status: StatusCode, message: impl Into<String>) -> Response {
    (status, Json(json!({ "error": message.into() }))).into_response()
}

pub fn api_router(state: AppState) -> Router {
    let router = Router::new()
        // Health check
        .route("/health", get(health::health_check))
        // OCR + agent
        .route("/analyze-image", post(analysis::analyze_image))
        .route("/process-image", post(analysis::process_image))
        .route(
            "/enhanced-image-analysis",
            post(analysis::enhanced_image_analysis),
        );

    // Email
    #[cfg(feature = "email")]
    let router = router
        .route("/send-email", post(email::send_email))
        .route("/test-smtp-connection", get(email::test_smtp_connection));

    router.with_state(state)
}
