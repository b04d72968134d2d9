use std::sync::Arc;

use axum::{
    body::Bytes,
    extract::{DefaultBodyLimit, State},
    http::StatusCode,
    response::{IntoResponse, Response},
    routing::{get, post},
    Json, Router,
};
use tower_http::{cors::CorsLayer, limit::RequestBodyLimitLayer};

use crate::handlers::{AnalysisHandler, AnalysisOutcome};
use crate::models::{AnalysisRequest, ErrorBody, UnparsableBody};

pub const ANALYZE_PATH: &str = "/api/analyze-food";

pub struct AppState {
    pub analysis_handler: Arc<AnalysisHandler>,
}

pub fn create_router(analysis_handler: Arc<AnalysisHandler>, max_body_bytes: usize) -> Router {
    let state = Arc::new(AppState { analysis_handler });

    Router::new()
        .route("/", get(root_handler))
        .route(ANALYZE_PATH, post(analyze_handler))
        .route("/health", get(health_check))
        .layer(DefaultBodyLimit::disable())
        .layer(RequestBodyLimitLayer::new(max_body_bytes))
        .layer(CorsLayer::permissive())
        .with_state(state)
}

async fn analyze_handler(State(state): State<Arc<AppState>>, body: Bytes) -> Response {
    let request = match decode_request(&body) {
        Ok(request) => request,
        Err(details) => {
            log::warn!("⚠️ Rejected malformed analysis request: {}", details);
            return (
                StatusCode::BAD_REQUEST,
                Json(ErrorBody::with_details("Invalid request body", details)),
            )
                .into_response();
        }
    };

    state.analysis_handler.analyze(request).await.into_response()
}

/// Only a JSON object is accepted; serde would otherwise read `["..."]` positionally.
fn decode_request(body: &[u8]) -> Result<AnalysisRequest, String> {
    let value: serde_json::Value = serde_json::from_slice(body).map_err(|e| e.to_string())?;
    if !value.is_object() {
        return Err("expected a JSON object".to_string());
    }
    serde_json::from_value(value).map_err(|e| e.to_string())
}

impl IntoResponse for AnalysisOutcome {
    fn into_response(self) -> Response {
        match self {
            AnalysisOutcome::MissingImage => (
                StatusCode::BAD_REQUEST,
                Json(ErrorBody::new("Image is required")),
            )
                .into_response(),
            AnalysisOutcome::InvalidImageFormat => (
                StatusCode::BAD_REQUEST,
                Json(ErrorBody::new("Invalid image format. Expected base64 data URL")),
            )
                .into_response(),
            AnalysisOutcome::MissingApiKey => (
                StatusCode::INTERNAL_SERVER_ERROR,
                Json(ErrorBody::new("OpenAI API key not configured")),
            )
                .into_response(),
            AnalysisOutcome::EmptyResponse => (
                StatusCode::INTERNAL_SERVER_ERROR,
                Json(ErrorBody::new("No response from OpenAI")),
            )
                .into_response(),
            // Soft failure: the call worked, only the structuring did not.
            AnalysisOutcome::Unparsable { raw } => (
                StatusCode::OK,
                Json(UnparsableBody {
                    error: "Could not parse nutritional data".to_string(),
                    raw_response: raw,
                    message: "AI analysis completed but JSON parsing failed".to_string(),
                }),
            )
                .into_response(),
            AnalysisOutcome::Success(result) => (StatusCode::OK, Json(result)).into_response(),
            AnalysisOutcome::Failed { details } => (
                StatusCode::INTERNAL_SERVER_ERROR,
                Json(ErrorBody::with_details("Failed to analyze image", details)),
            )
                .into_response(),
        }
    }
}

async fn root_handler() -> &'static str {
    "Meal Lens nutrition API - POST a base64 data URL image to /api/analyze-food"
}

async fn health_check() -> &'static str {
    "OK"
}
