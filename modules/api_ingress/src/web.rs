use axum::{
    http::header,
    response::{IntoResponse, Json, Response},
};
use serde_json::{json, Value};
use std::sync::Arc;

pub async fn health_check() -> Json<Value> {
    Json(json!({
        "status": "healthy",
        "timestamp": chrono::Utc::now().to_rfc3339()
    }))
}

/// Serves a pre-rendered OpenAPI document.
pub fn openapi_handler(
    doc: Arc<Value>,
) -> impl Fn() -> std::future::Ready<Response> + Clone + Send + Sync + 'static {
    move || {
        let body = Json((*doc).clone());
        std::future::ready(([(header::CACHE_CONTROL, "no-store")], body).into_response())
    }
}
