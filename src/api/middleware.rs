// Middleware stack for observability and protection

use tower_http::{
    classify::{ServerErrorsAsFailures, SharedClassifier},
    cors::CorsLayer,
    limit::RequestBodyLimitLayer,
    trace::TraceLayer,
};

/// Tracing middleware
///
/// One span per request with method and path; status and latency are
/// logged on response.
pub fn tracing_layer() -> TraceLayer<SharedClassifier<ServerErrorsAsFailures>> {
    TraceLayer::new_for_http()
}

/// Body size limit middleware
///
/// Returns 413 Payload Too Large if exceeded. Sized for image uploads.
pub fn body_size_limit_layer(limit_bytes: usize) -> RequestBodyLimitLayer {
    RequestBodyLimitLayer::new(limit_bytes)
}

/// CORS middleware
///
/// Any origin, method and header; the API is called from browser front ends
/// hosted elsewhere.
pub fn cors_layer() -> CorsLayer {
    CorsLayer::permissive()
}
