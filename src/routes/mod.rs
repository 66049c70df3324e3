/// Application routes configuration
use crate::handlers::{
    detect_image, detect_info, detect_text, detect_video, get_submission, health, index,
    list_submissions, not_found, service_status, submit_contact, AppState,
};
use crate::middleware::{rate_limit, RateLimiter};
use axum::{
    extract::DefaultBodyLimit,
    http::{
        header::{AUTHORIZATION, CONTENT_TYPE},
        HeaderName, HeaderValue, Method,
    },
    routing::{get, post},
    Router,
};
use tower_http::cors::CorsLayer;

/// Base64 media bodies can be large
const BODY_LIMIT_BYTES: usize = 50 * 1024 * 1024;

fn cors_layer(origin: HeaderValue) -> CorsLayer {
    CorsLayer::new()
        .allow_origin(origin)
        .allow_methods([
            Method::GET,
            Method::POST,
            Method::PUT,
            Method::DELETE,
            Method::OPTIONS,
        ])
        .allow_headers([
            CONTENT_TYPE,
            AUTHORIZATION,
            HeaderName::from_static("x-api-key"),
        ])
        .allow_credentials(true)
}

/// Build the application router with all routes
pub fn build_router(state: AppState) -> Router {
    let limiter = RateLimiter::new(&state.config.rate_limit);
    let cors = cors_layer(state.config.cors_origin.clone());

    Router::new()
        // Liveness
        .route("/", get(index))
        .route("/health", get(health))
        // Detection endpoints
        .route("/api/detect", get(detect_info))
        .route("/api/detect/text", post(detect_text))
        .route("/api/detect/image", post(detect_image))
        .route("/api/detect/video", post(detect_video))
        .route("/api/detect/status", get(service_status))
        // Contact endpoints
        .route("/api/contact", post(submit_contact))
        .route("/api/contact/submissions", get(list_submissions))
        .route("/api/contact/submission/:id", get(get_submission))
        .fallback(not_found)
        .layer(DefaultBodyLimit::max(BODY_LIMIT_BYTES))
        .layer(axum::middleware::from_fn_with_state(limiter, rate_limit))
        .layer(cors)
        .with_state(state)
}
