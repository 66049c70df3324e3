/// HTTP request handlers
use crate::config::AppConfig;
use crate::domain::{DetectionResult, Health, HealthReport, OverallStatus};
use crate::errors::{ApiError, ApiResult};
use crate::repo::{ContactStore, InMemoryContactStore};
use crate::services::{ContactForm, ContactService, DetectionService, HealthAggregator};
use crate::validation;
use axum::{
    extract::{rejection::JsonRejection, Path, State},
    http::{Method, StatusCode, Uri},
    Json,
};
use chrono::Utc;
use serde::Serialize;
use serde_json::{json, Value};
use std::sync::Arc;

const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Application state shared across handlers
#[derive(Clone)]
pub struct AppState {
    pub config: Arc<AppConfig>,
    pub detection: Arc<DetectionService>,
    pub health: Arc<HealthAggregator>,
    pub contact: Arc<ContactService>,
}

impl AppState {
    pub fn from_config(config: AppConfig) -> anyhow::Result<Self> {
        let store: Arc<dyn ContactStore> = Arc::new(InMemoryContactStore::new());
        Self::with_store(config, store)
    }

    pub fn with_store(config: AppConfig, store: Arc<dyn ContactStore>) -> anyhow::Result<Self> {
        let detection = DetectionService::from_config(&config)?;
        let health = HealthAggregator::new(detection.providers(), config.probe_timeout());

        Ok(Self {
            config: Arc::new(config),
            detection: Arc::new(detection),
            health: Arc::new(health),
            contact: Arc::new(ContactService::new(store)),
        })
    }
}

/// Successful response wrapper
#[derive(Serialize)]
pub struct SuccessResponse<T: Serialize> {
    pub success: bool,
    #[serde(flatten)]
    pub data: T,
}

impl<T: Serialize> SuccessResponse<T> {
    pub fn new(data: T) -> Self {
        Self {
            success: true,
            data,
        }
    }
}

fn json_body<T>(body: Result<Json<T>, JsonRejection>) -> ApiResult<T> {
    match body {
        Ok(Json(value)) => Ok(value),
        Err(rejection) if rejection.status() == StatusCode::PAYLOAD_TOO_LARGE => {
            Err(ApiError::TooLarge)
        }
        Err(rejection) => Err(ApiError::invalid(
            "Invalid JSON format",
            format!("Request body contains invalid JSON: {}", rejection.body_text()),
        )),
    }
}

/// Liveness check handler
pub async fn health(State(state): State<AppState>) -> Json<Health> {
    Json(Health {
        success: true,
        message: "Fake News Detection API is running",
        timestamp: Utc::now(),
        environment: state.config.environment.clone(),
        version: VERSION,
    })
}

/// Service banner
pub async fn index() -> Json<Value> {
    Json(json!({
        "success": true,
        "message": "Welcome to Fake News Detection API",
        "version": VERSION,
        "endpoints": {
            "health": "/health",
            "textDetection": "/api/detect/text",
            "imageDetection": "/api/detect/image",
            "videoDetection": "/api/detect/video",
            "serviceStatus": "/api/detect/status",
            "contact": "/api/contact"
        }
    }))
}

/// Detection endpoint catalogue
pub async fn detect_info() -> Json<Value> {
    Json(json!({
        "success": true,
        "message": "Fake News Detection API Endpoints",
        "endpoints": {
            "textDetection": {
                "method": "POST",
                "path": "/api/detect/text",
                "description": "Analyze text content for fake news detection",
                "bodyFormat": { "text": "string (required, max 10,000 characters)" }
            },
            "imageDetection": {
                "method": "POST",
                "path": "/api/detect/image",
                "description": "Analyze image content for fake news detection",
                "bodyFormat": { "image": "string (required, base64-encoded image with data URI)" }
            },
            "videoDetection": {
                "method": "POST",
                "path": "/api/detect/video",
                "description": "Analyze video content for fake news detection",
                "bodyFormat": { "video": "string (required, base64-encoded video with data URI or URL)" }
            },
            "serviceStatus": {
                "method": "GET",
                "path": "/api/detect/status",
                "description": "Check the health status of all detection services"
            }
        },
        "supportedFormats": {
            "images": ["JPEG", "PNG", "GIF", "WebP"],
            "videos": ["MP4", "AVI", "MOV", "WMV", "FLV", "WebM"]
        }
    }))
}

type DetectionResponse = ApiResult<Json<SuccessResponse<DetectionResult>>>;

pub async fn detect_text(
    State(state): State<AppState>,
    body: Result<Json<Value>, JsonRejection>,
) -> DetectionResponse {
    let payload = validation::text_payload(&json_body(body)?)?;
    let result = state.detection.detect(payload).await?;
    Ok(Json(SuccessResponse::new(result)))
}

pub async fn detect_image(
    State(state): State<AppState>,
    body: Result<Json<Value>, JsonRejection>,
) -> DetectionResponse {
    let payload = validation::image_payload(&json_body(body)?)?;
    let result = state.detection.detect(payload).await?;
    Ok(Json(SuccessResponse::new(result)))
}

pub async fn detect_video(
    State(state): State<AppState>,
    body: Result<Json<Value>, JsonRejection>,
) -> DetectionResponse {
    let payload = validation::video_payload(&json_body(body)?)?;
    let result = state.detection.detect(payload).await?;
    Ok(Json(SuccessResponse::new(result)))
}

/// Aggregate provider health: 200 when healthy, 503 when degraded
pub async fn service_status(
    State(state): State<AppState>,
) -> ApiResult<(StatusCode, Json<SuccessResponse<HealthReport>>)> {
    let report = state.health.check_all().await?;
    let status = match report.overall_status {
        OverallStatus::Healthy => StatusCode::OK,
        OverallStatus::Degraded => StatusCode::SERVICE_UNAVAILABLE,
    };
    Ok((status, Json(SuccessResponse::new(report))))
}

pub async fn submit_contact(
    State(state): State<AppState>,
    body: Result<Json<ContactForm>, JsonRejection>,
) -> ApiResult<Json<Value>> {
    let submission = state.contact.submit(json_body(body)?).await?;
    Ok(Json(json!({
        "success": true,
        "message": "Contact form submitted successfully",
        "ticketId": submission.id,
        "data": {
            "id": submission.id,
            "name": submission.name,
            "email": submission.email,
            "subject": submission.subject,
            "submittedAt": submission.timestamp,
        }
    })))
}

pub async fn list_submissions(State(state): State<AppState>) -> ApiResult<Json<Value>> {
    let submissions = state.contact.list().await?;
    Ok(Json(json!({
        "success": true,
        "count": submissions.len(),
        "submissions": submissions,
    })))
}

pub async fn get_submission(
    Path(id): Path<String>,
    State(state): State<AppState>,
) -> ApiResult<Json<Value>> {
    let submission = state.contact.get(&id).await?;
    Ok(Json(json!({
        "success": true,
        "submission": submission,
    })))
}

/// JSON 404 for every unmatched route
pub async fn not_found(method: Method, uri: Uri) -> (StatusCode, Json<Value>) {
    (
        StatusCode::NOT_FOUND,
        Json(json!({
            "success": false,
            "error": "Endpoint not found",
            "message": format!("The requested endpoint {} {} does not exist", method, uri),
            "availableEndpoints": [
                "GET /",
                "GET /health",
                "GET /api/detect",
                "POST /api/detect/text",
                "POST /api/detect/image",
                "POST /api/detect/video",
                "GET /api/detect/status",
                "POST /api/contact"
            ]
        })),
    )
}
