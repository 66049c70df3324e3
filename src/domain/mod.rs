/// Domain models for the application
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::fmt;

/// Kind of content submitted for analysis
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ContentKind {
    Text,
    Image,
    Video,
}

impl fmt::Display for ContentKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ContentKind::Text => write!(f, "text"),
            ContentKind::Image => write!(f, "image"),
            ContentKind::Video => write!(f, "video"),
        }
    }
}

/// Family of upstream provider, selects the response adapter and error special cases
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ProviderKind {
    /// Internal per-content-kind detection microservice
    Microservice,
    /// Third-party RapidAPI fake news aggregator
    Aggregator,
}

/// Where a submitted video lives
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum VideoSource {
    Url(String),
    Inline(String),
}

impl VideoSource {
    /// Anything starting with an http(s) scheme is a URL, everything else is inline data
    pub fn sniff(input: &str) -> Self {
        if input.starts_with("http://") || input.starts_with("https://") {
            VideoSource::Url(input.to_string())
        } else {
            VideoSource::Inline(input.to_string())
        }
    }
}

/// Validated content waiting to be forwarded upstream
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Payload {
    Text(String),
    Image(String),
    Video(VideoSource),
}

impl Payload {
    pub fn kind(&self) -> ContentKind {
        match self {
            Payload::Text(_) => ContentKind::Text,
            Payload::Image(_) => ContentKind::Image,
            Payload::Video(_) => ContentKind::Video,
        }
    }
}

/// One detection call, scoped to a single inbound request
#[derive(Debug, Clone)]
pub struct DetectionRequest {
    pub payload: Payload,
    pub correlation_id: String,
    pub submitted_at: DateTime<Utc>,
}

impl DetectionRequest {
    pub fn content_kind(&self) -> ContentKind {
        self.payload.kind()
    }
}

/// Canonical detection result relayed to callers
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct DetectionResult {
    pub content_kind: ContentKind,
    pub prediction: String,
    pub confidence: f64,
    pub is_fake: bool,
    pub label: String,
    pub processing_time_ms: Option<u64>,
    pub model_version: Option<String>,
    pub explanation: Option<String>,
    pub features: Option<Value>,
    pub service_version: String,
    pub request_id: String,
    pub responded_at: DateTime<Utc>,
}

/// Probe outcome for one provider
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ServiceHealth {
    pub name: String,
    pub reachable: bool,
    pub url: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub latency_ms: Option<u64>,
    pub checked_at: DateTime<Utc>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum OverallStatus {
    Healthy,
    Degraded,
}

/// Aggregate of every provider probe
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct HealthReport {
    pub overall_status: OverallStatus,
    pub services: Vec<ServiceHealth>,
    pub timestamp: DateTime<Utc>,
}

impl HealthReport {
    pub fn from_services(services: Vec<ServiceHealth>) -> Self {
        let overall_status = if services.iter().all(|s| s.reachable) {
            OverallStatus::Healthy
        } else {
            OverallStatus::Degraded
        };
        Self {
            overall_status,
            services,
            timestamp: Utc::now(),
        }
    }
}

/// Stored contact form submission
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ContactSubmission {
    pub id: String,
    pub name: String,
    pub email: String,
    pub subject: String,
    pub message: String,
    pub timestamp: String,
    pub user_agent: Option<String>,
    pub referrer: Option<String>,
    pub status: String,
    pub created_at: DateTime<Utc>,
}

/// Listing view of a submission
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ContactSummary {
    pub id: String,
    pub name: String,
    pub email: String,
    pub subject: String,
    pub status: String,
    pub created_at: DateTime<Utc>,
}

impl From<&ContactSubmission> for ContactSummary {
    fn from(s: &ContactSubmission) -> Self {
        Self {
            id: s.id.clone(),
            name: s.name.clone(),
            email: s.email.clone(),
            subject: s.subject.clone(),
            status: s.status.clone(),
            created_at: s.created_at,
        }
    }
}

/// Liveness response
#[derive(Serialize)]
pub struct Health {
    pub success: bool,
    pub message: &'static str,
    pub timestamp: DateTime<Utc>,
    pub environment: String,
    pub version: &'static str,
}
