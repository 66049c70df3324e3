//! Outbound payload construction.

use crate::domain::{DetectionRequest, Payload, VideoSource};
use crate::utils::generate_request_id;
use chrono::{SecondsFormat, Utc};
use serde_json::{json, Value};

impl DetectionRequest {
    /// Stamp validated content with a fresh correlation id and the current time
    pub fn new(payload: Payload) -> Self {
        Self {
            payload,
            correlation_id: generate_request_id(),
            submitted_at: Utc::now(),
        }
    }
}

/// Body the upstream expects for this request. Never fails.
pub fn build_payload(req: &DetectionRequest) -> Value {
    let timestamp = req
        .submitted_at
        .to_rfc3339_opts(SecondsFormat::Millis, true);

    match &req.payload {
        Payload::Text(text) => json!({
            "text": text.trim(),
            "request_id": req.correlation_id,
            "timestamp": timestamp,
        }),
        Payload::Image(image) => json!({
            "image": image,
            "request_id": req.correlation_id,
            "timestamp": timestamp,
        }),
        Payload::Video(VideoSource::Url(url)) => json!({
            "video_url": url,
            "input_type": "url",
            "request_id": req.correlation_id,
            "timestamp": timestamp,
        }),
        Payload::Video(VideoSource::Inline(data)) => json!({
            "video": data,
            "input_type": "base64",
            "request_id": req.correlation_id,
            "timestamp": timestamp,
        }),
    }
}
