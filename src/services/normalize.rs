//! Maps provider response bodies onto [`DetectionResult`].
//!
//! Each provider family has its own ordered key table. The first present,
//! non-empty value wins; everything else degrades to a fixed default, so
//! normalization never fails.

use crate::domain::{ContentKind, DetectionResult, ProviderKind};
use crate::utils::{b_pick, generate_request_id, n_pick, s_pick, v_pick};
use chrono::Utc;
use serde_json::Value;

pub const DEFAULT_PREDICTION: &str = "unknown";
pub const DEFAULT_SERVICE_VERSION: &str = "1.0.0";

struct FieldKeys {
    prediction: &'static [&'static str],
    confidence: &'static [&'static str],
    is_fake: &'static [&'static str],
    label: &'static [&'static str],
    processing_time: &'static [&'static str],
    model_version: &'static [&'static str],
    explanation: &'static [&'static str],
    features: &'static [&'static str],
    version: &'static [&'static str],
    request_id: &'static [&'static str],
}

const MICROSERVICE_KEYS: FieldKeys = FieldKeys {
    prediction: &["prediction", "result"],
    confidence: &["confidence", "score"],
    is_fake: &["is_fake", "isFake"],
    label: &["label"],
    processing_time: &["processing_time", "processingTime"],
    model_version: &["model_version", "modelVersion"],
    explanation: &["explanation"],
    features: &["features"],
    version: &["version"],
    request_id: &["request_id", "requestId"],
};

const AGGREGATOR_KEYS: FieldKeys = FieldKeys {
    prediction: &["result", "prediction"],
    confidence: &["score", "confidence"],
    is_fake: &["isFake", "is_fake"],
    label: &["label"],
    processing_time: &["processingTime", "processing_time"],
    model_version: &["modelVersion", "model_version"],
    explanation: &["explanation"],
    features: &["features"],
    version: &["version"],
    request_id: &["requestId", "request_id"],
};

fn keys_for(provider: ProviderKind) -> &'static FieldKeys {
    match provider {
        ProviderKind::Microservice => &MICROSERVICE_KEYS,
        ProviderKind::Aggregator => &AGGREGATOR_KEYS,
    }
}

/// Normalize an upstream body. Total: any JSON value is accepted.
pub fn normalize(provider: ProviderKind, kind: ContentKind, body: &Value) -> DetectionResult {
    let keys = keys_for(provider);

    let prediction =
        s_pick(body, keys.prediction).unwrap_or_else(|| DEFAULT_PREDICTION.to_string());

    let confidence = n_pick(body, keys.confidence)
        .map(|c| c.clamp(0.0, 1.0))
        .unwrap_or(0.0);

    let is_fake = b_pick(body, keys.is_fake)
        .unwrap_or_else(|| prediction.eq_ignore_ascii_case("fake"));

    let label = s_pick(body, keys.label).unwrap_or_else(|| prediction.clone());

    let processing_time_ms = n_pick(body, keys.processing_time)
        .filter(|t| *t >= 0.0)
        .map(|t| t.round() as u64);

    DetectionResult {
        content_kind: kind,
        prediction,
        confidence,
        is_fake,
        label,
        processing_time_ms,
        model_version: s_pick(body, keys.model_version),
        explanation: s_pick(body, keys.explanation),
        features: v_pick(body, keys.features),
        service_version: s_pick(body, keys.version)
            .unwrap_or_else(|| DEFAULT_SERVICE_VERSION.to_string()),
        request_id: s_pick(body, keys.request_id).unwrap_or_else(generate_request_id),
        responded_at: Utc::now(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn micro(body: Value) -> DetectionResult {
        normalize(ProviderKind::Microservice, ContentKind::Text, &body)
    }

    #[test]
    fn test_empty_body_degrades_to_defaults() {
        let r = micro(json!({}));
        assert_eq!(r.prediction, "unknown");
        assert_eq!(r.confidence, 0.0);
        assert!(!r.is_fake);
        assert_eq!(r.label, "unknown");
        assert_eq!(r.processing_time_ms, None);
        assert_eq!(r.model_version, None);
        assert_eq!(r.explanation, None);
        assert_eq!(r.service_version, "1.0.0");
        assert!(r.request_id.starts_with("req_"));
    }

    #[test]
    fn test_non_object_body_degrades_to_defaults() {
        for body in [json!(null), json!([1, 2]), json!("fake"), json!(3)] {
            let r = micro(body);
            assert_eq!(r.prediction, "unknown");
            assert!(!r.request_id.is_empty());
        }
    }

    #[test]
    fn test_fake_prediction_without_flag_is_fake() {
        let r = micro(json!({"prediction": "fake", "confidence": 0.9}));
        assert!(r.is_fake);
        assert_eq!(r.confidence, 0.9);
        assert_eq!(r.label, "fake");
    }

    #[test]
    fn test_explicit_flag_wins_over_prediction() {
        let r = micro(json!({"prediction": "fake", "is_fake": false}));
        assert!(!r.is_fake);
    }

    #[test]
    fn test_alternate_keys_are_used() {
        let r = micro(json!({
            "result": "real",
            "score": "0.35",
            "isFake": false,
            "processingTime": 120.4,
            "modelVersion": "v2",
            "requestId": "req_upstream"
        }));
        assert_eq!(r.prediction, "real");
        assert_eq!(r.confidence, 0.35);
        assert_eq!(r.processing_time_ms, Some(120));
        assert_eq!(r.model_version.as_deref(), Some("v2"));
        assert_eq!(r.request_id, "req_upstream");
    }

    #[test]
    fn test_confidence_is_clamped() {
        assert_eq!(micro(json!({"confidence": 87})).confidence, 1.0);
        assert_eq!(micro(json!({"confidence": -0.2})).confidence, 0.0);
    }

    #[test]
    fn test_label_prefers_label_field() {
        let r = micro(json!({"prediction": "fake", "label": "Likely fabricated"}));
        assert_eq!(r.label, "Likely fabricated");
    }

    #[test]
    fn test_features_and_version_are_relayed() {
        let r = micro(json!({"features": {"sentiment": -0.4}, "version": "2.1.0"}));
        assert_eq!(r.features.unwrap()["sentiment"], -0.4);
        assert_eq!(r.service_version, "2.1.0");
    }

    #[test]
    fn test_aggregator_prefers_its_own_keys() {
        let body = json!({"result": "FAKE", "prediction": "real", "score": 0.8, "confidence": 0.1});
        let r = normalize(ProviderKind::Aggregator, ContentKind::Text, &body);
        assert_eq!(r.prediction, "FAKE");
        assert!(r.is_fake);
        assert_eq!(r.confidence, 0.8);
    }

    #[test]
    fn test_content_kind_is_carried() {
        let r = normalize(ProviderKind::Microservice, ContentKind::Video, &json!({}));
        assert_eq!(r.content_kind, ContentKind::Video);
    }
}
