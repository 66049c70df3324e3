//! Detection orchestration: build, call, then normalize or classify.

use super::normalize::normalize;
use super::request::build_payload;
use crate::clients::DetectionClient;
use crate::config::{AppConfig, TextBackend};
use crate::domain::{ContentKind, DetectionRequest, DetectionResult, Payload, ProviderKind};
use crate::errors::{classify, ServiceError, UpstreamFailure};
use std::sync::Arc;
use tracing::{error, info, warn};

/// Routes each content kind to its configured provider
pub struct DetectionService {
    text: Arc<DetectionClient>,
    image: Arc<DetectionClient>,
    video: Arc<DetectionClient>,
    expose_details: bool,
}

impl DetectionService {
    pub fn from_config(config: &AppConfig) -> anyhow::Result<Self> {
        let timeout = config.request_timeout();
        let text = match config.text_backend {
            TextBackend::Microservice => {
                DetectionClient::microservice("Text", &config.text_service_url, timeout)?
            }
            TextBackend::RapidApi => DetectionClient::aggregator(&config.rapidapi, timeout)?,
        };

        Ok(Self {
            text: Arc::new(text),
            image: Arc::new(DetectionClient::microservice(
                "Image",
                &config.image_service_url,
                timeout,
            )?),
            video: Arc::new(DetectionClient::microservice(
                "Video",
                &config.video_service_url,
                timeout,
            )?),
            expose_details: config.expose_error_details(),
        })
    }

    /// Every provider, in text/image/video order
    pub fn providers(&self) -> Vec<Arc<DetectionClient>> {
        vec![self.text.clone(), self.image.clone(), self.video.clone()]
    }

    fn client_for(&self, kind: ContentKind) -> &DetectionClient {
        match kind {
            ContentKind::Text => &self.text,
            ContentKind::Image => &self.image,
            ContentKind::Video => &self.video,
        }
    }

    /// Forward validated content upstream. Exactly one outbound call, no retries.
    pub async fn detect(&self, payload: Payload) -> Result<DetectionResult, ServiceError> {
        let req = DetectionRequest::new(payload);
        let kind = req.content_kind();
        let client = self.client_for(kind);
        let request_id = req.correlation_id.as_str();

        info!(
            request_id,
            service = client.name(),
            "Processing {} detection request",
            kind
        );

        match client.predict(&build_payload(&req)).await {
            Ok(body) => {
                info!(request_id, "{} detection completed successfully", kind);
                Ok(normalize(client.kind(), kind, &body))
            }
            Err(failure) => {
                log_masked_failure(client, request_id, &failure);
                let err = classify(failure, client.name(), client.kind(), client.timeout_ms());
                error!(
                    request_id,
                    service = client.name(),
                    status = err.http_status,
                    "{} detection failed: {}",
                    kind,
                    err.message
                );
                if self.expose_details {
                    Err(err)
                } else {
                    Err(err.without_detail())
                }
            }
        }
    }
}

/// Failures that are deliberately hidden from callers still reach operators
fn log_masked_failure(client: &DetectionClient, request_id: &str, failure: &UpstreamFailure) {
    if client.kind() != ProviderKind::Aggregator {
        return;
    }
    match failure {
        UpstreamFailure::Status { status, .. } if matches!(status, 401 | 403) => {
            warn!(
                request_id,
                upstream_status = *status,
                "{} rejected our credentials; reporting the service as unavailable",
                client.name()
            );
        }
        UpstreamFailure::MissingCredential => {
            warn!(
                request_id,
                "{} API key is not configured; set RAPIDAPI_KEY",
                client.name()
            );
        }
        _ => {}
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::VideoSource;
    use crate::errors::ErrorKind;
    use serde_json::json;
    use wiremock::matchers::{body_partial_json, method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    #[tokio::test]
    async fn test_detect_routes_video_url_to_video_service() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/predict"))
            .and(body_partial_json(json!({"input_type": "url"})))
            .respond_with(
                ResponseTemplate::new(200)
                    .set_body_json(json!({"prediction": "fake", "confidence": 0.9})),
            )
            .expect(1)
            .mount(&server)
            .await;

        let service = DetectionService::from_config(&AppConfig::for_tests(&server.uri())).unwrap();
        let result = service
            .detect(Payload::Video(VideoSource::sniff("https://x.test/v.mp4")))
            .await
            .unwrap();
        assert_eq!(result.content_kind, ContentKind::Video);
        assert!(result.is_fake);
    }

    #[tokio::test]
    async fn test_detect_hides_details_in_production() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .respond_with(ResponseTemplate::new(500).set_body_json(json!({"message": "boom"})))
            .mount(&server)
            .await;

        let mut config = AppConfig::for_tests(&server.uri());
        config.environment = "production".to_string();
        let service = DetectionService::from_config(&config).unwrap();

        let err = service
            .detect(Payload::Text("hello".into()))
            .await
            .unwrap_err();
        assert_eq!(err.kind, ErrorKind::UpstreamError);
        assert_eq!(err.http_status, 500);
        assert_eq!(err.message, "boom");
        assert!(err.detail.is_none());
    }

    #[tokio::test]
    async fn test_rapidapi_backend_masks_unauthorized() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/detect"))
            .respond_with(ResponseTemplate::new(401).set_body_json(json!({"message": "bad key"})))
            .mount(&server)
            .await;

        let mut config = AppConfig::for_tests(&server.uri());
        config.text_backend = TextBackend::RapidApi;
        config.rapidapi.api_key = "wrong".to_string();
        let service = DetectionService::from_config(&config).unwrap();

        let err = service
            .detect(Payload::Text("hello".into()))
            .await
            .unwrap_err();
        assert_eq!(err.kind, ErrorKind::Unavailable);
        assert_eq!(err.http_status, 500);
    }
}
