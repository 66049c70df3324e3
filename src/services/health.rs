//! Concurrent provider health aggregation.

use crate::clients::DetectionClient;
use crate::domain::{HealthReport, ServiceHealth};
use crate::errors::{ApiError, ApiResult};
use chrono::Utc;
use futures::future::join_all;
use std::sync::Arc;
use std::time::{Duration, Instant};
use tracing::{debug, error};

pub struct HealthAggregator {
    providers: Vec<Arc<DetectionClient>>,
    probe_timeout: Duration,
}

impl HealthAggregator {
    pub fn new(providers: Vec<Arc<DetectionClient>>, probe_timeout: Duration) -> Self {
        Self {
            providers,
            probe_timeout,
        }
    }

    /// Probe every provider concurrently and wait for all of them.
    ///
    /// An unreachable provider only marks its own entry; the call itself fails
    /// only if a probe task could not be joined.
    pub async fn check_all(&self) -> ApiResult<HealthReport> {
        let handles = self.providers.iter().map(|provider| {
            let provider = provider.clone();
            let timeout = self.probe_timeout;
            tokio::spawn(async move { probe_one(&provider, timeout).await })
        });

        let services = join_all(handles)
            .await
            .into_iter()
            .collect::<Result<Vec<_>, _>>()
            .map_err(|e| {
                error!("Status check join failed: {}", e);
                ApiError::Internal {
                    error: "STATUS_CHECK_FAILED",
                    message: "Unable to check service status".to_string(),
                }
            })?;

        Ok(HealthReport::from_services(services))
    }
}

async fn probe_one(provider: &DetectionClient, timeout: Duration) -> ServiceHealth {
    let started = Instant::now();
    let outcome = provider.probe(timeout).await;
    let latency_ms = started.elapsed().as_millis() as u64;

    debug!(service = provider.name(), latency_ms, ok = outcome.is_ok(), "health probe finished");

    match outcome {
        Ok(()) => ServiceHealth {
            name: provider.name().to_string(),
            reachable: true,
            url: provider.base_url().to_string(),
            latency_ms: Some(latency_ms),
            checked_at: Utc::now(),
            error: None,
        },
        Err(e) => ServiceHealth {
            name: provider.name().to_string(),
            reachable: false,
            url: provider.base_url().to_string(),
            latency_ms: None,
            checked_at: Utc::now(),
            error: Some(e),
        },
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::OverallStatus;
    use wiremock::matchers::{method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    async fn healthy_server() -> MockServer {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/health"))
            .respond_with(ResponseTemplate::new(200))
            .mount(&server)
            .await;
        server
    }

    fn closed_port_url() -> String {
        let listener = std::net::TcpListener::bind("127.0.0.1:0").unwrap();
        let port = listener.local_addr().unwrap().port();
        drop(listener);
        format!("http://127.0.0.1:{}", port)
    }

    fn client(name: &str, url: &str) -> Arc<DetectionClient> {
        Arc::new(DetectionClient::microservice(name, url, Duration::from_secs(5)).unwrap())
    }

    #[tokio::test]
    async fn test_all_reachable_is_healthy() {
        let text = healthy_server().await;
        let image = healthy_server().await;
        let aggregator = HealthAggregator::new(
            vec![client("Text", &text.uri()), client("Image", &image.uri())],
            Duration::from_secs(1),
        );

        let report = aggregator.check_all().await.unwrap();
        assert_eq!(report.overall_status, OverallStatus::Healthy);
        assert!(report.services.iter().all(|s| s.latency_ms.is_some()));
    }

    #[tokio::test]
    async fn test_one_failing_probe_degrades_without_aborting_others() {
        let text = healthy_server().await;
        let image = healthy_server().await;
        let aggregator = HealthAggregator::new(
            vec![
                client("Text", &text.uri()),
                client("Image", &image.uri()),
                client("Video", &closed_port_url()),
            ],
            Duration::from_secs(1),
        );

        let report = aggregator.check_all().await.unwrap();
        assert_eq!(report.overall_status, OverallStatus::Degraded);
        assert_eq!(report.services.len(), 3);

        let video = report.services.iter().find(|s| s.name == "Video").unwrap();
        assert!(!video.reachable);
        assert!(video.error.is_some());
        assert_eq!(
            report.services.iter().filter(|s| s.reachable).count(),
            2
        );
    }

    #[tokio::test]
    async fn test_slow_probe_is_cut_off_by_probe_timeout() {
        let slow = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/health"))
            .respond_with(ResponseTemplate::new(200).set_delay(Duration::from_secs(2)))
            .mount(&slow)
            .await;

        let aggregator = HealthAggregator::new(
            vec![client("Text", &slow.uri())],
            Duration::from_millis(200),
        );

        let started = Instant::now();
        let report = aggregator.check_all().await.unwrap();
        assert!(started.elapsed() < Duration::from_secs(2));
        assert_eq!(report.overall_status, OverallStatus::Degraded);
    }
}
