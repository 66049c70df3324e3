/// Upstream detection provider clients
use crate::config::RapidApiConfig;
use crate::domain::ProviderKind;
use crate::errors::UpstreamFailure;
use reqwest::header::{HeaderMap, HeaderValue, CONTENT_TYPE};
use reqwest::{Client, Response};
use serde_json::Value;
use std::time::Duration;

/// HTTP client wrapper with common configuration
pub struct HttpClient {
    client: Client,
}

impl HttpClient {
    pub fn new(timeout: Duration) -> anyhow::Result<Self> {
        let mut headers = HeaderMap::new();
        headers.insert(CONTENT_TYPE, HeaderValue::from_static("application/json"));

        let client = Client::builder()
            .timeout(timeout)
            .user_agent("TruthGuard-API/1.0")
            .default_headers(headers)
            .build()?;
        Ok(Self { client })
    }

    pub fn get_client(&self) -> &Client {
        &self.client
    }
}

/// One configured upstream provider
pub struct DetectionClient {
    http_client: HttpClient,
    name: String,
    kind: ProviderKind,
    base_url: String,
    predict_url: String,
    health_url: String,
    rapidapi_host: String,
    api_key: String,
    timeout_ms: u64,
}

impl DetectionClient {
    /// Internal microservice exposing `POST /predict` and `GET /health`
    pub fn microservice(name: &str, base_url: &str, timeout: Duration) -> anyhow::Result<Self> {
        let base_url = base_url.trim_end_matches('/').to_string();
        Ok(Self {
            http_client: HttpClient::new(timeout)?,
            name: name.to_string(),
            kind: ProviderKind::Microservice,
            predict_url: format!("{}/predict", base_url),
            health_url: format!("{}/health", base_url),
            base_url,
            rapidapi_host: String::new(),
            api_key: String::new(),
            timeout_ms: timeout.as_millis() as u64,
        })
    }

    /// Third-party RapidAPI aggregator, authenticated per call
    pub fn aggregator(config: &RapidApiConfig, timeout: Duration) -> anyhow::Result<Self> {
        Ok(Self {
            http_client: HttpClient::new(timeout)?,
            name: "RapidAPI".to_string(),
            kind: ProviderKind::Aggregator,
            base_url: config.url.clone(),
            predict_url: config.url.clone(),
            health_url: config.url.clone(),
            rapidapi_host: config.host.clone(),
            api_key: config.api_key.clone(),
            timeout_ms: timeout.as_millis() as u64,
        })
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn kind(&self) -> ProviderKind {
        self.kind
    }

    /// Get base URL
    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    pub fn timeout_ms(&self) -> u64 {
        self.timeout_ms
    }

    fn authorize(&self, req: reqwest::RequestBuilder) -> reqwest::RequestBuilder {
        match self.kind {
            ProviderKind::Microservice => req,
            ProviderKind::Aggregator => req
                .header("X-RapidAPI-Key", &self.api_key)
                .header("X-RapidAPI-Host", &self.rapidapi_host),
        }
    }

    /// Send one detection payload and return the raw JSON object
    pub async fn predict(&self, payload: &Value) -> Result<Value, UpstreamFailure> {
        if self.kind == ProviderKind::Aggregator && self.api_key.is_empty() {
            return Err(UpstreamFailure::MissingCredential);
        }

        let resp = self
            .authorize(self.http_client.get_client().post(&self.predict_url))
            .json(payload)
            .send()
            .await?;

        if !resp.status().is_success() {
            return Err(status_failure(resp).await);
        }

        // Body reads can still time out or drop; only decoding is malformed
        let bytes = resp.bytes().await?;
        let json: Value = serde_json::from_slice(&bytes)
            .map_err(|e| UpstreamFailure::Malformed(e.to_string()))?;

        if !json.is_object() {
            return Err(UpstreamFailure::Malformed(
                "expected a JSON object".to_string(),
            ));
        }

        Ok(json)
    }

    /// Lightweight reachability check bounded by `timeout`
    pub async fn probe(&self, timeout: Duration) -> Result<(), String> {
        if self.kind == ProviderKind::Aggregator && self.api_key.is_empty() {
            return Err("RapidAPI key is not configured".to_string());
        }

        let resp = self
            .authorize(self.http_client.get_client().get(&self.health_url))
            .timeout(timeout)
            .send()
            .await
            .map_err(|e| e.to_string())?;

        let status = resp.status();
        let reachable = match self.kind {
            ProviderKind::Microservice => status.is_success(),
            // The aggregator has no health route; any non-5xx answer means it is up
            ProviderKind::Aggregator => !status.is_server_error(),
        };

        if reachable {
            Ok(())
        } else {
            Err(format!("health probe returned status {}", status))
        }
    }
}

async fn status_failure(resp: Response) -> UpstreamFailure {
    let status = resp.status().as_u16();
    let body = resp.json::<Value>().await.ok();
    UpstreamFailure::Status { status, body }
}
