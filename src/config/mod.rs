/// Application configuration module
use axum::http::HeaderValue;
use std::env;
use std::num::NonZeroU32;
use std::time::Duration;

#[derive(Clone, Debug)]
pub struct AppConfig {
    pub port: u16,
    pub environment: String,
    pub text_service_url: String,
    pub image_service_url: String,
    pub video_service_url: String,
    pub text_backend: TextBackend,
    pub rapidapi: RapidApiConfig,
    pub timeouts: Timeouts,
    pub rate_limit: RateLimitConfig,
    /// Single browser origin allowed to call the API with credentials
    pub cors_origin: HeaderValue,
}

/// Which provider answers text detection requests
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum TextBackend {
    Microservice,
    RapidApi,
}

#[derive(Clone, Debug)]
pub struct RapidApiConfig {
    pub url: String,
    pub host: String,
    /// Empty when not configured
    pub api_key: String,
}

#[derive(Clone, Debug)]
pub struct Timeouts {
    pub request_ms: u64,
    pub probe_ms: u64,
}

#[derive(Clone, Debug)]
pub struct RateLimitConfig {
    pub window_ms: u64,
    pub max_requests: NonZeroU32,
}

impl AppConfig {
    /// Load configuration from environment variables
    pub fn from_env() -> anyhow::Result<Self> {
        dotenvy::dotenv().ok();

        let port = env::var("PORT")
            .ok()
            .map(|s| s.parse::<u16>())
            .transpose()
            .map_err(|e| anyhow::anyhow!("invalid PORT: {}", e))?
            .unwrap_or(5000);

        let environment = env::var("NODE_ENV").unwrap_or_else(|_| "development".to_string());

        let text_backend = match env::var("TEXT_DETECTION_BACKEND")
            .unwrap_or_default()
            .to_ascii_lowercase()
            .as_str()
        {
            "" | "microservice" => TextBackend::Microservice,
            "rapidapi" => TextBackend::RapidApi,
            other => anyhow::bail!("unknown TEXT_DETECTION_BACKEND: {}", other),
        };

        let rapidapi = RapidApiConfig {
            url: env::var("RAPIDAPI_URL").unwrap_or_else(|_| {
                "https://fake-news-detection1.p.rapidapi.com/detect".to_string()
            }),
            host: env::var("RAPIDAPI_HOST")
                .unwrap_or_else(|_| "fake-news-detection1.p.rapidapi.com".to_string()),
            api_key: env::var("RAPIDAPI_KEY").unwrap_or_default(),
        };

        let request_ms = env_u64("API_TIMEOUT", 30_000);
        // Probes must give up well before a real request would
        let probe_ms = env_u64("HEALTH_PROBE_TIMEOUT", 5_000).min(request_ms);

        let cors_origin = env::var("CORS_ORIGIN")
            .unwrap_or_else(|_| "http://localhost:3000".to_string());
        let cors_origin = HeaderValue::from_str(&cors_origin)
            .map_err(|e| anyhow::anyhow!("invalid CORS_ORIGIN: {}", e))?;

        Ok(Self {
            port,
            environment,
            text_service_url: env_url("TEXT_SERVICE_URL", "http://localhost:6001"),
            image_service_url: env_url("IMAGE_SERVICE_URL", "http://localhost:6002"),
            video_service_url: env_url("VIDEO_SERVICE_URL", "http://localhost:6003"),
            text_backend,
            rapidapi,
            timeouts: Timeouts {
                request_ms,
                probe_ms,
            },
            rate_limit: RateLimitConfig {
                window_ms: env_u64("RATE_LIMIT_WINDOW_MS", 15 * 60 * 1000),
                max_requests: max_requests(env_u64("RATE_LIMIT_MAX_REQUESTS", 100))?,
            },
            cors_origin,
        })
    }

    /// Diagnostic error details are only exposed outside production
    pub fn expose_error_details(&self) -> bool {
        self.environment != "production"
    }

    pub fn request_timeout(&self) -> Duration {
        Duration::from_millis(self.timeouts.request_ms)
    }

    pub fn probe_timeout(&self) -> Duration {
        Duration::from_millis(self.timeouts.probe_ms)
    }
}

fn env_u64(key: &str, default: u64) -> u64 {
    env::var(key)
        .ok()
        .and_then(|s| s.parse().ok())
        .unwrap_or(default)
}

fn max_requests(raw: u64) -> anyhow::Result<NonZeroU32> {
    u32::try_from(raw)
        .ok()
        .and_then(NonZeroU32::new)
        .ok_or_else(|| {
            anyhow::anyhow!(
                "RATE_LIMIT_MAX_REQUESTS must be between 1 and {}, got {}",
                u32::MAX,
                raw
            )
        })
}

fn env_url(key: &str, default: &str) -> String {
    env::var(key)
        .map(|s| s.trim_end_matches('/').to_string())
        .unwrap_or_else(|_| default.to_string())
}

#[cfg(test)]
impl AppConfig {
    /// Configuration pointing every microservice at `base_url`
    pub fn for_tests(base_url: &str) -> Self {
        Self {
            port: 0,
            environment: "test".to_string(),
            text_service_url: base_url.to_string(),
            image_service_url: base_url.to_string(),
            video_service_url: base_url.to_string(),
            text_backend: TextBackend::Microservice,
            rapidapi: RapidApiConfig {
                url: format!("{}/detect", base_url),
                host: "fake-news.test".to_string(),
                api_key: String::new(),
            },
            timeouts: Timeouts {
                request_ms: 2_000,
                probe_ms: 500,
            },
            rate_limit: RateLimitConfig {
                window_ms: 60_000,
                max_requests: NonZeroU32::new(1_000).unwrap(),
            },
            cors_origin: HeaderValue::from_static("http://localhost:3000"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_expose_error_details_outside_production() {
        let mut config = AppConfig::for_tests("http://localhost:1");
        assert!(config.expose_error_details());
        config.environment = "production".to_string();
        assert!(!config.expose_error_details());
    }

    #[test]
    fn test_probe_timeout_is_shorter_than_request_timeout() {
        let config = AppConfig::for_tests("http://localhost:1");
        assert!(config.probe_timeout() < config.request_timeout());
    }

    #[test]
    fn test_max_requests_rejects_out_of_range() {
        assert_eq!(max_requests(100).unwrap().get(), 100);
        assert_eq!(max_requests(u32::MAX as u64).unwrap().get(), u32::MAX);
        assert!(max_requests(0).is_err());
        assert!(max_requests(4_294_967_296).is_err());
    }
}
