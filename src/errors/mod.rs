/// Unified error handling module
use crate::domain::ProviderKind;
use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use chrono::Utc;
use serde::Serialize;
use serde_json::{json, Value};
use thiserror::Error;

/// Stable taxonomy of upstream failures
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    Unavailable,
    Timeout,
    UpstreamError,
    Unknown,
}

/// Classified upstream failure, always relayed straight to the caller
#[derive(Debug, Clone, Error)]
#[error("{service} service error ({http_status}): {message}")]
pub struct ServiceError {
    pub kind: ErrorKind,
    pub service: String,
    pub message: String,
    pub http_status: u16,
    pub detail: Option<Value>,
}

impl ServiceError {
    /// Machine-readable code for the `error` field
    pub fn code(&self) -> &'static str {
        match self.kind {
            ErrorKind::Unavailable => "SERVICE_UNAVAILABLE",
            ErrorKind::Timeout => "REQUEST_TIMEOUT",
            ErrorKind::UpstreamError if self.http_status == 429 => "RATE_LIMITED",
            ErrorKind::UpstreamError => "UPSTREAM_ERROR",
            ErrorKind::Unknown => "UNKNOWN_ERROR",
        }
    }

    pub fn without_detail(mut self) -> Self {
        self.detail = None;
        self
    }

    fn unavailable(service: &str, http_status: u16, status: &str, reason: Option<String>) -> Self {
        Self {
            kind: ErrorKind::Unavailable,
            service: service.to_string(),
            message: format!(
                "{} detection service is currently unavailable. Please try again later.",
                service
            ),
            http_status,
            detail: Some(json!({
                "service": service,
                "status": status,
                "error": reason,
                "timestamp": Utc::now(),
            })),
        }
    }
}

/// Raw shape of a failed upstream call, before classification
#[derive(Debug)]
pub enum UpstreamFailure {
    /// Connection refused, DNS lookup failure
    Connect(String),
    Timeout,
    /// Upstream answered with a non-success status
    Status { status: u16, body: Option<Value> },
    /// Upstream answered 2xx but the body was not a JSON object
    Malformed(String),
    /// Required credential absent, detected before any call
    MissingCredential,
    Other(String),
}

impl From<reqwest::Error> for UpstreamFailure {
    fn from(err: reqwest::Error) -> Self {
        if err.is_connect() {
            UpstreamFailure::Connect(err.to_string())
        } else if err.is_timeout() {
            UpstreamFailure::Timeout
        } else if let Some(status) = err.status() {
            UpstreamFailure::Status {
                status: status.as_u16(),
                body: None,
            }
        } else if err.is_decode() {
            UpstreamFailure::Malformed(err.to_string())
        } else {
            UpstreamFailure::Other(err.to_string())
        }
    }
}

/// Map a failed call to exactly one `ServiceError`. First match wins:
/// transport refusal, timeout, upstream status, then everything else.
pub fn classify(
    failure: UpstreamFailure,
    service: &str,
    provider: ProviderKind,
    timeout_ms: u64,
) -> ServiceError {
    match failure {
        UpstreamFailure::Connect(reason) => {
            ServiceError::unavailable(service, 503, "offline", Some(reason))
        }
        UpstreamFailure::Timeout => ServiceError {
            kind: ErrorKind::Timeout,
            service: service.to_string(),
            message: format!(
                "{} detection service timed out. The content may be too large or complex.",
                service
            ),
            http_status: 504,
            detail: Some(json!({
                "service": service,
                "timeout": timeout_ms,
                "timestamp": Utc::now(),
            })),
        },
        UpstreamFailure::Status { status, body } => {
            classify_status(status, body, service, provider)
        }
        UpstreamFailure::Malformed(reason) => ServiceError {
            kind: ErrorKind::UpstreamError,
            service: service.to_string(),
            message: format!("{} service returned a malformed response", service),
            http_status: 500,
            detail: Some(json!({
                "service": service,
                "error": reason,
                "timestamp": Utc::now(),
            })),
        },
        UpstreamFailure::MissingCredential => {
            ServiceError::unavailable(service, 500, "unconfigured", None)
        }
        UpstreamFailure::Other(reason) => ServiceError {
            kind: ErrorKind::Unknown,
            service: service.to_string(),
            message: format!(
                "An unexpected error occurred while processing your request with {} service",
                service
            ),
            http_status: 500,
            detail: Some(json!({
                "service": service,
                "error": reason,
                "timestamp": Utc::now(),
            })),
        },
    }
}

fn classify_status(
    status: u16,
    body: Option<Value>,
    service: &str,
    provider: ProviderKind,
) -> ServiceError {
    if provider == ProviderKind::Aggregator && matches!(status, 401 | 403) {
        // Aggregator auth failures never reach the caller as client errors
        return ServiceError::unavailable(service, 500, "offline", None);
    }

    let upstream_message = body
        .as_ref()
        .and_then(|b| crate::utils::s_pick(b, &["message", "error", "detail"]));

    let message = match (provider, status) {
        (ProviderKind::Aggregator, 429) => upstream_message.unwrap_or_else(|| {
            format!("{} rate limit exceeded. Please try again later.", service)
        }),
        _ => upstream_message.unwrap_or_else(|| format!("{} service returned an error", service)),
    };

    let http_status = if (400..=599).contains(&status) {
        status
    } else {
        500
    };

    ServiceError {
        kind: ErrorKind::UpstreamError,
        service: service.to_string(),
        message,
        http_status,
        detail: Some(json!({
            "service": service,
            "statusCode": status,
            "serviceError": body,
            "timestamp": Utc::now(),
        })),
    }
}

/// Unified error response format
#[derive(Debug, Serialize)]
pub struct ErrorResponse {
    pub success: bool,
    pub error: String,
    pub message: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub service: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub details: Option<Value>,
}

#[derive(Debug, Error)]
pub enum ApiError {
    #[error(transparent)]
    Service(#[from] ServiceError),
    #[error("{error}: {message}")]
    InvalidInput {
        error: &'static str,
        message: String,
    },
    #[error("{error}: {message}")]
    NotFound {
        error: &'static str,
        message: String,
    },
    #[error("request body exceeds the size limit")]
    TooLarge,
    #[error("{error}: {message}")]
    Internal {
        error: &'static str,
        message: String,
    },
}

impl ApiError {
    pub fn invalid(error: &'static str, message: impl Into<String>) -> Self {
        ApiError::InvalidInput {
            error,
            message: message.into(),
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let (status, body) = match self {
            ApiError::Service(e) => (
                StatusCode::from_u16(e.http_status).unwrap_or(StatusCode::INTERNAL_SERVER_ERROR),
                ErrorResponse {
                    success: false,
                    error: e.code().to_string(),
                    message: e.message,
                    service: Some(e.service),
                    details: e.detail,
                },
            ),
            ApiError::InvalidInput { error, message } => (
                StatusCode::BAD_REQUEST,
                plain_error(error, message),
            ),
            ApiError::NotFound { error, message } => {
                (StatusCode::NOT_FOUND, plain_error(error, message))
            }
            ApiError::TooLarge => (
                StatusCode::PAYLOAD_TOO_LARGE,
                plain_error(
                    "Payload too large",
                    "Request body exceeds maximum size limit".to_string(),
                ),
            ),
            ApiError::Internal { error, message } => (
                StatusCode::INTERNAL_SERVER_ERROR,
                plain_error(error, message),
            ),
        };

        (status, Json(body)).into_response()
    }
}

fn plain_error(error: &str, message: String) -> ErrorResponse {
    ErrorResponse {
        success: false,
        error: error.to_string(),
        message,
        service: None,
        details: None,
    }
}

/// Type alias for API results
pub type ApiResult<T> = Result<T, ApiError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_connection_refused_is_unavailable() {
        let err = classify(
            UpstreamFailure::Connect("connection refused".into()),
            "Text",
            ProviderKind::Microservice,
            30_000,
        );
        assert_eq!(err.kind, ErrorKind::Unavailable);
        assert_eq!(err.http_status, 503);
        assert_eq!(err.code(), "SERVICE_UNAVAILABLE");
        assert_eq!(err.detail.unwrap()["error"], "connection refused");
    }

    #[test]
    fn test_timeout_is_gateway_timeout() {
        let err = classify(
            UpstreamFailure::Timeout,
            "Video",
            ProviderKind::Microservice,
            30_000,
        );
        assert_eq!(err.kind, ErrorKind::Timeout);
        assert_eq!(err.http_status, 504);
        assert_eq!(err.detail.unwrap()["timeout"], 30_000);
    }

    #[test]
    fn test_upstream_status_is_copied_with_body_message() {
        let err = classify(
            UpstreamFailure::Status {
                status: 422,
                body: Some(json!({"message": "image too small"})),
            },
            "Image",
            ProviderKind::Microservice,
            30_000,
        );
        assert_eq!(err.kind, ErrorKind::UpstreamError);
        assert_eq!(err.http_status, 422);
        assert_eq!(err.message, "image too small");
    }

    #[test]
    fn test_upstream_status_out_of_range_becomes_500() {
        let err = classify(
            UpstreamFailure::Status {
                status: 302,
                body: None,
            },
            "Text",
            ProviderKind::Microservice,
            30_000,
        );
        assert_eq!(err.http_status, 500);
        assert_eq!(err.message, "Text service returned an error");
    }

    #[test]
    fn test_microservice_401_is_not_masked() {
        let err = classify(
            UpstreamFailure::Status {
                status: 401,
                body: None,
            },
            "Text",
            ProviderKind::Microservice,
            30_000,
        );
        assert_eq!(err.kind, ErrorKind::UpstreamError);
        assert_eq!(err.http_status, 401);
    }

    #[test]
    fn test_aggregator_auth_failure_is_masked() {
        for status in [401, 403] {
            let err = classify(
                UpstreamFailure::Status {
                    status,
                    body: Some(json!({"message": "Invalid API key"})),
                },
                "RapidAPI",
                ProviderKind::Aggregator,
                30_000,
            );
            assert_eq!(err.kind, ErrorKind::Unavailable);
            assert_eq!(err.http_status, 500);
            assert!(!err.message.contains("API key"));
        }
    }

    #[test]
    fn test_aggregator_rate_limit_is_preserved() {
        let err = classify(
            UpstreamFailure::Status {
                status: 429,
                body: None,
            },
            "RapidAPI",
            ProviderKind::Aggregator,
            30_000,
        );
        assert_eq!(err.kind, ErrorKind::UpstreamError);
        assert_eq!(err.http_status, 429);
        assert_eq!(err.code(), "RATE_LIMITED");
    }

    #[test]
    fn test_missing_credential_is_unavailable_500() {
        let err = classify(
            UpstreamFailure::MissingCredential,
            "RapidAPI",
            ProviderKind::Aggregator,
            30_000,
        );
        assert_eq!(err.kind, ErrorKind::Unavailable);
        assert_eq!(err.http_status, 500);
    }

    #[test]
    fn test_unexpected_failure_is_unknown() {
        let err = classify(
            UpstreamFailure::Other("builder error".into()),
            "Text",
            ProviderKind::Microservice,
            30_000,
        );
        assert_eq!(err.kind, ErrorKind::Unknown);
        assert_eq!(err.http_status, 500);
    }

    #[test]
    fn test_without_detail_strips_diagnostics() {
        let err = classify(
            UpstreamFailure::Timeout,
            "Text",
            ProviderKind::Microservice,
            1_000,
        )
        .without_detail();
        assert!(err.detail.is_none());
    }

    #[test]
    fn test_service_error_response_uses_upstream_status() {
        let err = classify(
            UpstreamFailure::Connect("refused".into()),
            "Text",
            ProviderKind::Microservice,
            1_000,
        );
        let response = ApiError::from(err).into_response();
        assert_eq!(response.status(), StatusCode::SERVICE_UNAVAILABLE);
    }
}
