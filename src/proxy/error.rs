use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use serde_json::json;
use thiserror::Error;

use crate::util::UrlValidationError;

/// Failures surfaced to proxy clients as `{"error": "<message>"}`.
#[derive(Debug, Error)]
pub enum ProxyError {
    /// `category` absent or empty. 400.
    #[error("Missing required parameter: category")]
    MissingCategory,

    /// Query string could not be decoded (e.g. a repeated parameter). 400.
    /// Carries the extractor's message.
    #[error("{0}")]
    InvalidQuery(String),

    /// No upstream credential configured. 500.
    #[error("API key not configured")]
    MissingApiKey,

    /// Upstream answered 426. Passed through as 426.
    #[error("API Plan Limit Reached: Upgrade Required")]
    PlanLimit,

    /// Any other non-2xx from upstream. Same status is returned.
    #[error("Failed to fetch news: {} {reason}", status.as_u16())]
    Upstream { status: StatusCode, reason: String },

    /// Transport, timeout, size, or decode failure. 500.
    #[error("Server error: {0}")]
    Server(String),
}

impl ProxyError {
    pub fn status(&self) -> StatusCode {
        match self {
            Self::MissingCategory | Self::InvalidQuery(_) => StatusCode::BAD_REQUEST,
            Self::PlanLimit => StatusCode::UPGRADE_REQUIRED,
            Self::Upstream { status, .. } => *status,
            Self::MissingApiKey | Self::Server(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl IntoResponse for ProxyError {
    fn into_response(self) -> Response {
        (self.status(), Json(json!({ "error": self.to_string() }))).into_response()
    }
}

/// Errors building the upstream client at startup.
#[derive(Debug, Error)]
pub enum SetupError {
    #[error("Invalid upstream base URL: {0}")]
    BaseUrl(#[from] UrlValidationError),

    #[error("Failed to build HTTP client: {0}")]
    Client(#[from] reqwest::Error),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_status_mapping() {
        assert_eq!(ProxyError::MissingCategory.status(), StatusCode::BAD_REQUEST);
        assert_eq!(
            ProxyError::InvalidQuery("duplicate field `category`".into()).status(),
            StatusCode::BAD_REQUEST
        );
        assert_eq!(ProxyError::MissingApiKey.status(), StatusCode::INTERNAL_SERVER_ERROR);
        assert_eq!(ProxyError::PlanLimit.status(), StatusCode::UPGRADE_REQUIRED);
        assert_eq!(
            ProxyError::Upstream {
                status: StatusCode::FORBIDDEN,
                reason: "Forbidden".into()
            }
            .status(),
            StatusCode::FORBIDDEN
        );
    }

    #[test]
    fn test_messages() {
        let err = ProxyError::Upstream {
            status: StatusCode::NOT_FOUND,
            reason: "Not Found".into(),
        };
        assert_eq!(err.to_string(), "Failed to fetch news: 404 Not Found");
        assert_eq!(
            ProxyError::Server("connection refused".into()).to_string(),
            "Server error: connection refused"
        );
    }
}
