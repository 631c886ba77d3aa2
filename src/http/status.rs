//! Classification of unsuccessful HTTP responses into user-facing errors.

use reqwest::header::HeaderMap;
use reqwest::{Response, StatusCode};
use thiserror::Error;

#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum HttpStatusError {
    #[error("Authentication failed (HTTP 401). Check your GITHUB_TOKEN.")]
    AuthenticationFailed,

    #[error(
        "Rate limit exceeded (HTTP {0}). Try again later or set GITHUB_TOKEN environment variable."
    )]
    RateLimitExceeded(u16),

    #[error("Access forbidden (HTTP 403). You may need authentication.")]
    Forbidden,

    #[error("Not found (HTTP 404): {0}")]
    NotFound(String),

    #[error("Request error: HTTP {0}")]
    ClientError(u16),

    #[error("Server error: HTTP {0}")]
    ServerError(u16),
}

impl HttpStatusError {
    pub fn classify(status: StatusCode, headers: &HeaderMap, url: &str) -> Self {
        match status {
            StatusCode::UNAUTHORIZED => HttpStatusError::AuthenticationFailed,
            StatusCode::FORBIDDEN if rate_limit_exhausted(headers) => {
                HttpStatusError::RateLimitExceeded(status.as_u16())
            }
            StatusCode::FORBIDDEN => HttpStatusError::Forbidden,
            StatusCode::TOO_MANY_REQUESTS => HttpStatusError::RateLimitExceeded(status.as_u16()),
            StatusCode::NOT_FOUND => HttpStatusError::NotFound(url.to_string()),
            s if s.is_client_error() => HttpStatusError::ClientError(s.as_u16()),
            s => HttpStatusError::ServerError(s.as_u16()),
        }
    }

    pub fn status(&self) -> u16 {
        match self {
            HttpStatusError::AuthenticationFailed => 401,
            HttpStatusError::RateLimitExceeded(code) => *code,
            HttpStatusError::Forbidden => 403,
            HttpStatusError::NotFound(_) => 404,
            HttpStatusError::ClientError(code) | HttpStatusError::ServerError(code) => *code,
        }
    }
}

// GitHub signals an exhausted quota on 403 through this header.
fn rate_limit_exhausted(headers: &HeaderMap) -> bool {
    headers
        .get("x-ratelimit-remaining")
        .and_then(|v| v.to_str().ok())
        .is_some_and(|v| v.trim() == "0")
}

/// Passes a 2xx response through; anything else becomes an [`HttpStatusError`].
pub fn check_status(response: Response) -> anyhow::Result<Response> {
    let status = response.status();
    if status.is_success() {
        return Ok(response);
    }
    let url = response.url().to_string();
    Err(HttpStatusError::classify(status, response.headers(), &url).into())
}
