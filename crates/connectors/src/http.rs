//! HTTP plumbing shared by the concrete connectors

use std::time::Duration;

use chrono::{TimeZone, Utc};
use reqwest::header::HeaderMap;
use reqwest::StatusCode;

use crate::error::ConnectorError;
use crate::pagination::RateLimitInfo;

/// User agent sent with every request
pub(crate) const USER_AGENT: &str = concat!("tally-collector/", env!("CARGO_PKG_VERSION"));

/// Fallback suspension when a 429 carries no usable reset header
const DEFAULT_RATE_LIMIT_BACKOFF_SECS: i64 = 60;

/// Build the shared HTTP client
pub(crate) fn build_client(timeout_secs: u64) -> Result<reqwest::Client, ConnectorError> {
    reqwest::Client::builder()
        .user_agent(USER_AGENT)
        .timeout(Duration::from_secs(timeout_secs))
        .build()
        .map_err(|e| ConnectorError::Init(format!("HTTP client: {}", e)))
}

/// Parse `X-RateLimit-Remaining` / `X-RateLimit-Reset` (epoch seconds)
pub(crate) fn rate_limit_from_headers(headers: &HeaderMap) -> Option<RateLimitInfo> {
    let remaining = headers
        .get("x-ratelimit-remaining")?
        .to_str()
        .ok()?
        .parse()
        .ok()?;
    let reset_epoch: i64 = headers.get("x-ratelimit-reset")?.to_str().ok()?.parse().ok()?;
    let reset = Utc.timestamp_opt(reset_epoch, 0).single()?;
    Some(RateLimitInfo { remaining, reset })
}

/// Classify a non-success HTTP response into the connector error taxonomy
pub(crate) fn classify_status(response: reqwest::Response, entity: &str) -> ConnectorError {
    match response.status() {
        StatusCode::NOT_FOUND => ConnectorError::NotFound(entity.to_string()),
        StatusCode::UNAUTHORIZED | StatusCode::FORBIDDEN => {
            ConnectorError::AuthFailed("invalid or missing token".into())
        }
        StatusCode::TOO_MANY_REQUESTS => {
            let reset = rate_limit_from_headers(response.headers())
                .map(|rl| rl.reset)
                .unwrap_or_else(|| Utc::now() + chrono::Duration::seconds(DEFAULT_RATE_LIMIT_BACKOFF_SECS));
            ConnectorError::RateLimited { reset }
        }
        status if status.is_server_error() => ConnectorError::Transient {
            attempts: 1,
            last_error: format!("server error {} for {}", status, entity),
        },
        status => ConnectorError::Transient {
            attempts: 1,
            last_error: format!("unexpected status {} for {}", status, entity),
        },
    }
}
