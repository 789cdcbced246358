//! Errors coming back from the Twitter API, classified for the pages
use std::time::{SystemTime, UNIX_EPOCH};

use thiserror::Error;

use crate::twitter_object::ErrorResponse;

// https://developer.twitter.com/en/support/twitter-api/error-troubleshooting
const AUTH_ERROR_CODES: [i64; 4] = [32, 89, 135, 215];
const NOT_FOUND_ERROR_CODES: [i64; 3] = [34, 50, 63];
const RATE_LIMIT_ERROR_CODE: i64 = 88;

#[derive(Debug, Error)]
pub enum ApiError {
    #[error("authentication rejected: {0}")]
    Auth(String),
    #[error("no such user: {0}")]
    NotFound(String),
    /// Credentials are fine but the account is off limits, e.g. protected tweets
    #[error("not authorized to view {0}")]
    NotAuthorized(String),
    #[error("rate limit exceeded")]
    RateLimited {
        /// seconds until the window resets, when known
        retry_after: Option<u64>,
    },
    #[error("network error: {0}")]
    Network(String),
    #[error("decode error: {0}")]
    Decode(String),
    #[error("server returned error {status}: {message}")]
    Api { status: u16, message: String },
}

impl ApiError {
    /// Classify a non-2xx response
    /// * status: HTTP status code
    /// * body: raw response body, may be empty or not JSON
    /// * subject: screen name the request was about
    /// * rate_limit_reset: value of `x-rate-limit-reset` (epoch seconds) if present
    pub fn from_response(
        status: u16,
        body: &str,
        subject: &str,
        rate_limit_reset: Option<&str>,
    ) -> ApiError {
        let parsed: ErrorResponse = serde_json::from_str(body).unwrap_or_default();
        let has_code = |codes: &[i64]| parsed.codes().any(|c| codes.contains(&c));
        let message = parsed
            .message()
            .unwrap_or_else(|| format!("HTTP {}", status));

        if status == 429 || has_code(&[RATE_LIMIT_ERROR_CODE][..]) {
            ApiError::RateLimited {
                retry_after: rate_limit_reset.and_then(seconds_until),
            }
        } else if status == 404 || has_code(&NOT_FOUND_ERROR_CODES[..]) {
            ApiError::NotFound(subject.to_string())
        } else if has_code(&AUTH_ERROR_CODES[..]) {
            ApiError::Auth(message)
        } else if status == 401 {
            ApiError::NotAuthorized(subject.to_string())
        } else {
            ApiError::Api { status, message }
        }
    }

    /// A 401 on a request about our own account means the credentials are bad
    pub fn about_credentials(self) -> ApiError {
        match self {
            ApiError::NotAuthorized(key) => {
                ApiError::Auth(format!("not authorized as consumer {}", key))
            }
            e => e,
        }
    }
}

impl From<ureq::Transport> for ApiError {
    fn from(e: ureq::Transport) -> Self {
        ApiError::Network(e.to_string())
    }
}

fn seconds_until(reset: &str) -> Option<u64> {
    let reset: u64 = reset.trim().parse().ok()?;
    let now = SystemTime::now().duration_since(UNIX_EPOCH).ok()?.as_secs();
    Some(reset.saturating_sub(now))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn too_many_requests_is_rate_limited() {
        let err = ApiError::from_response(
            429,
            r#"{"errors":[{"code":88,"message":"Rate limit exceeded"}]}"#,
            "parrt",
            Some("0"),
        );
        assert!(matches!(err, ApiError::RateLimited { retry_after: Some(0) }));
    }

    #[test]
    fn unknown_user_is_not_found() {
        let err = ApiError::from_response(
            404,
            r#"{"errors":[{"code":34,"message":"Sorry, that page does not exist."}]}"#,
            "nobody",
            None,
        );
        assert!(matches!(err, ApiError::NotFound(ref name) if name == "nobody"));
    }

    #[test]
    fn suspended_user_is_not_found() {
        let err = ApiError::from_response(
            403,
            r#"{"errors":[{"code":63,"message":"User has been suspended."}]}"#,
            "suspended",
            None,
        );
        assert!(matches!(err, ApiError::NotFound(_)));
    }

    #[test]
    fn bad_token_is_auth() {
        let err = ApiError::from_response(
            401,
            r#"{"errors":[{"code":89,"message":"Invalid or expired token."}]}"#,
            "parrt",
            None,
        );
        assert!(matches!(err, ApiError::Auth(ref m) if m == "Invalid or expired token."));
    }

    #[test]
    fn protected_timeline_is_not_an_auth_failure() {
        let err = ApiError::from_response(401, r#"{"error":"Not authorized."}"#, "locked", None);
        assert!(matches!(err, ApiError::NotAuthorized(ref name) if name == "locked"));
    }

    #[test]
    fn unauthorized_own_account_is_auth() {
        let err = ApiError::from_response(401, "", "consumer-key", None).about_credentials();
        assert!(matches!(err, ApiError::Auth(_)));
        let err = ApiError::from_response(503, "", "consumer-key", None).about_credentials();
        assert!(matches!(err, ApiError::Api { status: 503, .. }));
    }

    #[test]
    fn other_status_keeps_the_code() {
        let err = ApiError::from_response(503, "Service Unavailable", "parrt", None);
        assert!(matches!(err, ApiError::Api { status: 503, .. }));
    }
}
