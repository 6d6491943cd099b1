//! Provider error taxonomy.
//!
//! Adapter failures are never globally fatal: the scheduler isolates them
//! per provider and per cycle. The taxonomy exists so the fetch helper can
//! decide what to retry and the scheduler what to count.

use thiserror::Error;

/// Errors produced by provider adapters and the shared fetch helper.
#[derive(Debug, Error)]
pub enum ProviderError {
    /// Network-level failure (connect, DNS, TLS).
    #[error("network error: {0}")]
    Network(String),

    /// The request hit the per-request timeout.
    #[error("request timeout: {0}")]
    Timeout(String),

    /// Upstream answered with a non-success status.
    #[error("upstream HTTP {status}: {message}")]
    Api {
        /// HTTP status code.
        status: u16,
        /// Short context, usually the URL.
        message: String,
    },

    /// The response body could not be decoded into the expected shape.
    #[error("parse error: {0}")]
    Parse(String),

    /// The headless-browser session died mid-cycle.
    #[error("browser session lost: {0}")]
    SessionLost(String),

    /// Startup configuration problem. The only fatal kind.
    #[error("configuration error: {0}")]
    Configuration(String),
}

impl ProviderError {
    /// Creates an API error from a status code and context.
    pub fn api(status: u16, message: impl Into<String>) -> Self {
        Self::Api {
            status,
            message: message.into(),
        }
    }

    /// True when a bounded retry may help. Client errors (4xx) and parse
    /// failures never retry.
    #[must_use]
    pub fn is_transient(&self) -> bool {
        match self {
            Self::Network(_) | Self::Timeout(_) => true,
            Self::Api { status, .. } => *status >= 500 || *status == 429,
            _ => false,
        }
    }

    /// Suggested delay before the next attempt, if any.
    #[must_use]
    pub fn retry_delay(&self) -> Option<std::time::Duration> {
        match self {
            Self::Network(_) | Self::Timeout(_) => Some(std::time::Duration::from_millis(500)),
            Self::Api { status, .. } if *status >= 500 => {
                Some(std::time::Duration::from_secs(1))
            }
            Self::Api { status: 429, .. } => Some(std::time::Duration::from_secs(2)),
            _ => None,
        }
    }
}

impl From<reqwest::Error> for ProviderError {
    fn from(err: reqwest::Error) -> Self {
        if err.is_timeout() {
            Self::Timeout(err.to_string())
        } else if err.is_decode() {
            Self::Parse(err.to_string())
        } else if err.is_connect() {
            Self::Network(format!("connection failed: {err}"))
        } else {
            Self::Network(err.to_string())
        }
    }
}

impl From<serde_json::Error> for ProviderError {
    fn from(err: serde_json::Error) -> Self {
        Self::Parse(err.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    // ==================== Transience Tests ====================

    #[test]
    fn test_network_and_timeout_are_transient() {
        assert!(ProviderError::Network("refused".into()).is_transient());
        assert!(ProviderError::Timeout("30s".into()).is_transient());
    }

    #[test]
    fn test_server_errors_are_transient() {
        assert!(ProviderError::api(500, "oops").is_transient());
        assert!(ProviderError::api(503, "busy").is_transient());
        assert!(ProviderError::api(429, "slow down").is_transient());
    }

    #[test]
    fn test_client_errors_never_retry() {
        let err = ProviderError::api(404, "gone");
        assert!(!err.is_transient());
        assert!(err.retry_delay().is_none());

        assert!(!ProviderError::api(400, "bad").is_transient());
        assert!(!ProviderError::api(403, "blocked").is_transient());
    }

    #[test]
    fn test_parse_and_session_errors_never_retry() {
        assert!(!ProviderError::Parse("bad json".into()).is_transient());
        assert!(!ProviderError::SessionLost("tab crashed".into()).is_transient());
    }

    #[test]
    fn test_retry_delays() {
        assert!(ProviderError::Network("x".into()).retry_delay().is_some());
        assert_eq!(
            ProviderError::api(502, "x").retry_delay(),
            Some(std::time::Duration::from_secs(1))
        );
    }
}
