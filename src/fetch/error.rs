use thiserror::Error;

/// Failure of a single fetch attempt, split along the retry boundary:
/// network-level and 5xx failures are transient, everything else is final.
#[derive(Debug, Clone, Error)]
pub enum FetchError {
    /// Request never produced a response (DNS, connect refused, reset, socket timeout).
    #[error("network error: {0}")]
    Network(String),

    /// Server-side failure (5xx).
    #[error("server error: status {status}")]
    Server { status: u16 },

    /// Request rejected by the server (4xx). Never retried.
    #[error("request rejected: status {status}: {message}")]
    Rejected { status: u16, message: String },

    /// Response body was not valid JSON. Never retried.
    #[error("malformed response: {0}")]
    Malformed(String),
}

impl FetchError {
    /// Whether a retry could plausibly succeed.
    pub fn is_transient(&self) -> bool {
        matches!(self, FetchError::Network(_) | FetchError::Server { .. })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn network_and_server_errors_are_transient() {
        assert!(FetchError::Network("connection refused".into()).is_transient());
        assert!(FetchError::Server { status: 500 }.is_transient());
        assert!(FetchError::Server { status: 503 }.is_transient());
    }

    #[test]
    fn rejections_and_malformed_bodies_are_final() {
        let rejected = FetchError::Rejected {
            status: 404,
            message: "not found".into(),
        };
        assert!(!rejected.is_transient());
        assert!(!FetchError::Malformed("expected value at line 1".into()).is_transient());
    }

    #[test]
    fn display_includes_status() {
        let err = FetchError::Rejected {
            status: 404,
            message: "no such user".into(),
        };
        assert_eq!(err.to_string(), "request rejected: status 404: no such user");
        assert_eq!(
            FetchError::Server { status: 502 }.to_string(),
            "server error: status 502"
        );
    }
}
