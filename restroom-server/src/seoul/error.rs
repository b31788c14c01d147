//! Directory client error types.

/// Errors from the open-data directory client.
#[derive(Debug, thiserror::Error)]
pub enum DirectoryError {
    /// HTTP transport failed (connection refused, DNS, TLS, ...).
    #[error("HTTP error: {0}")]
    Http(reqwest::Error),

    /// The bounded wait elapsed before the upstream answered.
    #[error("upstream request timed out")]
    Timeout,

    /// The upstream answered with a non-success HTTP status.
    #[error("API error {status}: {message}")]
    Api { status: u16, message: String },

    /// The upstream answered 200 but with a failure result code in the body.
    #[error("upstream result {code}: {message}")]
    Upstream { code: String, message: String },

    /// Response body did not parse.
    #[error("JSON parse error: {message}")]
    Json { message: String },

    /// Client built without an API key.
    #[error("not configured: {0}")]
    NotConfigured(String),
}

impl DirectoryError {
    /// Split reqwest failures into timeout vs. transport errors, so callers
    /// can tell an unresponsive upstream from an unreachable one.
    pub(crate) fn from_reqwest(err: reqwest::Error) -> Self {
        if err.is_timeout() {
            Self::Timeout
        } else {
            Self::Http(err)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn error_display() {
        let err = DirectoryError::Timeout;
        assert_eq!(err.to_string(), "upstream request timed out");

        let err = DirectoryError::Api {
            status: 502,
            message: "Bad Gateway".into(),
        };
        assert_eq!(err.to_string(), "API error 502: Bad Gateway");

        let err = DirectoryError::Upstream {
            code: "INFO-200".into(),
            message: "해당하는 데이터가 없습니다.".into(),
        };
        assert!(err.to_string().contains("INFO-200"));
    }
}
