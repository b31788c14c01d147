//! Geocoding error types.

/// Errors from the geocoding client.
#[derive(Debug, thiserror::Error)]
pub enum GeocodeError {
    /// HTTP transport failed.
    #[error("HTTP error: {0}")]
    Http(reqwest::Error),

    /// The bounded wait elapsed before the upstream answered.
    #[error("geocoding request timed out")]
    Timeout,

    /// Credentials were rejected.
    #[error("geocoding credentials rejected")]
    Unauthorized,

    /// The upstream answered with a non-success status or error body.
    #[error("geocoding API error {status}: {message}")]
    Api { status: u16, message: String },

    /// Response body did not parse.
    #[error("JSON parse error: {message}")]
    Json { message: String },

    /// Client built without credentials.
    #[error("not configured: {0}")]
    NotConfigured(String),
}

impl GeocodeError {
    pub(crate) fn from_reqwest(err: reqwest::Error) -> Self {
        if err.is_timeout() {
            Self::Timeout
        } else {
            Self::Http(err)
        }
    }
}
