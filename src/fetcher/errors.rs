use thiserror::Error;

#[derive(Error, Debug)]
pub enum FetchError {
    #[error("content extraction is not configured: FIRECRAWL_API_KEY is missing")]
    MissingApiKey,

    #[error("connect timeout")]
    ConnectTimeout,

    #[error("request timeout")]
    RequestTimeout,

    #[error("connection failed: {0}")]
    Connect(String),

    #[error("content extraction failed with status {status}: {message}")]
    Http {
        status: reqwest::StatusCode,
        message: String,
    },

    #[error("content extraction was unsuccessful: {0}")]
    Unsuccessful(String),

    #[error("could not decode content extraction response: {0}")]
    Decode(String),

    #[error("unknown: {0}")]
    Unknown(String),
}

impl FetchError {
    /// Configuration problems are reported differently from upstream failures.
    pub fn is_configuration(&self) -> bool {
        matches!(self, Self::MissingApiKey)
    }

    /// Upstream status, when the failure carried one.
    pub fn status(&self) -> Option<reqwest::StatusCode> {
        match self {
            Self::Http { status, .. } => Some(*status),
            _ => None,
        }
    }

    pub fn from_reqwest_error(err: reqwest::Error) -> Self {
        if err.is_timeout() {
            if err.is_connect() {
                Self::ConnectTimeout
            } else {
                Self::RequestTimeout
            }
        } else if let Some(status) = err.status() {
            Self::Http {
                status,
                message: err.to_string(),
            }
        } else if err.is_connect() || err.is_request() {
            Self::Connect(err.to_string())
        } else if err.is_decode() {
            Self::Decode(err.to_string())
        } else {
            Self::Unknown(err.to_string())
        }
    }
}
