/// Message carried by [`ApiError::RetryExhausted`].
pub const RETRY_EXHAUSTED_MESSAGE: &str = "Max retries reached without success";

/// Error type returned by this crate.
///
/// Terminal variants (`Auth`, `Client`, `RetryExhausted`) are what a call
/// resolves to. `Server` and `Network` are transient and only reach the
/// caller as the source of a `RetryExhausted`.
#[derive(Debug, thiserror::Error)]
pub enum ApiError {
    /// 401 or 403. Never retried.
    #[error("error {status}: {message}")]
    Auth { status: u16, message: String },
    /// Any other non-success, non-5xx status. Never retried.
    #[error("error {status}: {message}")]
    Client { status: u16, message: String },
    /// 5xx status with raw response body.
    #[error("server error {status}: {body}")]
    Server { status: u16, body: String },
    /// Connection, timeout or body read failure from `reqwest`.
    #[error("network error: {0}")]
    Network(reqwest::Error),
    /// Every allowed attempt failed with a transient error.
    #[error("error 0: Max retries reached without success")]
    RetryExhausted {
        /// Attempts made, including the first one.
        attempts: usize,
        /// The transient failure seen on the final attempt.
        #[source]
        last: Box<ApiError>,
    },
    /// Request or policy rejected before any I/O.
    #[error("invalid input: {0}")]
    InvalidInput(String),
    /// Success body could not be decoded as the requested type.
    #[error("decode error: {0}")]
    Decode(String),
}

impl ApiError {
    /// HTTP status associated with the error.
    ///
    /// `Some(0)` is reserved for [`ApiError::RetryExhausted`]. Errors with no
    /// HTTP status at all (network, invalid input, decode) return `None`.
    pub fn status_code(&self) -> Option<u16> {
        match self {
            Self::Auth { status, .. } | Self::Client { status, .. } | Self::Server { status, .. } => {
                Some(*status)
            }
            Self::RetryExhausted { .. } => Some(0),
            Self::Network(_) | Self::InvalidInput(_) | Self::Decode(_) => None,
        }
    }

    pub fn message(&self) -> String {
        match self {
            Self::Auth { message, .. } | Self::Client { message, .. } => message.clone(),
            Self::Server { body, .. } => body.clone(),
            Self::Network(err) => err.to_string(),
            Self::RetryExhausted { .. } => RETRY_EXHAUSTED_MESSAGE.to_owned(),
            Self::InvalidInput(message) | Self::Decode(message) => message.clone(),
        }
    }

    /// Whether another attempt could plausibly succeed.
    pub fn is_transient(&self) -> bool {
        matches!(self, Self::Server { .. } | Self::Network(_))
    }
}
