/// Client-specific result type
pub type Result<T> = std::result::Result<T, CaptionClientError>;

/// Errors from the caption client
#[derive(Debug, thiserror::Error)]
pub enum CaptionClientError {
    /// Request was rejected locally before anything was sent
    #[error("invalid request: {0}")]
    Validation(String),

    /// Request could not be sent or no response was received
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    /// Server answered but reported a failure
    #[error("server error ({status}): {message}")]
    Server {
        /// HTTP status code
        status: u16,
        /// Message extracted from the response body
        message: String,
    },

    /// Response body could not be decoded
    #[error("failed to parse response: {0}")]
    Parse(String),

    /// Invalid configuration or unreadable input file
    #[error("invalid configuration: {0}")]
    Config(String),
}

/// Coarse failure classes exposed to callers
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    /// Neither topic nor image was supplied
    Validation,
    /// Network failure before a response arrived
    Transport,
    /// A response arrived but signalled failure or was malformed
    Server,
    /// Local setup problem
    Config,
}

impl CaptionClientError {
    /// Failure class of this error
    pub const fn kind(&self) -> ErrorKind {
        match self {
            Self::Validation(_) => ErrorKind::Validation,
            Self::Http(_) => ErrorKind::Transport,
            Self::Server { .. } | Self::Parse(_) => ErrorKind::Server,
            Self::Config(_) => ErrorKind::Config,
        }
    }

    /// Whether the request was rejected before any network call
    pub const fn is_validation(&self) -> bool {
        matches!(self, Self::Validation(_))
    }
}
