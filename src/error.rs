use thiserror::Error;

/// Failure of a single call to a collaborator (draft store, canonical source,
/// validator/mapper). Carries the raw HTTP status when the backend answered.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum CallError {
    #[error("{message}")]
    Status { status: u16, message: String },

    #[error("request timed out")]
    Timeout,

    #[error("transport failure: {0}")]
    Transport(String),
}

impl CallError {
    pub fn status(&self) -> Option<u16> {
        match self {
            CallError::Status { status, .. } => Some(*status),
            _ => None,
        }
    }

    pub(crate) fn from_reqwest(err: reqwest::Error) -> Self {
        if err.is_timeout() {
            CallError::Timeout
        } else {
            CallError::Transport(err.to_string())
        }
    }
}

/// Outcome of a read or write attempt, one variant per externally visible status.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum DraftError {
    #[error("{0}")]
    BadRequest(String),

    #[error("Draft not found")]
    NotFound,

    #[error("Draft content is invalid: {0}")]
    NotValid(String),

    #[error("Draft content-type is not supported: {0}")]
    ContentTypeUnsupported(String),

    #[error("Upstream service error: {0}")]
    Upstream(String),

    #[error("Content source returned an unexpected HTTP status code: {status}")]
    UpstreamStatus { status: u16 },

    #[error("Draft content request processing has timed out")]
    Timeout,

    #[error("Configuration error: {0}")]
    Configuration(String),
}

impl DraftError {
    /// HTTP status the caller receives for this outcome.
    pub fn status_code(&self) -> u16 {
        match self {
            DraftError::BadRequest(_) => 400,
            DraftError::NotFound => 404,
            DraftError::NotValid(_) => 422,
            DraftError::ContentTypeUnsupported(_) => 415,
            DraftError::Upstream(_) => 500,
            DraftError::UpstreamStatus { status } => *status,
            DraftError::Timeout => 504,
            DraftError::Configuration(_) => 500,
        }
    }

    /// Stable machine-readable code, used in error bodies and metric labels.
    pub fn kind(&self) -> &'static str {
        match self {
            DraftError::BadRequest(_) => "bad_request",
            DraftError::NotFound => "not_found",
            DraftError::NotValid(_) => "not_valid",
            DraftError::ContentTypeUnsupported(_) => "content_type_unsupported",
            DraftError::Upstream(_) => "upstream_error",
            DraftError::UpstreamStatus { .. } => "upstream_status",
            DraftError::Timeout => "timeout",
            DraftError::Configuration(_) => "configuration_error",
        }
    }
}

impl From<CallError> for DraftError {
    fn from(err: CallError) -> Self {
        match err {
            CallError::Timeout => DraftError::Timeout,
            other => DraftError::Upstream(other.to_string()),
        }
    }
}

pub type Result<T> = std::result::Result<T, DraftError>;
