use std::time::Duration;

use thiserror::Error;

/// Raw failure returned by a directory collaborator call, before classification.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
#[error("remote call failed (status={status:?}): {message}")]
pub struct RemoteError {
    pub status: Option<u16>,
    /// Raw `Retry-After` header value, when the remote sent one.
    pub retry_after: Option<String>,
    pub message: String,
}

impl RemoteError {
    pub fn status(status: u16, message: impl Into<String>) -> Self {
        Self {
            status: Some(status),
            retry_after: None,
            message: message.into(),
        }
    }

    pub fn throttled(retry_after: Option<&str>) -> Self {
        Self {
            status: Some(429),
            retry_after: retry_after.map(str::to_string),
            message: "rate limited".to_string(),
        }
    }

    /// Failure with no HTTP status (connect error, timeout, undecodable body).
    pub fn transport(message: impl Into<String>) -> Self {
        Self {
            status: None,
            retry_after: None,
            message: message.into(),
        }
    }
}

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum DirectoryError {
    #[error("throttled by remote, retry after {retry_after:?}")]
    Throttled { retry_after: Duration },

    #[error("transient remote failure (status={status:?}): {message}")]
    Transient {
        status: Option<u16>,
        message: String,
    },

    #[error("terminal client error (status={status}): {message}")]
    TerminalClient { status: u16, message: String },

    #[error("pagination protocol violation: {0}")]
    ProtocolViolation(String),

    #[error("directory scope not configured: {0}")]
    Unconfigured(String),

    #[error("cancelled")]
    Cancelled,
}

impl DirectoryError {
    pub fn is_retryable(&self) -> bool {
        matches!(self, Self::Throttled { .. } | Self::Transient { .. })
    }

    pub fn status(&self) -> Option<u16> {
        match self {
            Self::Throttled { .. } => Some(429),
            Self::Transient { status, .. } => *status,
            Self::TerminalClient { status, .. } => Some(*status),
            _ => None,
        }
    }
}
