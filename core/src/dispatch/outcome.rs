use std::time::Duration;

use crate::error::{DirectoryError, RemoteError};

/// Result of one dispatched call, with the failure already classified.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DispatchOutcome<T> {
    Success(T),
    Throttled {
        retry_after: Duration,
    },
    Transient {
        status: Option<u16>,
        message: String,
    },
    Terminal {
        status: u16,
        message: String,
    },
    Cancelled,
}

impl<T> DispatchOutcome<T> {
    /// Classify a raw remote failure. 429 is a throttle whose wait comes from
    /// `Retry-After` (integer seconds) or `fallback`; 400..=409 is terminal;
    /// everything else is transient.
    pub fn from_remote(err: RemoteError, fallback: Duration) -> Self {
        match err.status {
            Some(429) => Self::Throttled {
                retry_after: err
                    .retry_after
                    .as_deref()
                    .and_then(parse_retry_after)
                    .unwrap_or(fallback),
            },
            Some(status @ 400..=409) => Self::Terminal {
                status,
                message: err.message,
            },
            status => Self::Transient {
                status,
                message: err.message,
            },
        }
    }

    pub fn is_success(&self) -> bool {
        matches!(self, Self::Success(_))
    }

    pub fn into_result(self) -> Result<T, DirectoryError> {
        match self {
            Self::Success(v) => Ok(v),
            Self::Throttled { retry_after } => Err(DirectoryError::Throttled { retry_after }),
            Self::Transient { status, message } => {
                Err(DirectoryError::Transient { status, message })
            }
            Self::Terminal { status, message } => {
                Err(DirectoryError::TerminalClient { status, message })
            }
            Self::Cancelled => Err(DirectoryError::Cancelled),
        }
    }
}

/// Parse a `Retry-After` header given as whole seconds.
pub fn parse_retry_after(raw: &str) -> Option<Duration> {
    raw.trim().parse::<u64>().ok().map(Duration::from_secs)
}
