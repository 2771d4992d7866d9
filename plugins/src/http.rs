//! Shared plumbing for the outbound HTTP collaborators: error shape, body
//! previews and JSON decoding.
use serde_json::Value;
use std::{error::Error as StdError, fmt};

use taskbridge_core::api::RemoteError;

const BODY_PREVIEW_LIMIT: usize = 512;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ApiHttpErrorKind {
    Timeout,
    Connect,
    Request,
    Body,
    Decode,
    Status,
    Unknown,
}

impl ApiHttpErrorKind {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Timeout => "timeout",
            Self::Connect => "connect",
            Self::Request => "request",
            Self::Body => "body",
            Self::Decode => "decode",
            Self::Status => "status",
            Self::Unknown => "unknown",
        }
    }
}

impl fmt::Display for ApiHttpErrorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug)]
pub struct ApiHttpError {
    kind: ApiHttpErrorKind,
    status: Option<u16>,
    retry_after: Option<String>,
    url: Option<String>,
    message: String,
    source: Option<anyhow::Error>,
}

impl ApiHttpError {
    pub fn kind(&self) -> ApiHttpErrorKind {
        self.kind
    }

    pub fn status(&self) -> Option<u16> {
        self.status
    }

    pub fn url(&self) -> Option<&str> {
        self.url.as_deref()
    }

    pub fn retry_after(&self) -> Option<&str> {
        self.retry_after.as_deref()
    }

    pub(crate) fn from_reqwest(err: reqwest::Error, url: String) -> Self {
        let kind = if err.is_timeout() {
            ApiHttpErrorKind::Timeout
        } else if err.is_connect() {
            ApiHttpErrorKind::Connect
        } else if err.is_request() {
            ApiHttpErrorKind::Request
        } else if err.is_body() {
            ApiHttpErrorKind::Body
        } else if err.is_decode() {
            ApiHttpErrorKind::Decode
        } else {
            ApiHttpErrorKind::Unknown
        };
        let status = err.status().map(|s| s.as_u16());
        let message = err.to_string();
        ApiHttpError {
            kind,
            status,
            retry_after: None,
            url: Some(url),
            message,
            source: Some(anyhow::Error::new(err)),
        }
    }

    pub(crate) fn status_error(
        status: u16,
        url: String,
        retry_after: Option<String>,
        preview: String,
    ) -> Self {
        ApiHttpError {
            kind: ApiHttpErrorKind::Status,
            status: Some(status),
            retry_after,
            url: Some(url),
            message: preview,
            source: None,
        }
    }

    pub(crate) fn decode_error(
        status: u16,
        url: String,
        err: serde_json::Error,
        preview: String,
    ) -> Self {
        let message = format!("failed to decode response body: {} | body={}", err, preview);
        ApiHttpError {
            kind: ApiHttpErrorKind::Decode,
            status: Some(status),
            retry_after: None,
            url: Some(url),
            message,
            source: Some(anyhow::Error::new(err)),
        }
    }
}

impl fmt::Display for ApiHttpError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "http error kind={}", self.kind)?;
        if let Some(status) = self.status {
            write!(f, " status={}", status)?;
        }
        if let Some(url) = &self.url {
            write!(f, " url={}", url)?;
        }
        write!(f, ": {}", self.message)
    }
}

impl StdError for ApiHttpError {
    fn source(&self) -> Option<&(dyn StdError + 'static)> {
        self.source
            .as_ref()
            .map(|err| &**err as &(dyn StdError + 'static))
    }
}

/// Status errors keep their status (and `Retry-After`) so the dispatcher can
/// classify them. A body that fails to decode on a 2xx is a transport-level
/// failure: the call may be retried.
impl From<ApiHttpError> for RemoteError {
    fn from(err: ApiHttpError) -> Self {
        let message = err.to_string();
        match (err.kind, err.status) {
            (ApiHttpErrorKind::Status, Some(status)) => RemoteError {
                status: Some(status),
                retry_after: err.retry_after,
                message,
            },
            _ => RemoteError::transport(message),
        }
    }
}

pub(crate) fn preview_body(body: &str) -> String {
    let trimmed = body.trim();
    if trimmed.is_empty() {
        return "<empty body>".to_string();
    }

    let mut out = String::new();
    let mut truncated = false;
    for (idx, ch) in trimmed.chars().enumerate() {
        if idx >= BODY_PREVIEW_LIMIT {
            truncated = true;
            break;
        }
        out.push(ch);
    }

    if truncated {
        out.push_str("...");
    }

    out
}

pub(crate) async fn parse_json_response(resp: reqwest::Response) -> Result<Value, ApiHttpError> {
    let status = resp.status();
    let url = resp.url().to_string();
    let retry_after = resp
        .headers()
        .get(reqwest::header::RETRY_AFTER)
        .and_then(|v| v.to_str().ok())
        .map(str::to_string);
    let body = resp
        .text()
        .await
        .map_err(|err| ApiHttpError::from_reqwest(err, url.clone()))?;

    if !status.is_success() {
        let preview = preview_body(&body);
        return Err(ApiHttpError::status_error(
            status.as_u16(),
            url,
            retry_after,
            preview,
        ));
    }

    if body.trim().is_empty() {
        return Ok(Value::Null);
    }

    serde_json::from_str::<Value>(&body).map_err(|err| {
        let preview = preview_body(&body);
        ApiHttpError::decode_error(status.as_u16(), url, err, preview)
    })
}
