use thiserror::Error;

use crate::transport::Method;

/// Failure of a single API call.
///
/// `HttpFailure` and `DecodeFailure` both reach the caller as a failed call;
/// they stay separate variants so logs can tell a rejected request from a
/// response of the wrong shape.
#[derive(Debug, Error)]
pub enum ApiError {
    #[error("{method} {path} failed with status {status}")]
    HttpFailure {
        method: Method,
        path: String,
        status: u16,
    },
    #[error("could not decode response of {method} {path}: {source}")]
    DecodeFailure {
        method: Method,
        path: String,
        #[source]
        source: serde_json::Error,
    },
    #[error("could not encode request body for {method} {path}: {source}")]
    EncodeFailure {
        method: Method,
        path: String,
        #[source]
        source: serde_json::Error,
    },
    #[error(transparent)]
    Transport(#[from] TransportError),
}

impl ApiError {
    /// HTTP status of a rejected request, if the server answered at all.
    pub fn status(&self) -> Option<u16> {
        match self {
            ApiError::HttpFailure { status, .. } => Some(*status),
            _ => None,
        }
    }

    pub fn is_http_failure(&self) -> bool {
        matches!(self, ApiError::HttpFailure { .. })
    }

    pub fn is_decode_failure(&self) -> bool {
        matches!(self, ApiError::DecodeFailure { .. })
    }
}

/// The request never produced a response.
#[derive(Debug, Error)]
#[error("request to {url} could not be completed: {reason}")]
pub struct TransportError {
    pub url: String,
    pub reason: String,
}

impl TransportError {
    pub fn new(url: impl Into<String>, reason: impl ToString) -> Self {
        TransportError {
            url: url.into(),
            reason: reason.to_string(),
        }
    }
}

/// Writing to or clearing the backing key-value store failed.
#[derive(Debug, Error)]
pub enum StorageError {
    #[error("local storage is not available: {0}")]
    Unavailable(String),
    #[error("could not write `{key}`: {reason}")]
    Write { key: String, reason: String },
    #[error("could not remove `{key}`: {reason}")]
    Remove { key: String, reason: String },
    #[error("could not read `{key}`: {reason}")]
    Read { key: String, reason: String },
    #[error("could not encode stored record: {0}")]
    Encode(#[from] serde_json::Error),
}
