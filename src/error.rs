use std::io;

use thiserror::Error;

use crate::status::StatusCode;

#[derive(Debug, Error, Clone, Copy, PartialEq, Eq)]
#[error("invalid http status code `{0}`, expected 100..=599")]
pub struct InvalidStatusCode(pub u16);

/// Rejection of a header mutation made through [`crate::Header`].
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum HeaderError {
    #[error("response already committed, headers can no longer be changed")]
    Committed,
    #[error("header `{0}` is managed by the framework and can not be set directly")]
    Protected(String),
    #[error("invalid header name `{0}`")]
    InvalidName(String),
    #[error("invalid value for header `{0}`")]
    InvalidValue(String),
}

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum ReleaseError {
    #[error("status line already written")]
    AlreadyCommitted,
    #[error("invalid content type `{0:?}`")]
    InvalidContentType(String),
}

#[derive(Debug, Error)]
pub enum TemplateError {
    #[error("template `{template}` references missing key `{key}`")]
    MissingKey { template: String, key: String },
    #[error(transparent)]
    Io(#[from] io::Error),
}

/// Failure reported by a [`crate::Dispatcher`]. The response could not be
/// produced safely.
#[derive(Debug, Error)]
pub enum DispatchError {
    #[error("template rendering failed: {0}")]
    Template(#[from] TemplateError),
    #[error("json encoding failed: {0}")]
    Json(#[from] serde_json::Error),
    #[error("release failed: {0}")]
    Release(#[from] ReleaseError),
    #[error("body write failed: {0}")]
    Io(#[from] io::Error),
    #[error("this dispatcher does not execute templates")]
    TemplatesUnsupported,
}

/// Error returned by the response-producing operations of
/// [`crate::ResponseWriter`].
#[derive(Debug, Error)]
pub enum ResponseError {
    #[error("dispatcher failed: {0}")]
    Dispatch(#[from] DispatchError),
    #[error("`{0}` is not a server error status")]
    NotServerError(StatusCode),
    #[error("`{0}` is not a redirect status")]
    NotRedirect(StatusCode),
    #[error("protocol violation: a response was already committed for this request")]
    AlreadyCommitted,
    #[error("protocol violation: dispatcher returned without releasing the response")]
    NotReleased,
    #[error(transparent)]
    Header(#[from] HeaderError),
    #[error("can not serialize template data: {0}")]
    Serialize(serde_json::Error),
    #[error(transparent)]
    Io(#[from] io::Error),
}

impl ResponseError {
    /// Protocol violations are programming errors in a handler or a
    /// dispatcher, never request-time conditions.
    pub fn is_protocol_violation(&self) -> bool {
        matches!(self, Self::AlreadyCommitted | Self::NotReleased)
    }
}

impl From<ReleaseError> for ResponseError {
    fn from(value: ReleaseError) -> Self {
        match value {
            ReleaseError::AlreadyCommitted => Self::AlreadyCommitted,
            other => Self::Dispatch(DispatchError::Release(other)),
        }
    }
}
