use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::config::ConfigError;
use crate::draft::{DraftError, DraftField};
use crate::resource::ResourceKind;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ErrorKind {
    Network,
    Timeout,
    Authentication,
    Authorization,
    Validation,
    NotFound,
    Conflict,
    Server,
    Decode,
    ReferenceDataUnavailable,
    ReadOnly,
    Busy,
    Configuration,
    Unknown,
}

impl ErrorKind {
    #[must_use]
    pub const fn code(self) -> &'static str {
        match self {
            Self::Network => "NETWORK_ERROR",
            Self::Timeout => "TIMEOUT",
            Self::Authentication => "AUTH_ERROR",
            Self::Authorization => "FORBIDDEN",
            Self::Validation => "VALIDATION_ERROR",
            Self::NotFound => "NOT_FOUND",
            Self::Conflict => "CONFLICT",
            Self::Server => "SERVER_ERROR",
            Self::Decode => "DECODE_ERROR",
            Self::ReferenceDataUnavailable => "REFERENCE_DATA_UNAVAILABLE",
            Self::ReadOnly => "READ_ONLY",
            Self::Busy => "SUBMISSION_IN_FLIGHT",
            Self::Configuration => "CONFIG_ERROR",
            Self::Unknown => "UNKNOWN_ERROR",
        }
    }

    #[must_use]
    pub const fn is_retryable(self) -> bool {
        matches!(
            self,
            Self::Network
                | Self::Timeout
                | Self::Conflict
                | Self::Server
                | Self::ReferenceDataUnavailable
                | Self::Busy
        )
    }

    #[must_use]
    pub const fn from_status(status: u16) -> Self {
        match status {
            400 | 422 => Self::Validation,
            401 => Self::Authentication,
            403 => Self::Authorization,
            404 => Self::NotFound,
            408 => Self::Timeout,
            409 => Self::Conflict,
            500..=599 => Self::Server,
            _ => Self::Unknown,
        }
    }
}

/// Failure reported by the remote service, as shown to the user.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, Error)]
#[serde(rename_all = "camelCase")]
#[error("{message}")]
pub struct RemoteError {
    pub kind: ErrorKind,
    pub message: String,
    #[serde(default)]
    pub details: Option<String>,
    #[serde(default)]
    pub status: Option<u16>,
}

impl RemoteError {
    pub fn new(kind: ErrorKind, message: impl Into<String>) -> Self {
        Self {
            kind,
            message: message.into(),
            details: None,
            status: None,
        }
    }

    pub fn network(message: impl Into<String>) -> Self {
        Self::new(ErrorKind::Network, message)
    }

    #[must_use]
    pub fn with_details(mut self, details: impl Into<String>) -> Self {
        self.details = Some(details.into());
        self
    }

    #[must_use]
    pub const fn with_status(mut self, status: u16) -> Self {
        self.status = Some(status);
        self
    }

    /// Builds the error for a non-success HTTP response, reading the
    /// `{"error": {"message", "details"}}` envelope when the body carries one.
    #[must_use]
    pub fn from_http_status(status: u16, body: Option<&[u8]>) -> Self {
        let kind = ErrorKind::from_status(status);
        let envelope = body
            .and_then(|b| serde_json::from_slice::<ErrorEnvelope>(b).ok())
            .map(|e| e.error);

        let (message, details) = match envelope {
            Some(ErrorBody {
                message: Some(message),
                details,
            }) => (message, details),
            Some(ErrorBody {
                message: None,
                details,
            }) => (format!("Request failed with status {status}"), details),
            None => (format!("Request failed with status {status}"), None),
        };

        Self {
            kind,
            message,
            details,
            status: Some(status),
        }
    }
}

#[derive(Debug, Deserialize)]
struct ErrorEnvelope {
    error: ErrorBody,
}

#[derive(Debug, Deserialize)]
struct ErrorBody {
    #[serde(default)]
    message: Option<String>,
    #[serde(default)]
    details: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("missing required fields: {missing:?}")]
pub struct ValidationError {
    pub missing: Vec<DraftField>,
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum AdminError {
    #[error(transparent)]
    Validation(#[from] ValidationError),

    #[error("request failed: {0}")]
    Request(#[from] RemoteError),

    #[error("reference data for {resource} unavailable: {reason}")]
    ReferenceDataUnavailable {
        resource: ResourceKind,
        reason: String,
    },

    #[error("unexpected {resource} response: {reason}")]
    Decode {
        resource: ResourceKind,
        reason: String,
    },

    #[error("could not encode {resource} payload: {reason}")]
    Payload {
        resource: ResourceKind,
        reason: String,
    },

    #[error(transparent)]
    Draft(#[from] DraftError),

    #[error("{resource} is read-only for the current user")]
    Forbidden { resource: ResourceKind },

    #[error("a {resource} submission is already in flight")]
    Busy { resource: ResourceKind },

    #[error(transparent)]
    Config(#[from] ConfigError),
}

impl AdminError {
    #[must_use]
    pub fn kind(&self) -> ErrorKind {
        match self {
            Self::Validation(_) => ErrorKind::Validation,
            Self::Request(remote) => remote.kind,
            Self::ReferenceDataUnavailable { .. } => ErrorKind::ReferenceDataUnavailable,
            Self::Decode { .. } | Self::Payload { .. } => ErrorKind::Decode,
            Self::Draft(_) | Self::Forbidden { .. } => ErrorKind::ReadOnly,
            Self::Busy { .. } => ErrorKind::Busy,
            Self::Config(_) => ErrorKind::Configuration,
        }
    }

    #[must_use]
    pub fn code(&self) -> &'static str {
        self.kind().code()
    }

    #[must_use]
    pub fn is_retryable(&self) -> bool {
        self.kind().is_retryable()
    }

    /// Converts into the shape shown to the user; undecodable responses
    /// surface like any other failed request.
    #[must_use]
    pub fn into_remote(self) -> RemoteError {
        match self {
            Self::Request(remote) => remote,
            other => RemoteError::new(other.kind(), other.to_string()),
        }
    }
}

pub type AdminResult<T> = Result<T, AdminError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_error_envelope() {
        let body = br#"{"error":{"code":null,"message":"Name already taken","details":"Office 'Lobby' exists"}}"#;
        let err = RemoteError::from_http_status(409, Some(body.as_slice()));

        assert_eq!(err.kind, ErrorKind::Conflict);
        assert_eq!(err.message, "Name already taken");
        assert_eq!(err.details.as_deref(), Some("Office 'Lobby' exists"));
        assert_eq!(err.status, Some(409));
    }

    #[test]
    fn falls_back_when_body_is_not_an_envelope() {
        let err = RemoteError::from_http_status(502, Some(b"<html>bad gateway</html>".as_slice()));
        assert_eq!(err.kind, ErrorKind::Server);
        assert_eq!(err.message, "Request failed with status 502");
        assert!(err.details.is_none());
        assert!(err.kind.is_retryable());
    }

    #[test]
    fn envelope_without_message_keeps_details() {
        let err = RemoteError::from_http_status(400, Some(br#"{"error":{"details":"x"}}"#.as_slice()));
        assert_eq!(err.kind, ErrorKind::Validation);
        assert_eq!(err.details.as_deref(), Some("x"));
    }

    #[test]
    fn admin_error_codes() {
        let err: AdminError = ValidationError {
            missing: vec![DraftField::Name],
        }
        .into();
        assert_eq!(err.code(), "VALIDATION_ERROR");
        assert!(!err.is_retryable());

        let err = AdminError::ReferenceDataUnavailable {
            resource: ResourceKind::Region,
            reason: "timeout".into(),
        };
        assert_eq!(err.code(), "REFERENCE_DATA_UNAVAILABLE");
        assert!(err.is_retryable());
    }

    #[test]
    fn decode_errors_become_remote_errors() {
        let remote = AdminError::Decode {
            resource: ResourceKind::Office,
            reason: "missing field `id`".into(),
        }
        .into_remote();
        assert_eq!(remote.kind, ErrorKind::Decode);
        assert_eq!(
            remote.message,
            "unexpected office response: missing field `id`"
        );
    }
}
