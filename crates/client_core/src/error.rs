use std::collections::BTreeMap;

use shared::{
    domain::{RecordKind, UnknownRecordKind},
    error::{ApiErrorBody, ErrorCode},
    protocol::InvalidAuditRequest,
};
use thiserror::Error;

/// Every failure a record-kind client can report. Cloneable so controllers
/// can keep the error as view state and still hand it back to the caller.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum ClientError {
    #[error("request failed: {message}")]
    Transport {
        status: Option<u16>,
        message: String,
    },
    #[error("not found: {message}")]
    NotFound { message: String },
    #[error("unauthorized: {message}")]
    Unauthorized { message: String },
    #[error("forbidden: {message}")]
    Forbidden { message: String },
    #[error("validation failed: {message}")]
    Validation {
        message: String,
        field_errors: BTreeMap<String, String>,
    },
    #[error("conflict: {message}")]
    Conflict { message: String },
    #[error("malformed response: {0}")]
    Decode(String),
    #[error("unknown record kind: {0}")]
    UnknownKind(String),
    #[error("invalid api base url '{url}': {reason}")]
    InvalidBaseUrl { url: String, reason: String },
    #[error("deleting {kind} requires an approval id and a reason")]
    MissingAudit { kind: RecordKind },
    #[error("invalid audit fields: {0}")]
    InvalidAudit(#[from] InvalidAuditRequest),
    #[error("{kind} has no command named '{name}'")]
    UnknownCommand { kind: RecordKind, name: String },
    #[error("command '{command}' on {kind} requires a reason")]
    MissingReason { kind: RecordKind, command: String },
    #[error("field '{field}' of {kind} is owned by the '{command}' command")]
    GuardedField {
        kind: RecordKind,
        field: String,
        command: &'static str,
    },
}

impl ClientError {
    /// Maps a non-success HTTP status and its body onto the taxonomy.
    pub fn from_status(status: u16, body: &[u8]) -> Self {
        let parsed = ApiErrorBody::parse(body);
        let message = parsed
            .summary()
            .map(str::to_string)
            .unwrap_or_else(|| format!("server responded with status {status}"));

        match ErrorCode::from_status(status) {
            ErrorCode::NotFound => ClientError::NotFound { message },
            ErrorCode::Unauthorized => ClientError::Unauthorized { message },
            ErrorCode::Forbidden => ClientError::Forbidden { message },
            ErrorCode::Validation => ClientError::Validation {
                field_errors: parsed.field_errors(),
                message,
            },
            ErrorCode::Conflict => ClientError::Conflict { message },
            ErrorCode::Internal => ClientError::Transport {
                status: Some(status),
                message,
            },
        }
    }

    pub fn transport(message: impl Into<String>) -> Self {
        ClientError::Transport {
            status: None,
            message: message.into(),
        }
    }

    pub fn status(&self) -> Option<u16> {
        match self {
            ClientError::Transport { status, .. } => *status,
            ClientError::NotFound { .. } => Some(404),
            ClientError::Unauthorized { .. } => Some(401),
            ClientError::Forbidden { .. } => Some(403),
            ClientError::Validation { .. } => Some(422),
            ClientError::Conflict { .. } => Some(409),
            _ => None,
        }
    }

    /// Network failures and 5xx responses; the only class worth retrying.
    pub fn is_transient(&self) -> bool {
        matches!(self, ClientError::Transport { .. })
    }

    pub fn is_not_found(&self) -> bool {
        matches!(self, ClientError::NotFound { .. })
    }

    pub fn is_forbidden(&self) -> bool {
        matches!(self, ClientError::Forbidden { .. })
    }

    pub fn field_errors(&self) -> Option<&BTreeMap<String, String>> {
        match self {
            ClientError::Validation { field_errors, .. } => Some(field_errors),
            _ => None,
        }
    }
}

impl From<UnknownRecordKind> for ClientError {
    fn from(value: UnknownRecordKind) -> Self {
        ClientError::UnknownKind(value.0)
    }
}

impl From<reqwest::Error> for ClientError {
    fn from(value: reqwest::Error) -> Self {
        ClientError::Transport {
            status: value.status().map(|status| status.as_u16()),
            message: value.to_string(),
        }
    }
}

impl From<serde_json::Error> for ClientError {
    fn from(value: serde_json::Error) -> Self {
        ClientError::Decode(value.to_string())
    }
}
