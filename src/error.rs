// Error taxonomy: translates HTTP status codes, service error codes and
// transport failures into the messages shown to the user, and defines the
// single error type every service in this crate returns.

use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::fmt;
use thiserror::Error;

pub type Result<T> = std::result::Result<T, MintError>;

/// Error codes the service puts in the `code` field of an error body.
/// Codes this client does not know about map to `Unknown`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorCode {
    NotAuthorized,
    TokenNotProvided,
    InvalidToken,
    InvalidSignature,
    ExpiredToken,
    InvalidCredentials,
    InvalidFormat,
    InternalServerError,
    ConflictError,
    DocumentNotFound,
    DocumentNotSameStation,
    DocumentNotSameCustomer,
    DocumentNotProcessed,
    Unknown,
}

const KNOWN_CODES: [ErrorCode; 13] = [
    ErrorCode::NotAuthorized,
    ErrorCode::TokenNotProvided,
    ErrorCode::InvalidToken,
    ErrorCode::InvalidSignature,
    ErrorCode::ExpiredToken,
    ErrorCode::InvalidCredentials,
    ErrorCode::InvalidFormat,
    ErrorCode::InternalServerError,
    ErrorCode::ConflictError,
    ErrorCode::DocumentNotFound,
    ErrorCode::DocumentNotSameStation,
    ErrorCode::DocumentNotSameCustomer,
    ErrorCode::DocumentNotProcessed,
];

impl ErrorCode {
    /// Map the raw `code` string of an error body onto the known codes.
    pub fn from_raw(raw: &str) -> Self {
        KNOWN_CODES
            .into_iter()
            .find(|code| code.as_str() == raw)
            .unwrap_or(ErrorCode::Unknown)
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            ErrorCode::NotAuthorized => "NOT_AUTHORIZED",
            ErrorCode::TokenNotProvided => "TOKEN_NOT_PROVIDED",
            ErrorCode::InvalidToken => "INVALID_TOKEN",
            ErrorCode::InvalidSignature => "INVALID_SIGNATURE",
            ErrorCode::ExpiredToken => "EXPIRED_TOKEN",
            ErrorCode::InvalidCredentials => "INVALID_CREDENTIALS",
            ErrorCode::InvalidFormat => "INVALID_FORMAT",
            ErrorCode::InternalServerError => "INTERNAL_SERVER_ERROR",
            ErrorCode::ConflictError => "CONFLICT_ERROR",
            ErrorCode::DocumentNotFound => "DOCUMENT_NOT_FOUND",
            ErrorCode::DocumentNotSameStation => "DOCUMENT_NOT_SAME_STATION",
            ErrorCode::DocumentNotSameCustomer => "DOCUMENT_NOT_SAME_CUSTOMER",
            ErrorCode::DocumentNotProcessed => "DOCUMENT_NOT_PROCESSED",
            ErrorCode::Unknown => "UNKNOWN",
        }
    }
}

impl fmt::Display for ErrorCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Body the service returns alongside a non-2xx status. Every field is
/// optional so a partial body still yields whatever detail it carries.
/// `code` is kept verbatim, including codes this client does not know.
#[derive(Serialize, Deserialize, Debug, Clone, Default, PartialEq)]
pub struct ErrorResponse {
    #[serde(default)]
    pub title: Option<String>,
    #[serde(default)]
    pub detail: Option<String>,
    #[serde(default)]
    pub code: Option<String>,
    #[serde(default)]
    pub status: Option<u16>,
}

impl ErrorResponse {
    pub fn error_code(&self) -> Option<ErrorCode> {
        self.code.as_deref().map(ErrorCode::from_raw)
    }
}

/// Discriminant of [`MintError`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    /// Rejected locally before any request was made.
    Validation,
    /// The request never produced an HTTP response.
    Transport,
    /// The service answered with a non-2xx status.
    Api,
    /// The service answered 2xx but the body broke the contract.
    Protocol,
}

#[derive(Error, Debug)]
pub enum MintError {
    #[error("{message}")]
    Validation { message: String },

    #[error("{message}")]
    Transport {
        message: String,
        detail: Option<String>,
    },

    #[error("{message}")]
    Api {
        message: String,
        status: u16,
        code: Option<String>,
        detail: Option<String>,
    },

    #[error("{message}")]
    Protocol {
        message: String,
        detail: Option<String>,
    },
}

impl MintError {
    pub fn validation(message: impl Into<String>) -> Self {
        MintError::Validation {
            message: message.into(),
        }
    }

    pub fn protocol(message: impl Into<String>, detail: Option<String>) -> Self {
        MintError::Protocol {
            message: message.into(),
            detail,
        }
    }

    /// Build an API error for a non-2xx response from its status and raw body.
    pub fn from_response(status: u16, body: &str) -> Self {
        let parsed = parse_error_response(body).unwrap_or_default();
        MintError::Api {
            message: translate_error_code(status, parsed.error_code()),
            status,
            code: parsed.code,
            detail: parsed.detail,
        }
    }

    /// Build a transport error from the description of a failed request.
    pub fn transport(description: impl Into<String>) -> Self {
        let description = description.into();
        MintError::Transport {
            message: transport_message(&description).to_string(),
            detail: Some(description),
        }
    }

    pub fn kind(&self) -> ErrorKind {
        match self {
            MintError::Validation { .. } => ErrorKind::Validation,
            MintError::Transport { .. } => ErrorKind::Transport,
            MintError::Api { .. } => ErrorKind::Api,
            MintError::Protocol { .. } => ErrorKind::Protocol,
        }
    }

    /// True for errors raised on behalf of the service: non-2xx responses and
    /// 2xx responses that violate the contract.
    pub fn is_api(&self) -> bool {
        matches!(self.kind(), ErrorKind::Api | ErrorKind::Protocol)
    }

    pub fn message(&self) -> &str {
        match self {
            MintError::Validation { message }
            | MintError::Transport { message, .. }
            | MintError::Api { message, .. }
            | MintError::Protocol { message, .. } => message,
        }
    }

    pub fn status(&self) -> Option<u16> {
        match self {
            MintError::Api { status, .. } => Some(*status),
            _ => None,
        }
    }

    /// The service error code exactly as it was sent.
    pub fn code(&self) -> Option<&str> {
        match self {
            MintError::Api { code, .. } => code.as_deref(),
            _ => None,
        }
    }

    pub fn error_code(&self) -> Option<ErrorCode> {
        self.code().map(ErrorCode::from_raw)
    }

    pub fn detail(&self) -> Option<&str> {
        match self {
            MintError::Validation { .. } => None,
            MintError::Transport { detail, .. }
            | MintError::Api { detail, .. }
            | MintError::Protocol { detail, .. } => detail.as_deref(),
        }
    }
}

impl From<reqwest::Error> for MintError {
    fn from(err: reqwest::Error) -> Self {
        let message = if err.is_timeout() {
            TIMED_OUT
        } else if err.is_connect() {
            CANNOT_CONNECT
        } else {
            transport_message(&error_chain(&err))
        };
        MintError::Transport {
            message: message.to_string(),
            detail: Some(error_chain(&err)),
        }
    }
}

const CANNOT_CONNECT: &str = "cannot connect to the server";
const TIMED_OUT: &str = "request timed out";
const CONNECTION_ERROR: &str = "connection error";
const COMMUNICATION_FAILURE: &str = "error communicating with the server";

/// Map a service status and optional error code to the user-facing message.
pub fn translate_error_code(status: u16, code: Option<ErrorCode>) -> String {
    let message = match (status, code) {
        (401, Some(ErrorCode::InvalidCredentials)) => "invalid credentials",
        (401, Some(ErrorCode::TokenNotProvided)) => "token not provided",
        (401, _) => "token invalid or expired",
        (403, _) => "access denied",
        (404, _) => "service unavailable",
        (422, Some(ErrorCode::InvalidFormat)) => "invalid request format",
        (422, Some(ErrorCode::DocumentNotFound)) => "document not found",
        (422, Some(ErrorCode::DocumentNotSameStation)) => {
            "document not available for this station"
        }
        (422, Some(ErrorCode::DocumentNotSameCustomer)) => {
            "document not available for this customer"
        }
        (422, Some(ErrorCode::DocumentNotProcessed)) => "document not yet processed",
        (422, _) => "invalid input data",
        (s, _) if s >= 500 => "server error",
        (s, _) => return format!("communication error (code: {})", s),
    };
    message.to_string()
}

/// Parse an error body. Anything that is not a JSON object yields `None`.
/// Fields are read one by one, so a mistyped field is dropped without losing
/// the others; `status` is also accepted as a numeric string.
pub fn parse_error_response(body: &str) -> Option<ErrorResponse> {
    let value: Value = serde_json::from_str(body).ok()?;
    let object = value.as_object()?;
    let text = |key: &str| object.get(key).and_then(Value::as_str).map(str::to_string);
    let status = object.get("status").and_then(|status| match status {
        Value::Number(n) => n.as_u64().and_then(|n| u16::try_from(n).ok()),
        Value::String(s) => s.trim().parse().ok(),
        _ => None,
    });
    Some(ErrorResponse {
        title: text("title"),
        detail: text("detail"),
        code: text("code"),
        status,
    })
}

/// Classify a transport failure by its description.
pub fn transport_message(description: &str) -> &'static str {
    let description = description.to_lowercase();
    if description.contains("timed out") || description.contains("timeout") {
        TIMED_OUT
    } else if description.contains("connection refused")
        || description.contains("error trying to connect")
        || description.contains("dns error")
        || description.contains("failed to lookup")
    {
        CANNOT_CONNECT
    } else if description.contains("connection") {
        CONNECTION_ERROR
    } else {
        COMMUNICATION_FAILURE
    }
}

// reqwest hides the interesting part (refused, reset, dns) in the source chain.
fn error_chain(err: &(dyn std::error::Error + 'static)) -> String {
    let mut text = err.to_string();
    let mut source = err.source();
    while let Some(inner) = source {
        text.push_str(": ");
        text.push_str(&inner.to_string());
        source = inner.source();
    }
    text
}
