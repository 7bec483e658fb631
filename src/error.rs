// Error handling module
// Defines error types and their machine-readable codes

use serde_json::{json, Value};
use std::fmt;
use std::str::FromStr;
use thiserror::Error;

/// Category half of an error code (`<type>:<surface>`).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorType {
    BadRequest,
    Unauthorized,
    Forbidden,
    NotFound,
    RateLimit,
    Offline,
}

/// Where the failure surfaced.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Surface {
    Chat,
    Auth,
    Api,
    Stream,
    Database,
    History,
    Vote,
    Document,
    Suggestions,
}

impl ErrorType {
    pub fn as_str(&self) -> &'static str {
        match self {
            ErrorType::BadRequest => "bad_request",
            ErrorType::Unauthorized => "unauthorized",
            ErrorType::Forbidden => "forbidden",
            ErrorType::NotFound => "not_found",
            ErrorType::RateLimit => "rate_limit",
            ErrorType::Offline => "offline",
        }
    }

    /// HTTP status conventionally paired with this category
    pub fn status_code(&self) -> u16 {
        match self {
            ErrorType::BadRequest => 400,
            ErrorType::Unauthorized => 401,
            ErrorType::Forbidden => 403,
            ErrorType::NotFound => 404,
            ErrorType::RateLimit => 429,
            ErrorType::Offline => 503,
        }
    }

    /// Best-effort category for a raw HTTP status
    pub fn from_status(status: u16) -> Self {
        match status {
            401 => ErrorType::Unauthorized,
            403 => ErrorType::Forbidden,
            404 => ErrorType::NotFound,
            429 => ErrorType::RateLimit,
            502..=504 => ErrorType::Offline,
            _ => ErrorType::BadRequest,
        }
    }
}

impl Surface {
    pub fn as_str(&self) -> &'static str {
        match self {
            Surface::Chat => "chat",
            Surface::Auth => "auth",
            Surface::Api => "api",
            Surface::Stream => "stream",
            Surface::Database => "database",
            Surface::History => "history",
            Surface::Vote => "vote",
            Surface::Document => "document",
            Surface::Suggestions => "suggestions",
        }
    }
}

impl FromStr for ErrorType {
    type Err = ();

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s {
            "bad_request" => Ok(ErrorType::BadRequest),
            "unauthorized" => Ok(ErrorType::Unauthorized),
            "forbidden" => Ok(ErrorType::Forbidden),
            "not_found" => Ok(ErrorType::NotFound),
            "rate_limit" => Ok(ErrorType::RateLimit),
            "offline" => Ok(ErrorType::Offline),
            _ => Err(()),
        }
    }
}

impl FromStr for Surface {
    type Err = ();

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s {
            "chat" => Ok(Surface::Chat),
            "auth" => Ok(Surface::Auth),
            "api" => Ok(Surface::Api),
            "stream" => Ok(Surface::Stream),
            "database" => Ok(Surface::Database),
            "history" => Ok(Surface::History),
            "vote" => Ok(Surface::Vote),
            "document" => Ok(Surface::Document),
            "suggestions" => Ok(Surface::Suggestions),
            _ => Err(()),
        }
    }
}

/// Machine-readable error code such as `offline:chat`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ErrorCode {
    pub error_type: ErrorType,
    pub surface: Surface,
}

impl ErrorCode {
    pub const OFFLINE_CHAT: ErrorCode = ErrorCode::new(ErrorType::Offline, Surface::Chat);

    pub const fn new(error_type: ErrorType, surface: Surface) -> Self {
        Self {
            error_type,
            surface,
        }
    }

    pub fn status_code(&self) -> u16 {
        self.error_type.status_code()
    }
}

impl fmt::Display for ErrorCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}", self.error_type.as_str(), self.surface.as_str())
    }
}

impl FromStr for ErrorCode {
    type Err = ();

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        let (error_type, surface) = s.split_once(':').ok_or(())?;
        Ok(ErrorCode::new(error_type.parse()?, surface.parse()?))
    }
}

/// Errors surfaced by the bridge utilities. History conversion itself never fails.
#[derive(Error, Debug)]
pub enum ApiError {
    /// Non-2xx response from the agent service or the chat API
    #[error("Request failed ({code}){}", format_cause(.cause))]
    ChatError {
        code: ErrorCode,
        cause: Option<String>,
    },

    /// Network unreachable or connection refused
    #[error("You appear to be offline. Check your connection and try again.")]
    Offline,

    /// UI model id with no backend counterpart
    #[error("Model is not mapped to a backend model: {0}")]
    UnmappedModel(String),

    /// Provider set has no handle under this id
    #[error("Unknown language model: {0}")]
    UnknownProviderModel(String),

    /// Configuration error
    #[error("Configuration error: {0}")]
    ConfigError(String),

    /// Internal error
    #[error("Internal error: {0}")]
    Internal(#[from] anyhow::Error),
}

impl ApiError {
    pub fn code(&self) -> ErrorCode {
        match self {
            ApiError::ChatError { code, .. } => *code,
            ApiError::Offline => ErrorCode::OFFLINE_CHAT,
            ApiError::UnmappedModel(_) | ApiError::UnknownProviderModel(_) => {
                ErrorCode::new(ErrorType::BadRequest, Surface::Chat)
            }
            ApiError::ConfigError(_) | ApiError::Internal(_) => {
                ErrorCode::new(ErrorType::BadRequest, Surface::Api)
            }
        }
    }

    /// JSON body shaped like the chat API's error responses
    pub fn to_json(&self) -> Value {
        let cause = match self {
            ApiError::ChatError { cause, .. } => cause.clone(),
            _ => None,
        };

        json!({
            "code": self.code().to_string(),
            "message": self.to_string(),
            "cause": cause,
        })
    }
}

fn format_cause(cause: &Option<String>) -> String {
    cause
        .as_deref()
        .map(|c| format!(": {}", c))
        .unwrap_or_default()
}

/// Result type alias for bridge operations
pub type Result<T> = std::result::Result<T, ApiError>;
