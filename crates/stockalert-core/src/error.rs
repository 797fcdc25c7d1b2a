use std::fmt::{Display, Formatter};
use std::time::Duration;

use thiserror::Error;

/// Client-side and server-side request validation failures.
#[derive(Debug, Error, Clone, PartialEq)]
pub enum ValidationError {
    #[error("API key is required")]
    MissingApiKey,
    #[error("Invalid API key format")]
    InvalidApiKey,
    #[error("base URL must be an absolute http(s) URL: '{value}'")]
    InvalidBaseUrl { value: String },

    #[error("Symbol is required")]
    MissingSymbol,
    #[error("Condition is required")]
    MissingCondition,
    #[error("Symbol must be 1-5 uppercase letters")]
    InvalidSymbol { value: String },
    #[error("Notification must be one of: email, sms")]
    InvalidNotification { value: String },

    #[error("{condition} requires a threshold value")]
    ThresholdRequired { condition: String },
    #[error("{condition} does not use a threshold value")]
    ThresholdNotAllowed { condition: String },
    #[error("{condition} requires ma_period parameter (50 or 200)")]
    MissingMaPeriod { condition: String },
    #[error("RSI threshold must be between 0 and 100")]
    RsiOutOfRange { value: f64 },
    #[error("Reminder alerts require reminder_date and reminder_time")]
    MissingReminderSchedule,
    #[error("Daily reminder alerts require reminder_time")]
    MissingReminderTime,

    #[error("Status must be either \"active\" or \"paused\"")]
    InvalidStatusUpdate { value: String },
    #[error("{resource} ID is required")]
    MissingId { resource: &'static str },
    #[error("field '{field}' cannot be empty")]
    EmptyField { field: &'static str },
    #[error("request body could not be encoded: {message}")]
    UnencodableBody { message: String },

    /// Field-level errors returned by the API on 400/422.
    #[error("{message}")]
    Rejected { message: String, errors: Vec<String> },
}

/// Transport failure classification.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NetworkErrorKind {
    Timeout,
    Connect,
    Other,
}

/// Coarse error classification for callers that branch on the failure class.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    Validation,
    Authentication,
    RateLimit,
    NotFound,
    Network,
    Api,
}

impl ErrorKind {
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Validation => "validation",
            Self::Authentication => "authentication",
            Self::RateLimit => "rate_limit",
            Self::NotFound => "not_found",
            Self::Network => "network",
            Self::Api => "api",
        }
    }
}

impl Display for ErrorKind {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Every failure a client call can surface.
#[derive(Debug, Error, Clone, PartialEq)]
pub enum StockAlertError {
    #[error(transparent)]
    Validation(#[from] ValidationError),

    #[error("{message}")]
    Authentication { message: String },

    #[error("{message}")]
    RateLimit {
        message: String,
        retry_after: Duration,
    },

    #[error("{message}")]
    NotFound { message: String },

    #[error("{message}")]
    Network {
        message: String,
        kind: NetworkErrorKind,
    },

    #[error("{message}")]
    Api {
        message: String,
        status: u16,
        body: Option<serde_json::Value>,
    },
}

impl StockAlertError {
    pub fn network(kind: NetworkErrorKind, message: impl Into<String>) -> Self {
        Self::Network {
            message: message.into(),
            kind,
        }
    }

    pub fn api(status: u16, message: impl Into<String>, body: Option<serde_json::Value>) -> Self {
        Self::Api {
            message: message.into(),
            status,
            body,
        }
    }

    pub fn rate_limited(message: impl Into<String>, retry_after: Duration) -> Self {
        Self::RateLimit {
            message: message.into(),
            retry_after,
        }
    }

    pub const fn kind(&self) -> ErrorKind {
        match self {
            Self::Validation(_) => ErrorKind::Validation,
            Self::Authentication { .. } => ErrorKind::Authentication,
            Self::RateLimit { .. } => ErrorKind::RateLimit,
            Self::NotFound { .. } => ErrorKind::NotFound,
            Self::Network { .. } => ErrorKind::Network,
            Self::Api { .. } => ErrorKind::Api,
        }
    }

    /// Whether the retry loop may attempt the call again.
    pub const fn retryable(&self) -> bool {
        match self {
            Self::Network { .. } => true,
            Self::Api { status, .. } => *status >= 500 && *status <= 599,
            _ => false,
        }
    }

    /// HTTP status associated with the failure, when one was received.
    pub const fn status(&self) -> Option<u16> {
        match self {
            Self::Authentication { .. } => Some(401),
            Self::RateLimit { .. } => Some(429),
            Self::NotFound { .. } => Some(404),
            Self::Api { status, .. } => Some(*status),
            Self::Validation(_) | Self::Network { .. } => None,
        }
    }

    pub const fn retry_after(&self) -> Option<Duration> {
        match self {
            Self::RateLimit { retry_after, .. } => Some(*retry_after),
            _ => None,
        }
    }
}

pub type Result<T> = std::result::Result<T, StockAlertError>;
