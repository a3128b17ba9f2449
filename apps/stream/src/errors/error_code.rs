//! Error codes for the stream service.
//!
//! Codes show up in structured logs as `code=...`; add new codes here
//! rather than passing ad-hoc strings.

use core::fmt;

/// Centralized error codes, rendered as SCREAMING_SNAKE_CASE.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ErrorCode {
    /// Missing or invalid configuration
    ConfigError,
    /// Database operation failed
    DbError,
    /// Database is unreachable or timing out
    DbUnavailable,
    /// Record missing
    NotFound,
    /// Unique or other semantic conflict
    Conflict,
    /// Malformed input
    ValidationError,
    /// Lichess could not be reached or the stream broke
    UpstreamUnavailable,
    /// Lichess answered with a non-success status
    UpstreamRejected,
    /// Telegram Bot API call failed
    NotificationFailed,
    /// Redis queue operation failed
    QueueError,
    /// Payload could not be decoded
    DecodeError,
    /// Anything else
    InternalError,
}

impl ErrorCode {
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::ConfigError => "CONFIG_ERROR",
            Self::DbError => "DB_ERROR",
            Self::DbUnavailable => "DB_UNAVAILABLE",
            Self::NotFound => "NOT_FOUND",
            Self::Conflict => "CONFLICT",
            Self::ValidationError => "VALIDATION_ERROR",
            Self::UpstreamUnavailable => "UPSTREAM_UNAVAILABLE",
            Self::UpstreamRejected => "UPSTREAM_REJECTED",
            Self::NotificationFailed => "NOTIFICATION_FAILED",
            Self::QueueError => "QUEUE_ERROR",
            Self::DecodeError => "DECODE_ERROR",
            Self::InternalError => "INTERNAL_ERROR",
        }
    }
}

impl fmt::Display for ErrorCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}
