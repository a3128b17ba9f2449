use std::error::Error as StdError;

use thiserror::Error;

use crate::errors::domain::{DomainError, InfraErrorKind};
use crate::errors::ErrorCode;

type BoxedSource = Box<dyn StdError + Send + Sync + 'static>;

#[derive(Error, Debug)]
pub enum AppError {
    #[error("Configuration error: {detail}")]
    Config { detail: String },
    #[error("Database error: {detail}")]
    Db { code: ErrorCode, detail: String },
    #[error("Upstream error: {detail}")]
    Upstream {
        code: ErrorCode,
        detail: String,
        #[source]
        source: Option<BoxedSource>,
    },
    #[error("Notification error: {detail}")]
    Notification {
        detail: String,
        #[source]
        source: Option<BoxedSource>,
    },
    #[error("Queue error: {detail}")]
    Queue {
        detail: String,
        #[source]
        source: BoxedSource,
    },
    #[error("Decode error: {detail}")]
    Decode { detail: String },
    #[error("Internal error: {detail}")]
    Internal { code: ErrorCode, detail: String },
}

impl AppError {
    /// Stable code for structured logs.
    pub fn code(&self) -> ErrorCode {
        match self {
            AppError::Config { .. } => ErrorCode::ConfigError,
            AppError::Db { code, .. } => *code,
            AppError::Upstream { code, .. } => *code,
            AppError::Notification { .. } => ErrorCode::NotificationFailed,
            AppError::Queue { .. } => ErrorCode::QueueError,
            AppError::Decode { .. } => ErrorCode::DecodeError,
            AppError::Internal { code, .. } => *code,
        }
    }

    pub fn config(detail: impl Into<String>) -> Self {
        Self::Config {
            detail: detail.into(),
        }
    }

    pub fn internal(detail: impl Into<String>) -> Self {
        Self::Internal {
            code: ErrorCode::InternalError,
            detail: detail.into(),
        }
    }

    pub fn db(detail: impl Into<String>) -> Self {
        Self::Db {
            code: ErrorCode::DbError,
            detail: detail.into(),
        }
    }

    pub fn upstream(detail: impl Into<String>, source: impl StdError + Send + Sync + 'static) -> Self {
        Self::Upstream {
            code: ErrorCode::UpstreamUnavailable,
            detail: detail.into(),
            source: Some(Box::new(source)),
        }
    }

    pub fn upstream_rejected(detail: impl Into<String>) -> Self {
        Self::Upstream {
            code: ErrorCode::UpstreamRejected,
            detail: detail.into(),
            source: None,
        }
    }

    pub fn notification(detail: impl Into<String>) -> Self {
        Self::Notification {
            detail: detail.into(),
            source: None,
        }
    }

    pub fn notification_failed(
        detail: impl Into<String>,
        source: impl StdError + Send + Sync + 'static,
    ) -> Self {
        Self::Notification {
            detail: detail.into(),
            source: Some(Box::new(source)),
        }
    }

    pub fn queue(detail: impl Into<String>, source: impl StdError + Send + Sync + 'static) -> Self {
        Self::Queue {
            detail: detail.into(),
            source: Box::new(source),
        }
    }

    pub fn decode(detail: impl Into<String>) -> Self {
        Self::Decode {
            detail: detail.into(),
        }
    }
}

impl From<DomainError> for AppError {
    fn from(e: DomainError) -> Self {
        match e {
            DomainError::Validation(detail) => Self::Internal {
                code: ErrorCode::ValidationError,
                detail,
            },
            DomainError::Conflict(_, detail) => Self::Db {
                code: ErrorCode::Conflict,
                detail,
            },
            DomainError::NotFound(_, detail) => Self::Db {
                code: ErrorCode::NotFound,
                detail,
            },
            DomainError::Infra(InfraErrorKind::DbUnavailable | InfraErrorKind::Timeout, detail) => {
                Self::Db {
                    code: ErrorCode::DbUnavailable,
                    detail,
                }
            }
            DomainError::Infra(_, detail) => Self::db(detail),
        }
    }
}

impl From<std::env::VarError> for AppError {
    fn from(e: std::env::VarError) -> Self {
        AppError::config(format!("env var error: {e}"))
    }
}

impl From<sea_orm::DbErr> for AppError {
    fn from(e: sea_orm::DbErr) -> Self {
        AppError::from(DomainError::from(e))
    }
}

impl From<serde_json::Error> for AppError {
    fn from(e: serde_json::Error) -> Self {
        AppError::decode(e.to_string())
    }
}
