//! Application error taxonomy.
//!
//! # Categories
//! - `Known`: anticipated business outcomes (not found, duplicates). The
//!   global handler does not log them and traces record them at DEBUG.
//! - `Business`: business failures that are worth an error log.
//! - `UnauthorizedIp`: raised only by the access guard.
//! - `InvalidArgument` / `Internal`: everything else.
//!
//! Conversion to an HTTP response lives in `http::response`.

use axum::http::StatusCode;
use serde::Serialize;
use thiserror::Error;

use crate::trace::TracedError;

/// Response codes shared by errors and the response envelope.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ErrorCode {
    InvalidArgument,
    NotReadable,
    UnauthorizedIp,
    Forbidden,
    NotFound,
    DataNotFound,
    HolidayNotFound,
    HolidayAlreadyExists,
    IllegalState,
    ServerError,
}

impl ErrorCode {
    pub fn status(&self) -> StatusCode {
        match self {
            ErrorCode::InvalidArgument | ErrorCode::NotReadable => StatusCode::BAD_REQUEST,
            ErrorCode::UnauthorizedIp | ErrorCode::Forbidden => StatusCode::FORBIDDEN,
            ErrorCode::NotFound | ErrorCode::DataNotFound | ErrorCode::HolidayNotFound => {
                StatusCode::NOT_FOUND
            }
            ErrorCode::HolidayAlreadyExists | ErrorCode::IllegalState => StatusCode::CONFLICT,
            ErrorCode::ServerError => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    pub fn message(&self) -> &'static str {
        match self {
            ErrorCode::InvalidArgument => "Invalid argument",
            ErrorCode::NotReadable => "Request body is not readable",
            ErrorCode::UnauthorizedIp => "Unauthorized IP address",
            ErrorCode::Forbidden => "Access denied",
            ErrorCode::NotFound => "Resource not found",
            ErrorCode::DataNotFound => "Data not found",
            ErrorCode::HolidayNotFound => "Holiday not found",
            ErrorCode::HolidayAlreadyExists => "Holiday already exists",
            ErrorCode::IllegalState => "Illegal state",
            ErrorCode::ServerError => "Internal server error",
        }
    }

    pub fn name(&self) -> &'static str {
        match self {
            ErrorCode::InvalidArgument => "INVALID_ARGUMENT",
            ErrorCode::NotReadable => "NOT_READABLE",
            ErrorCode::UnauthorizedIp => "UNAUTHORIZED_IP",
            ErrorCode::Forbidden => "FORBIDDEN",
            ErrorCode::NotFound => "NOT_FOUND",
            ErrorCode::DataNotFound => "DATA_NOT_FOUND",
            ErrorCode::HolidayNotFound => "HOLIDAY_NOT_FOUND",
            ErrorCode::HolidayAlreadyExists => "HOLIDAY_ALREADY_EXISTS",
            ErrorCode::IllegalState => "ILLEGAL_STATE",
            ErrorCode::ServerError => "SERVER_ERROR",
        }
    }
}

impl std::fmt::Display for ErrorCode {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.name())
    }
}

/// Error type returned by services, handlers and interceptors.
#[derive(Debug, Error)]
pub enum AppError {
    /// Expected outcome; logged tersely.
    #[error("{message}")]
    Known { code: ErrorCode, message: String },

    #[error("{message}")]
    Business { code: ErrorCode, message: String },

    /// Caller address rejected by the allow list. Carries the address.
    #[error("unauthorized ip: {0}")]
    UnauthorizedIp(String),

    #[error("invalid argument: {0}")]
    InvalidArgument(String),

    #[error("internal error: {0}")]
    Internal(String),
}

pub type Result<T> = std::result::Result<T, AppError>;

impl AppError {
    pub fn known(code: ErrorCode, message: impl Into<String>) -> Self {
        AppError::Known {
            code,
            message: message.into(),
        }
    }

    pub fn business(code: ErrorCode, message: impl Into<String>) -> Self {
        AppError::Business {
            code,
            message: message.into(),
        }
    }

    pub fn code(&self) -> ErrorCode {
        match self {
            AppError::Known { code, .. } | AppError::Business { code, .. } => *code,
            AppError::UnauthorizedIp(_) => ErrorCode::UnauthorizedIp,
            AppError::InvalidArgument(_) => ErrorCode::InvalidArgument,
            AppError::Internal(_) => ErrorCode::ServerError,
        }
    }

    /// `[CODE] message`, used in single-line logs.
    pub fn simple_print(&self) -> String {
        format!("[{}] {}", self.code(), self)
    }
}

impl TracedError for AppError {
    fn is_known(&self) -> bool {
        matches!(self, AppError::Known { .. })
    }

    fn kind(&self) -> &'static str {
        match self {
            AppError::Known { .. } => "KnownError",
            AppError::Business { .. } => "BusinessError",
            AppError::UnauthorizedIp(_) => "UnauthorizedIpError",
            AppError::InvalidArgument(_) => "InvalidArgumentError",
            AppError::Internal(_) => "InternalError",
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_code_mapping() {
        let err = AppError::UnauthorizedIp("8.8.8.8".into());
        assert_eq!(err.code(), ErrorCode::UnauthorizedIp);
        assert_eq!(err.code().status(), StatusCode::FORBIDDEN);

        let err = AppError::Internal("boom".into());
        assert_eq!(err.code().status(), StatusCode::INTERNAL_SERVER_ERROR);
    }

    #[test]
    fn test_classification() {
        let known = AppError::known(ErrorCode::HolidayNotFound, "Holiday not found: 3");
        assert!(known.is_known());
        assert_eq!(known.simple_print(), "[HOLIDAY_NOT_FOUND] Holiday not found: 3");

        let business = AppError::business(ErrorCode::IllegalState, "stale");
        assert!(!business.is_known());
        assert_eq!(business.kind(), "BusinessError");
    }

    #[test]
    fn test_code_serializes_as_name() {
        let json = serde_json::to_string(&ErrorCode::HolidayAlreadyExists).unwrap();
        assert_eq!(json, "\"HOLIDAY_ALREADY_EXISTS\"");
    }
}
