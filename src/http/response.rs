//! Response envelope and global error translation.
//!
//! # Responsibilities
//! - Wrap payloads as `{ meta, data }`
//! - Map `AppError` to status code and envelope
//! - Log unexpected errors once, at the edge
//!
//! # Design Decisions
//! - Known errors are not logged here; the trace already recorded them
//! - Internal error details never reach the client

use axum::{
    extract::rejection::{JsonRejection, PathRejection},
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde::Serialize;

use crate::error::{AppError, ErrorCode};
use crate::trace::{current_trace_id, TracedError};

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Meta {
    pub code: &'static str,
    pub message: &'static str,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub app_trace_id: Option<String>,
    pub response_ts: i64,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub size: Option<usize>,
}

impl Meta {
    fn new(code: &'static str, message: &'static str) -> Self {
        Self {
            code,
            message,
            app_trace_id: current_trace_id(),
            response_ts: chrono::Utc::now().timestamp_millis(),
            size: None,
        }
    }
}

#[derive(Debug, Serialize)]
pub struct ApiResource<T> {
    #[serde(skip)]
    status: StatusCode,
    pub meta: Meta,
    pub data: T,
}

impl<T> ApiResource<T> {
    pub fn success(data: T) -> Self {
        Self {
            status: StatusCode::OK,
            meta: Meta::new("SUCCESS", "Success"),
            data,
        }
    }

    pub fn of(code: ErrorCode, data: T) -> Self {
        Self {
            status: code.status(),
            meta: Meta::new(code.name(), code.message()),
            data,
        }
    }

    pub fn with_size(mut self, size: usize) -> Self {
        self.meta.size = Some(size);
        self
    }

    pub fn status(&self) -> StatusCode {
        self.status
    }
}

impl<T: Serialize> IntoResponse for ApiResource<T> {
    fn into_response(self) -> Response {
        (self.status, Json(self)).into_response()
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let code = self.code();
        if !self.is_known() {
            log_error(&self);
        }

        let data = match &self {
            AppError::UnauthorizedIp(ip) => ip.clone(),
            AppError::Internal(_) => code.message().to_owned(),
            other => other.to_string(),
        };
        ApiResource::of(code, data).into_response()
    }
}

fn log_error(error: &AppError) {
    let code = error.code();
    tracing::error!(
        code = %code,
        kind = error.kind(),
        "# ==> ERROR INFO :: Code: [{}] , Message: {} , Exception: {} , Cause: {}",
        code.name(),
        code.message(),
        error.kind(),
        error
    );
}

impl From<JsonRejection> for AppError {
    fn from(rejection: JsonRejection) -> Self {
        AppError::business(ErrorCode::NotReadable, rejection.body_text())
    }
}

impl From<PathRejection> for AppError {
    fn from(rejection: PathRejection) -> Self {
        AppError::InvalidArgument(rejection.body_text())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    async fn body_json(response: Response) -> serde_json::Value {
        let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
            .await
            .unwrap();
        serde_json::from_slice(&bytes).unwrap()
    }

    #[tokio::test]
    async fn test_success_envelope() {
        let response = ApiResource::success(vec![1, 2]).with_size(2).into_response();
        assert_eq!(response.status(), StatusCode::OK);

        let json = body_json(response).await;
        assert_eq!(json["meta"]["code"], "SUCCESS");
        assert_eq!(json["meta"]["size"], 2);
        assert!(json["meta"]["responseTs"].as_i64().unwrap() > 0);
        assert_eq!(json["data"], serde_json::json!([1, 2]));
    }

    #[tokio::test]
    async fn test_unauthorized_ip_envelope() {
        let response = AppError::UnauthorizedIp("8.8.8.8".into()).into_response();
        assert_eq!(response.status(), StatusCode::FORBIDDEN);

        let json = body_json(response).await;
        assert_eq!(json["meta"]["code"], "UNAUTHORIZED_IP");
        assert_eq!(json["data"], "8.8.8.8");
    }

    #[tokio::test]
    async fn test_internal_error_hides_detail() {
        let response = AppError::Internal("db password wrong".into()).into_response();
        assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);

        let json = body_json(response).await;
        assert_eq!(json["data"], "Internal server error");
    }

    #[tokio::test]
    async fn test_trace_id_in_meta() {
        let json = crate::trace::with_trace_scope(Some("req-abc".into()), async {
            body_json(ApiResource::success(()).into_response()).await
        })
        .await;
        assert_eq!(json["meta"]["appTraceId"], "req-abc");
        assert!(json["data"].is_null());
    }
}
