//! Response envelope shared by every route.
//!
//! # Wire format
//! ```text
//! Success: {"status": 200, "message": "...", "data": <endpoint specific>}
//! Failure: {"status": 4xx/5xx, "message": "...", "details": "..."}
//! ```
//!
//! # Design Decisions
//! - The HTTP status line always matches the `status` field
//! - Services return `Result<Success, Failure>` so a response is always written

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde::Serialize;
use serde_json::Value;

/// Successful outcome of a service.
#[derive(Debug, Clone, Serialize)]
pub struct Success {
    #[serde(serialize_with = "serialize_status")]
    pub status: StatusCode,
    pub message: String,
    pub data: Value,
}

impl Success {
    /// 200 response carrying `data` serialized to JSON.
    pub fn new(message: impl Into<String>, data: impl Serialize) -> Result<Self, Failure> {
        let message = message.into();
        let data = serde_json::to_value(data).map_err(|e| {
            Failure::new(StatusCode::INTERNAL_SERVER_ERROR, message.clone(), e.to_string())
        })?;
        Ok(Self {
            status: StatusCode::OK,
            message,
            data,
        })
    }

    /// 200 response with a `null` data payload.
    pub fn message(message: impl Into<String>) -> Self {
        Self {
            status: StatusCode::OK,
            message: message.into(),
            data: Value::Null,
        }
    }
}

/// Failed outcome, produced by whichever stage detected the problem.
#[derive(Debug, Clone, Serialize, thiserror::Error)]
#[error("{message}: {details}")]
pub struct Failure {
    #[serde(serialize_with = "serialize_status")]
    pub status: StatusCode,
    pub message: String,
    pub details: String,
}

impl Failure {
    pub fn new(status: StatusCode, message: impl Into<String>, details: impl Into<String>) -> Self {
        Self {
            status,
            message: message.into(),
            details: details.into(),
        }
    }

    /// 400 with an endpoint message and a specific detail.
    pub fn bad_request(message: impl Into<String>, details: impl Into<String>) -> Self {
        Self::new(StatusCode::BAD_REQUEST, message, details)
    }

    /// 500 with an endpoint message and the underlying error text.
    pub fn internal(message: impl Into<String>, details: impl Into<String>) -> Self {
        Self::new(StatusCode::INTERNAL_SERVER_ERROR, message, details)
    }
}

/// Exactly one of these is written per request.
#[derive(Debug, Clone, Serialize)]
#[serde(untagged)]
pub enum ApiResponse {
    Success(Success),
    Failure(Failure),
}

impl ApiResponse {
    pub fn status(&self) -> StatusCode {
        match self {
            ApiResponse::Success(s) => s.status,
            ApiResponse::Failure(f) => f.status,
        }
    }
}

impl From<Result<Success, Failure>> for ApiResponse {
    fn from(result: Result<Success, Failure>) -> Self {
        match result {
            Ok(success) => ApiResponse::Success(success),
            Err(failure) => ApiResponse::Failure(failure),
        }
    }
}

impl From<Failure> for ApiResponse {
    fn from(failure: Failure) -> Self {
        ApiResponse::Failure(failure)
    }
}

impl IntoResponse for ApiResponse {
    fn into_response(self) -> Response {
        (self.status(), Json(self)).into_response()
    }
}

impl IntoResponse for Failure {
    fn into_response(self) -> Response {
        ApiResponse::Failure(self).into_response()
    }
}

fn serialize_status<S: serde::Serializer>(status: &StatusCode, s: S) -> Result<S::Ok, S::Error> {
    s.serialize_u16(status.as_u16())
}
