//! JSON response envelope shared by every endpoint.

use axum::{
    Json,
    http::StatusCode,
    response::{IntoResponse, Response},
};
use serde::Serialize;
use serde_json::json;

/// Message used by every successful response.
pub const SUCCESS: &str = "SUCCESS";

/// `{status, message, data}` envelope.
///
/// ```json
/// { "status": 200, "message": "SUCCESS", "data": { "account_number": 1 } }
/// ```
#[derive(Debug)]
pub struct ApiResponse<T: Serialize> {
    pub status: StatusCode,
    pub message: String,
    pub data: Option<T>,
}

impl<T: Serialize> ApiResponse<T> {
    /// 200 OK carrying `data`.
    pub fn ok(data: T) -> Self {
        Self {
            status: StatusCode::OK,
            message: SUCCESS.to_string(),
            data: Some(data),
        }
    }

    /// Error or data-less response with an explicit status.
    pub fn error(status: StatusCode, message: impl Into<String>) -> Self {
        Self {
            status,
            message: message.into(),
            data: None,
        }
    }
}

impl ApiResponse<()> {
    /// 201 Created with no data.
    pub fn created() -> Self {
        Self::error(StatusCode::CREATED, SUCCESS)
    }

    /// 202 Accepted with no data.
    pub fn accepted() -> Self {
        Self::error(StatusCode::ACCEPTED, SUCCESS)
    }
}

impl<T: Serialize> IntoResponse for ApiResponse<T> {
    fn into_response(self) -> Response {
        let data = match self.data.map(|d| serde_json::to_value(&d)).transpose() {
            Ok(value) => value,
            Err(e) => {
                tracing::error!("Failed to serialize response data: {}", e);
                return (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    Json(json!({
                        "status": StatusCode::INTERNAL_SERVER_ERROR.as_u16(),
                        "message": "failed to serialize response",
                        "data": null
                    })),
                )
                    .into_response();
            }
        };

        let body = Json(json!({
            "status": self.status.as_u16(),
            "message": self.message,
            "data": data
        }));

        (self.status, body).into_response()
    }
}
