//! Error types and HTTP error response handling.
//!
//! This module defines all application errors and how they are converted
//! into HTTP responses. Every error leaves the service as the same
//! `{status, message, data}` envelope used for successful responses, with
//! `data` set to `null`.

use axum::{
    extract::rejection::JsonRejection,
    http::StatusCode,
    response::{IntoResponse, Response},
};

use crate::response::ApiResponse;

/// Application-wide error type.
///
/// Each variant maps to a specific HTTP status code and a client-facing
/// message. Internal details (SQL errors, decryption failures) are logged
/// but never sent to the caller.
///
/// # Error Categories
///
/// - **Validation Errors**: malformed bodies, unsupported update types (400)
/// - **Business Errors**: duplicate or unknown accounts (400)
/// - **Authentication Errors**: missing, empty, expired or forged tokens (401)
/// - **Screening Errors**: requests that did not come from the message bus (401)
/// - **Internal Errors**: storage failures, undecodable claims or messages (500)
#[derive(Debug, thiserror::Error)]
pub enum AppError {
    /// Request body or parameters are invalid.
    #[error("{0}")]
    InvalidRequest(String),

    /// An account already exists for the external user id.
    #[error("account already exists")]
    AccountExists,

    /// No account matches the user id / account number.
    #[error("account not found")]
    AccountNotFound,

    /// Service update with an unsupported update type or an empty service id.
    #[error("error updating services")]
    InvalidServiceUpdate,

    /// Transaction update with an unsupported transaction type.
    #[error("error updating transaction")]
    InvalidTransactionType,

    /// The session cookie is absent.
    #[error("missing auth token")]
    MissingToken,

    /// The session cookie is present but has no value.
    #[error("empty auth token")]
    EmptyToken,

    #[error("token expired")]
    TokenExpired,

    /// Signature mismatch, malformed token or missing registered claims.
    #[error("token does not match")]
    InvalidToken,

    /// Token verified but its claims have an unexpected shape.
    #[error("error asserting claims")]
    MalformedClaims,

    /// Token verified but carries no `user_id` claim.
    #[error("error asserting user id")]
    MissingUserId,

    /// A per-user route ran without an authenticated user in the request.
    #[error("user id missing from session")]
    MissingSession,

    #[error("unauthorized user agent")]
    UnauthorizedAgent,

    #[error("unauthorized url")]
    UnauthorizedOrigin,

    /// Message-bus payload could not be read or decrypted.
    #[error("error extracting message")]
    MessageExtraction(String),

    /// A storage operation failed; `context` is what the client sees.
    #[error("{context}")]
    Storage {
        context: &'static str,
        #[source]
        source: sqlx::Error,
    },

    /// Database operation failed outside of a business operation (health checks).
    #[error("Database error: {0}")]
    Database(#[from] sqlx::Error),

    /// Unexpected failure inside the service itself.
    #[error("internal server error")]
    Internal(String),

    #[error("route not found")]
    RouteNotFound,

    #[error("method not allowed")]
    MethodNotAllowed,
}

impl AppError {
    /// Wrap a storage failure with the message shown to the client.
    pub fn storage(context: &'static str, source: sqlx::Error) -> Self {
        AppError::Storage { context, source }
    }

    pub fn status(&self) -> StatusCode {
        match self {
            AppError::InvalidRequest(_)
            | AppError::AccountExists
            | AppError::AccountNotFound
            | AppError::InvalidServiceUpdate
            | AppError::InvalidTransactionType
            | AppError::MissingSession => StatusCode::BAD_REQUEST,
            AppError::MissingToken
            | AppError::EmptyToken
            | AppError::TokenExpired
            | AppError::InvalidToken
            | AppError::UnauthorizedAgent
            | AppError::UnauthorizedOrigin => StatusCode::UNAUTHORIZED,
            AppError::RouteNotFound => StatusCode::NOT_FOUND,
            AppError::MethodNotAllowed => StatusCode::METHOD_NOT_ALLOWED,
            AppError::MalformedClaims
            | AppError::MissingUserId
            | AppError::MessageExtraction(_)
            | AppError::Internal(_)
            | AppError::Storage { .. }
            | AppError::Database(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    /// Message sent to the client. Database details stay in the logs.
    fn client_message(&self) -> String {
        match self {
            AppError::Database(_) => "An internal error occurred".to_string(),
            other => other.to_string(),
        }
    }
}

/// Body rejections from the `Json` extractor become 400 envelopes.
impl From<JsonRejection> for AppError {
    fn from(rejection: JsonRejection) -> Self {
        AppError::InvalidRequest(format!("FAILED: {}", rejection.body_text()))
    }
}

/// Convert AppError into an HTTP response.
///
/// # Response Format
///
/// ```json
/// {
///   "status": 400,
///   "message": "account already exists",
///   "data": null
/// }
/// ```
///
/// 5xx errors are logged with their source at `error` level, everything
/// else at `warn`.
impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let status = self.status();

        if status.is_server_error() {
            match &self {
                AppError::Storage { context, source } => {
                    tracing::error!(error = ?source, "{}", context)
                }
                AppError::MessageExtraction(detail) => {
                    tracing::error!(%detail, "failed to extract message")
                }
                AppError::Internal(detail) => tracing::error!(%detail, "internal error"),
                other => tracing::error!(error = ?other, "request failed"),
            }
        } else {
            tracing::warn!(status = status.as_u16(), "{}", self);
        }

        ApiResponse::<()>::error(status, self.client_message()).into_response()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn maps_business_errors_to_bad_request() {
        assert_eq!(AppError::AccountExists.status(), StatusCode::BAD_REQUEST);
        assert_eq!(AppError::AccountNotFound.status(), StatusCode::BAD_REQUEST);
        assert_eq!(AppError::InvalidServiceUpdate.status(), StatusCode::BAD_REQUEST);
    }

    #[test]
    fn token_failures_have_distinct_messages() {
        let messages = [
            AppError::MissingToken.to_string(),
            AppError::EmptyToken.to_string(),
            AppError::TokenExpired.to_string(),
            AppError::InvalidToken.to_string(),
        ];
        for (i, a) in messages.iter().enumerate() {
            for b in &messages[i + 1..] {
                assert_ne!(a, b);
            }
        }
    }

    #[test]
    fn storage_errors_hide_sql_details() {
        let err = AppError::storage("error updating services", sqlx::Error::PoolTimedOut);
        assert_eq!(err.status(), StatusCode::INTERNAL_SERVER_ERROR);
        assert_eq!(err.client_message(), "error updating services");

        let err = AppError::Database(sqlx::Error::PoolClosed);
        assert_eq!(err.client_message(), "An internal error occurred");
    }
}
