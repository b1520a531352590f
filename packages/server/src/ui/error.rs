//! Error responses.

use axum::{
    Json,
    http::StatusCode,
    response::{IntoResponse, Response},
};

use crate::{
    domain::RejectReason,
    infrastructure::dto::http::{ErrorBody, ErrorCode},
};

/// An error rendered as `{"code": ..., "message": ...}` with a matching status.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ApiError {
    pub code: ErrorCode,
    pub message: String,
}

impl ApiError {
    pub fn new(reason: RejectReason, message: impl Into<String>) -> Self {
        Self {
            code: reason.into(),
            message: message.into(),
        }
    }

    pub fn status(&self) -> StatusCode {
        match self.code {
            ErrorCode::Unauthenticated => StatusCode::UNAUTHORIZED,
            ErrorCode::NotParticipant => StatusCode::FORBIDDEN,
            ErrorCode::ChatNotFound => StatusCode::NOT_FOUND,
            ErrorCode::PersistenceFailure => StatusCode::SERVICE_UNAVAILABLE,
            ErrorCode::EmptyMessage
            | ErrorCode::MessageTooLong
            | ErrorCode::InvalidRecipient
            | ErrorCode::InvalidPayload => StatusCode::BAD_REQUEST,
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = self.status();
        if status.is_server_error() {
            tracing::error!("Request failed: {}", self.message);
        } else {
            tracing::debug!("Request rejected ({}): {}", status, self.message);
        }
        (
            status,
            Json(ErrorBody {
                code: self.code,
                message: self.message,
            }),
        )
            .into_response()
    }
}

macro_rules! impl_from_usecase_error {
    ($($error:ty),* $(,)?) => {
        $(
            impl From<$error> for ApiError {
                fn from(e: $error) -> Self {
                    Self::new(e.reason(), e.to_string())
                }
            }
        )*
    };
}

impl_from_usecase_error!(
    crate::usecase::SendMessageError,
    crate::usecase::MarkAsReadError,
    crate::usecase::QueryError,
);
