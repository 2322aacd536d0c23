use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use bookloop_core::errors::{DatabaseError, Error as CoreError};
use serde::Serialize;
use thiserror::Error;

use crate::auth::AuthError;

#[derive(Error, Debug)]
pub enum ApiError {
    #[error("{0}")]
    Core(#[from] CoreError),
    #[error("{0}")]
    Auth(#[from] AuthError),
}

#[derive(Serialize)]
struct ErrorBody {
    code: u16,
    message: String,
}

fn core_status(error: &CoreError) -> StatusCode {
    match error {
        CoreError::Unauthorized(_) => StatusCode::FORBIDDEN,
        CoreError::NotFound(_) => StatusCode::NOT_FOUND,
        CoreError::InvalidTransition { .. } | CoreError::ConstraintViolation(_) => {
            StatusCode::CONFLICT
        }
        CoreError::UnsupportedLogType(_) => StatusCode::UNPROCESSABLE_ENTITY,
        CoreError::Notification(_) => StatusCode::BAD_GATEWAY,
        CoreError::Validation(_) => StatusCode::BAD_REQUEST,
        CoreError::Database(DatabaseError::NotFound(_)) => StatusCode::NOT_FOUND,
        CoreError::Database(
            DatabaseError::UniqueViolation(_) | DatabaseError::ForeignKeyViolation(_),
        ) => StatusCode::CONFLICT,
        CoreError::Database(_) | CoreError::Unexpected(_) => StatusCode::INTERNAL_SERVER_ERROR,
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = match &self {
            ApiError::Core(e) => core_status(e),
            ApiError::Auth(e) => match e {
                AuthError::Unauthorized | AuthError::InvalidCredentials => {
                    StatusCode::UNAUTHORIZED
                }
                AuthError::NotConfigured => StatusCode::FORBIDDEN,
                AuthError::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
            },
        };
        if status.is_server_error() {
            tracing::error!("Request failed: {}", self);
        }
        let body = Json(ErrorBody {
            code: status.as_u16(),
            message: self.to_string(),
        });
        (status, body).into_response()
    }
}

pub type ApiResult<T> = Result<T, ApiError>;

#[cfg(test)]
mod tests {
    use super::*;
    use bookloop_core::orders::OrderStatus;

    #[test]
    fn test_core_error_status_mapping() {
        assert_eq!(
            core_status(&CoreError::unauthorized("not your order")),
            StatusCode::FORBIDDEN
        );
        assert_eq!(
            core_status(&CoreError::not_found("Order 7")),
            StatusCode::NOT_FOUND
        );
        assert_eq!(
            core_status(&CoreError::InvalidTransition {
                from: OrderStatus::Delivered,
                to: OrderStatus::Confirmed,
            }),
            StatusCode::CONFLICT
        );
        assert_eq!(
            core_status(&CoreError::Notification("smtp down".into())),
            StatusCode::BAD_GATEWAY
        );
        assert_eq!(
            core_status(&CoreError::UnsupportedLogType("MESSAGE".into())),
            StatusCode::UNPROCESSABLE_ENTITY
        );
        assert_eq!(
            core_status(&CoreError::Database(DatabaseError::QueryFailed("x".into()))),
            StatusCode::INTERNAL_SERVER_ERROR
        );
    }
}
