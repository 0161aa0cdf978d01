use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde::Serialize;
use thiserror::Error;

use crate::services::auth::AuthError;
use crate::store::ReservationError;

#[derive(Serialize)]
pub struct ApiError {
    success: bool,
    message: String,
}

/// Error returned by every handler. Internal failures are logged here and
/// answered with a generic message.
#[derive(Debug, Error)]
pub enum AppError {
    #[error("{0}")]
    BadRequest(String),
    #[error("{0}")]
    Unauthorized(String),
    #[error("{0}")]
    Forbidden(String),
    #[error("{0}")]
    NotFound(String),
    #[error("{0}")]
    Conflict(String),
    #[error(transparent)]
    Internal(#[from] anyhow::Error),
}

pub type ApiResult<T> = Result<T, AppError>;

impl AppError {
    pub fn status(&self) -> StatusCode {
        match self {
            AppError::BadRequest(_) => StatusCode::BAD_REQUEST,
            AppError::Unauthorized(_) => StatusCode::UNAUTHORIZED,
            AppError::Forbidden(_) => StatusCode::FORBIDDEN,
            AppError::NotFound(_) => StatusCode::NOT_FOUND,
            AppError::Conflict(_) => StatusCode::CONFLICT,
            AppError::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let status = self.status();
        let message = match self {
            AppError::Internal(err) => {
                tracing::error!("internal error: {:?}", err);
                "internal server error".to_string()
            }
            other => other.to_string(),
        };
        (status, Json(ApiError { success: false, message })).into_response()
    }
}

impl From<sqlx::Error> for AppError {
    fn from(err: sqlx::Error) -> Self {
        AppError::Internal(err.into())
    }
}

impl From<AuthError> for AppError {
    fn from(err: AuthError) -> Self {
        AppError::Internal(err.into())
    }
}

impl From<ReservationError> for AppError {
    fn from(err: ReservationError) -> Self {
        match err {
            ReservationError::Validation(message) => AppError::BadRequest(message),
            ReservationError::NotFound { resource, .. } => {
                AppError::NotFound(format!("{} not found", resource))
            }
            ReservationError::SeatsTaken { seat_ids, .. } => AppError::Conflict(format!(
                "seats already booked for this schedule: {}",
                seat_ids
                    .iter()
                    .map(|id| id.to_string())
                    .collect::<Vec<_>>()
                    .join(", ")
            )),
            ReservationError::Persistence(source) => AppError::Internal(source),
        }
    }
}

// True when the database rejected the statement for the given constraint class.
pub fn is_unique_violation(err: &sqlx::Error) -> bool {
    matches!(err, sqlx::Error::Database(db) if db.is_unique_violation())
}

pub fn is_foreign_key_violation(err: &sqlx::Error) -> bool {
    matches!(err, sqlx::Error::Database(db) if db.is_foreign_key_violation())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn reservation_errors_map_to_http_statuses() {
        let cases = [
            (ReservationError::Validation("bad".into()), StatusCode::BAD_REQUEST),
            (
                ReservationError::NotFound { resource: "order", id: 9 },
                StatusCode::NOT_FOUND,
            ),
            (
                ReservationError::SeatsTaken { schedule_id: 1, seat_ids: vec![3, 4] },
                StatusCode::CONFLICT,
            ),
            (
                ReservationError::Persistence(anyhow::anyhow!("connection reset")),
                StatusCode::INTERNAL_SERVER_ERROR,
            ),
        ];
        for (err, status) in cases {
            assert_eq!(AppError::from(err).status(), status);
        }
    }

    #[test]
    fn conflict_message_lists_seats() {
        let err = AppError::from(ReservationError::SeatsTaken { schedule_id: 1, seat_ids: vec![3, 4] });
        assert_eq!(err.to_string(), "seats already booked for this schedule: 3, 4");
    }
}
