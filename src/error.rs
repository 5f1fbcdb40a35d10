//! HTTP-facing error type.
//!
//! Handlers return `Result<_, AppError>`; service errors convert into it via
//! `From`, and `IntoResponse` picks the status code and a stable error code
//! for the JSON body.

use axum::{
    extract::rejection::JsonRejection,
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde::Serialize;
use serde_json::json;
use thiserror::Error;

use crate::services::notifications::NotificationError;
use crate::services::reservations::{ReservationError, TicketRejection};

#[derive(Debug, Error)]
pub enum AppError {
    #[error("{0}")]
    Validation(String),

    #[error("invalid input")]
    InvalidInput(#[from] validator::ValidationErrors),

    #[error(transparent)]
    MalformedBody(#[from] JsonRejection),

    #[error("{0}")]
    NotFound(String),

    #[error("authentication credentials were not provided or are invalid")]
    Unauthorized,

    #[error(transparent)]
    Reservation(#[from] ReservationError),

    #[error(transparent)]
    Notification(#[from] NotificationError),

    #[error("database error")]
    Database(#[from] sqlx::Error),

    #[error("{0}")]
    Internal(String),
}

/// Тело ответа с ошибкой
#[derive(Debug, Serialize)]
pub struct ApiErrorResponse {
    pub error: &'static str,
    pub message: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub details: Option<serde_json::Value>,
}

impl AppError {
    pub fn validation(message: impl Into<String>) -> Self {
        AppError::Validation(message.into())
    }

    pub fn not_found(message: impl Into<String>) -> Self {
        AppError::NotFound(message.into())
    }

    fn parts(&self) -> (StatusCode, &'static str, String, Option<serde_json::Value>) {
        match self {
            AppError::Validation(msg) => {
                (StatusCode::BAD_REQUEST, "VALIDATION_ERROR", msg.clone(), None)
            }
            AppError::InvalidInput(errors) => (
                StatusCode::BAD_REQUEST,
                "VALIDATION_ERROR",
                "request body failed validation".to_string(),
                serde_json::to_value(errors).ok(),
            ),
            // неверная форма тела: нет поля, не тот тип, битый JSON
            AppError::MalformedBody(rejection) => (
                StatusCode::BAD_REQUEST,
                "VALIDATION_ERROR",
                rejection.body_text(),
                None,
            ),
            AppError::NotFound(msg) => (StatusCode::NOT_FOUND, "NOT_FOUND", msg.clone(), None),
            AppError::Unauthorized => {
                (StatusCode::UNAUTHORIZED, "UNAUTHORIZED", self.to_string(), None)
            }
            AppError::Reservation(err) => reservation_parts(err),
            AppError::Notification(err) => {
                tracing::error!("notification enqueue failed: {:?}", err);
                (
                    StatusCode::SERVICE_UNAVAILABLE,
                    "NOTIFICATION_UNAVAILABLE",
                    "notification could not be queued".to_string(),
                    None,
                )
            }
            AppError::Database(err) => {
                tracing::error!("database error: {:?}", err);
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    "INTERNAL_ERROR",
                    "internal server error".to_string(),
                    None,
                )
            }
            AppError::Internal(msg) => {
                tracing::error!("internal error: {}", msg);
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    "INTERNAL_ERROR",
                    "internal server error".to_string(),
                    None,
                )
            }
        }
    }
}

fn reservation_parts(err: &ReservationError) -> (StatusCode, &'static str, String, Option<serde_json::Value>) {
    match err {
        ReservationError::EmptyReservation => {
            (StatusCode::BAD_REQUEST, "EMPTY_RESERVATION", err.to_string(), None)
        }
        ReservationError::TicketRejected { index, reason } => {
            let (code, details) = match reason {
                TicketRejection::OutOfRange(out) => (
                    "SEAT_OUT_OF_RANGE",
                    json!({ "ticket": index, "field": out.field, "max": out.max }),
                ),
                TicketRejection::SeatTaken { performance, row, seat } => (
                    "SEAT_CONFLICT",
                    json!({ "ticket": index, "performance": performance, "row": row, "seat": seat }),
                ),
                TicketRejection::UnknownPerformance(performance) => (
                    "VALIDATION_ERROR",
                    json!({ "ticket": index, "field": "performance", "performance": performance }),
                ),
            };
            (StatusCode::BAD_REQUEST, code, err.to_string(), Some(details))
        }
        ReservationError::Storage(source) => {
            tracing::error!("reservation transaction failed: {:?}", source);
            (
                StatusCode::INTERNAL_SERVER_ERROR,
                "RESERVATION_FAILED",
                err.to_string(),
                None,
            )
        }
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let (status, error, message, details) = self.parts();
        (status, Json(ApiErrorResponse { error, message, details })).into_response()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::services::validation::{SeatField, SeatOutOfRange};

    #[test]
    fn seat_out_of_range_is_a_field_level_bad_request() {
        let err = AppError::from(ReservationError::TicketRejected {
            index: 1,
            reason: TicketRejection::OutOfRange(SeatOutOfRange {
                field: SeatField::Row,
                value: 15,
                max: 10,
            }),
        });

        let (status, code, message, details) = err.parts();
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(code, "SEAT_OUT_OF_RANGE");
        assert!(message.contains("(1, rows): (1, 10)"));
        let details = details.unwrap();
        assert_eq!(details["ticket"], 1);
        assert_eq!(details["field"], "row");
    }

    #[test]
    fn seat_conflict_has_its_own_code() {
        let err = AppError::from(ReservationError::TicketRejected {
            index: 0,
            reason: TicketRejection::SeatTaken { performance: 7, row: 3, seat: 4 },
        });

        let (status, code, _, details) = err.parts();
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(code, "SEAT_CONFLICT");
        assert_eq!(details.unwrap()["performance"], 7);
    }

    #[test]
    fn storage_failures_do_not_leak_internals() {
        let err = AppError::from(ReservationError::Storage(sqlx::Error::PoolTimedOut));

        let (status, code, message, details) = err.parts();
        assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
        assert_eq!(code, "RESERVATION_FAILED");
        assert!(!message.to_lowercase().contains("pool"));
        assert!(details.is_none());
    }

    #[test]
    fn empty_reservation_is_rejected_with_bad_request() {
        let response = AppError::from(ReservationError::EmptyReservation).into_response();
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    }
}
