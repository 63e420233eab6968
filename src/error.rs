// src/error.rs

use actix_web::http::StatusCode;
use actix_web::{HttpResponse, ResponseError};
use serde_json::json;
use std::fmt;

/// Closed set of failures surfaced by the booking/payment core.
/// Handlers return these directly; callers match on the machine-readable
/// `code()` rather than on error message strings.
#[derive(Debug)]
pub enum ApiError {
    Validation(String),
    PropertyNotFound,
    BookingNotFound,
    PaymentNotFound,
    BookingConflict,
    PaymentExists,
    InvalidState(&'static str),
    Forbidden,
    Db(sqlx::Error),
}

impl ApiError {
    pub fn code(&self) -> &'static str {
        match self {
            ApiError::Validation(_) => "VALIDATION_ERROR",
            ApiError::PropertyNotFound => "PROPERTY_NOT_FOUND",
            ApiError::BookingNotFound => "BOOKING_NOT_FOUND",
            ApiError::PaymentNotFound => "PAYMENT_NOT_FOUND",
            ApiError::BookingConflict => "BOOKING_CONFLICT",
            ApiError::PaymentExists => "PAYMENT_EXISTS",
            ApiError::InvalidState(_) => "INVALID_STATE",
            ApiError::Forbidden => "FORBIDDEN",
            ApiError::Db(_) => "INTERNAL_ERROR",
        }
    }
}

impl fmt::Display for ApiError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ApiError::Validation(msg) => write!(f, "validation failed: {msg}"),
            ApiError::PropertyNotFound => write!(f, "property not found"),
            ApiError::BookingNotFound => write!(f, "booking not found"),
            ApiError::PaymentNotFound => write!(f, "payment not found"),
            ApiError::BookingConflict => write!(f, "booking dates conflict with an existing booking"),
            ApiError::PaymentExists => write!(f, "a live payment already exists for this booking"),
            ApiError::InvalidState(detail) => write!(f, "invalid state: {detail}"),
            ApiError::Forbidden => write!(f, "forbidden"),
            ApiError::Db(e) => write!(f, "database error: {e}"),
        }
    }
}

impl From<sqlx::Error> for ApiError {
    fn from(e: sqlx::Error) -> Self {
        // Constraint backstops for races the in-transaction checks normally
        // catch first (see migrations): map them to their business codes.
        if let sqlx::Error::Database(db) = &e {
            match db.constraint() {
                Some("bookings_no_overlap") => return ApiError::BookingConflict,
                Some("payments_one_live_per_booking") => return ApiError::PaymentExists,
                _ => {}
            }
        }
        ApiError::Db(e)
    }
}

impl ResponseError for ApiError {
    fn status_code(&self) -> StatusCode {
        match self {
            ApiError::Validation(_) => StatusCode::BAD_REQUEST,
            ApiError::PropertyNotFound
            | ApiError::BookingNotFound
            | ApiError::PaymentNotFound => StatusCode::NOT_FOUND,
            ApiError::BookingConflict
            | ApiError::PaymentExists
            | ApiError::InvalidState(_) => StatusCode::CONFLICT,
            ApiError::Forbidden => StatusCode::FORBIDDEN,
            ApiError::Db(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    fn error_response(&self) -> HttpResponse {
        // Store internals stay in the server log, not in the response.
        if let ApiError::Db(e) = self {
            log::error!("store error: {e}");
            return HttpResponse::InternalServerError().json(json!({
                "error": self.code(),
            }));
        }
        HttpResponse::build(self.status_code()).json(json!({
            "error": self.code(),
            "message": self.to_string(),
        }))
    }
}
