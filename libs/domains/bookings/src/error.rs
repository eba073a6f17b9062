use axum::response::{IntoResponse, Response};
use axum_helpers::AppError;
use chrono::{DateTime, Utc};
use domain_items::ItemError;
use domain_users::UserError;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum BookingError {
    #[error("Booking {0} not found")]
    NotFound(i64),

    #[error("Item {0} not found")]
    ItemNotFound(i64),

    #[error("User {0} not found")]
    UserNotFound(i64),

    #[error("Item: {0} is unavailable")]
    ItemUnavailable(i64),

    #[error("User can't book own item")]
    SelfBooking,

    #[error("Interval: {start} - {end} is invalid")]
    IntervalInvalid {
        start: DateTime<Utc>,
        end: DateTime<Utc>,
    },

    #[error("Only owner can control booking")]
    OwnerOnly,

    #[error("Only owner or booker can access booking")]
    AccessDenied,

    #[error("Status of booking {0} is not WAITING")]
    InvalidState(i64),

    #[error("Unknown state: {0}")]
    UnknownState(String),

    #[error("Internal error: {0}")]
    Internal(String),
}

pub type BookingResult<T> = Result<T, BookingError>;

impl From<UserError> for BookingError {
    fn from(err: UserError) -> Self {
        match err {
            UserError::NotFound(id) => BookingError::UserNotFound(id),
            other => BookingError::Internal(other.to_string()),
        }
    }
}

impl From<ItemError> for BookingError {
    fn from(err: ItemError) -> Self {
        match err {
            ItemError::NotFound(id) => BookingError::ItemNotFound(id),
            ItemError::UserNotFound(id) => BookingError::UserNotFound(id),
            other => BookingError::Internal(other.to_string()),
        }
    }
}

/// The catalog reads booking history through `BookingHistory`
impl From<BookingError> for ItemError {
    fn from(err: BookingError) -> Self {
        ItemError::Internal(err.to_string())
    }
}

impl From<BookingError> for AppError {
    fn from(err: BookingError) -> Self {
        match err {
            BookingError::NotFound(_)
            | BookingError::ItemNotFound(_)
            | BookingError::UserNotFound(_) => AppError::NotFound(err.to_string()),
            BookingError::ItemUnavailable(_)
            | BookingError::SelfBooking
            | BookingError::IntervalInvalid { .. }
            | BookingError::InvalidState(_)
            | BookingError::UnknownState(_) => AppError::BadRequest(err.to_string()),
            BookingError::OwnerOnly | BookingError::AccessDenied => {
                AppError::Forbidden(err.to_string())
            }
            BookingError::Internal(msg) => AppError::InternalServerError(msg),
        }
    }
}

impl IntoResponse for BookingError {
    fn into_response(self) -> Response {
        let app_error: AppError = self.into();
        app_error.into_response()
    }
}
