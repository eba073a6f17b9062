use axum::response::{IntoResponse, Response};
use axum_helpers::AppError;
use domain_requests::RequestError;
use domain_users::UserError;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum ItemError {
    #[error("Item {0} not found")]
    NotFound(i64),

    #[error("User {0} not found")]
    UserNotFound(i64),

    #[error("Item request {0} not found")]
    RequestNotFound(i64),

    #[error("Access from user {user_id} to item {item_id} not granted")]
    AccessViolation { user_id: i64, item_id: i64 },

    #[error("Only booker can comment")]
    CommentAccessViolation,

    #[error("Comment text can't be blank")]
    TextValidation,

    #[error("Internal error: {0}")]
    Internal(String),
}

pub type ItemResult<T> = Result<T, ItemError>;

impl From<UserError> for ItemError {
    fn from(err: UserError) -> Self {
        match err {
            UserError::NotFound(id) => ItemError::UserNotFound(id),
            other => ItemError::Internal(other.to_string()),
        }
    }
}

impl From<RequestError> for ItemError {
    fn from(err: RequestError) -> Self {
        match err {
            RequestError::NotFound(id) => ItemError::RequestNotFound(id),
            RequestError::UserNotFound(id) => ItemError::UserNotFound(id),
            RequestError::Internal(msg) => ItemError::Internal(msg),
        }
    }
}

/// The request board reads items through `RequestedItems`
impl From<ItemError> for RequestError {
    fn from(err: ItemError) -> Self {
        RequestError::Internal(err.to_string())
    }
}

impl From<ItemError> for AppError {
    fn from(err: ItemError) -> Self {
        match err {
            ItemError::NotFound(_) | ItemError::UserNotFound(_) | ItemError::RequestNotFound(_) => {
                AppError::NotFound(err.to_string())
            }
            ItemError::AccessViolation { .. } => AppError::Forbidden(err.to_string()),
            ItemError::CommentAccessViolation | ItemError::TextValidation => {
                AppError::BadRequest(err.to_string())
            }
            ItemError::Internal(msg) => AppError::InternalServerError(msg),
        }
    }
}

impl IntoResponse for ItemError {
    fn into_response(self) -> Response {
        let app_error: AppError = self.into();
        app_error.into_response()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::http::StatusCode;

    #[test]
    fn test_status_mapping() {
        let cases = [
            (ItemError::NotFound(1), StatusCode::NOT_FOUND),
            (ItemError::RequestNotFound(1), StatusCode::NOT_FOUND),
            (
                ItemError::AccessViolation {
                    user_id: 2,
                    item_id: 1,
                },
                StatusCode::FORBIDDEN,
            ),
            (ItemError::CommentAccessViolation, StatusCode::BAD_REQUEST),
            (ItemError::TextValidation, StatusCode::BAD_REQUEST),
        ];

        for (err, expected) in cases {
            let app_error: AppError = err.into();
            assert_eq!(app_error.status(), expected);
        }
    }

    #[test]
    fn test_access_violation_message() {
        let err = ItemError::AccessViolation {
            user_id: 2,
            item_id: 5,
        };
        assert_eq!(err.to_string(), "Access from user 2 to item 5 not granted");
    }
}
