//! Caller identity taken from the trusted `X-Sharer-User-Id` header.

use crate::errors::AppError;
use axum::{extract::FromRequestParts, http::request::Parts};

pub const SHARER_HEADER: &str = "X-Sharer-User-Id";

/// Id of the calling user.
///
/// A missing or non-numeric header rejects with 400.
///
/// ```ignore
/// async fn my_items(SharerId(owner_id): SharerId) -> String {
///     owner_id.to_string()
/// }
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SharerId(pub i64);

impl<S> FromRequestParts<S> for SharerId
where
    S: Send + Sync,
{
    type Rejection = AppError;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        let value = parts.headers.get(SHARER_HEADER).ok_or_else(|| {
            AppError::InvalidHeader(format!("Missing request header {}", SHARER_HEADER))
        })?;

        value
            .to_str()
            .ok()
            .and_then(|raw| raw.trim().parse::<i64>().ok())
            .map(SharerId)
            .ok_or_else(|| {
                AppError::InvalidHeader(format!("Header {} must be a number", SHARER_HEADER))
            })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::http::Request;

    async fn extract(header: Option<&str>) -> Result<SharerId, AppError> {
        let mut builder = Request::get("/");
        if let Some(value) = header {
            builder = builder.header(SHARER_HEADER, value);
        }
        let (mut parts, _) = builder.body(()).unwrap().into_parts();
        SharerId::from_request_parts(&mut parts, &()).await
    }

    #[tokio::test]
    async fn test_reads_numeric_header() {
        assert_eq!(extract(Some("17")).await.unwrap(), SharerId(17));
    }

    #[tokio::test]
    async fn test_header_name_is_case_insensitive() {
        let (mut parts, _) = Request::get("/")
            .header("x-sharer-user-id", "3")
            .body(())
            .unwrap()
            .into_parts();
        let id = SharerId::from_request_parts(&mut parts, &()).await.unwrap();
        assert_eq!(id, SharerId(3));
    }

    #[tokio::test]
    async fn test_missing_header_rejects() {
        let err = extract(None).await.unwrap_err();
        assert!(matches!(err, AppError::InvalidHeader(_)));
    }

    #[tokio::test]
    async fn test_garbage_header_rejects() {
        let err = extract(Some("me")).await.unwrap_err();
        assert!(matches!(err, AppError::InvalidHeader(_)));
    }
}
