//! `from`/`size` paging taken from the query string.

use crate::errors::AppError;
use axum::{
    extract::{FromRequestParts, Query},
    http::request::Parts,
};
use serde::Deserialize;
use utoipa::IntoParams;

pub const DEFAULT_PAGE_SIZE: i64 = 20;

/// Raw paging parameters as they appear in the query string.
#[derive(Debug, Default, Deserialize, IntoParams)]
#[into_params(parameter_in = Query)]
pub struct PageQuery {
    /// Zero-based offset of the first element
    #[param(minimum = 0, default = 0)]
    pub from: Option<i64>,
    /// Page length
    #[param(minimum = 1, default = 20)]
    pub size: Option<i64>,
}

/// Validated offset window.
///
/// `from < 0` or `size < 1` rejects with 400 `Illegal argument` before the
/// handler runs. Other query keys are ignored, so this composes with
/// handler-specific `Query<...>` extractors.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Page {
    pub from: u64,
    pub size: u64,
}

impl Page {
    pub fn new(from: i64, size: i64) -> Result<Self, AppError> {
        if from < 0 || size < 1 {
            return Err(AppError::BadRequest("Illegal argument".to_string()));
        }
        Ok(Self {
            from: from as u64,
            size: size as u64,
        })
    }
}

impl Default for Page {
    fn default() -> Self {
        Self {
            from: 0,
            size: DEFAULT_PAGE_SIZE as u64,
        }
    }
}

impl<S> FromRequestParts<S> for Page
where
    S: Send + Sync,
{
    type Rejection = AppError;

    async fn from_request_parts(parts: &mut Parts, state: &S) -> Result<Self, Self::Rejection> {
        let Query(query) = Query::<PageQuery>::from_request_parts(parts, state).await?;
        Page::new(
            query.from.unwrap_or(0),
            query.size.unwrap_or(DEFAULT_PAGE_SIZE),
        )
    }
}
