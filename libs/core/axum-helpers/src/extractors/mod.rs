//! Custom extractors for Axum handlers.
//!
//! Every rejection renders through [`AppError`](crate::AppError), so malformed
//! input always produces a 400 with an `{"error": ...}` body.

pub mod id_path;
pub mod page;
pub mod sharer_id;
pub mod validated_json;

pub use id_path::IdPath;
pub use page::{Page, PageQuery};
pub use sharer_id::{SHARER_HEADER, SharerId};
pub use validated_json::ValidatedJson;
