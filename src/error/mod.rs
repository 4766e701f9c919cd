//! Server error module.
//!
//! - `types` - the [`ApiError`] taxonomy and status-code mapping
//! - `conversion` - `IntoResponse` so handlers can `?` straight through

pub mod conversion;
pub mod types;

pub use types::{ApiError, ApiResult};
