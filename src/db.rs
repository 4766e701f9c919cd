//! Shared Directory helpers.

use uuid::Uuid;

use crate::error::{ApiError, ApiResult};

/// Parse a TEXT id column back into a [`Uuid`].
///
/// Ids are written by this server, so a malformed value means the Directory
/// is corrupt - surfaced as an internal error, never as client input error.
pub(crate) fn parse_id(value: &str) -> ApiResult<Uuid> {
    Uuid::parse_str(value)
        .map_err(|err| ApiError::internal(format!("malformed id {value:?} in directory: {err}")))
}
