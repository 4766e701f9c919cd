//! API error types.
//!
//! Every fallible handler and domain operation returns [`ApiError`]. The
//! variants mirror the authorization/business-rule taxonomy the server
//! enforces:
//!
//! - `NotFound` - a referenced room/user/thought/join-request is absent
//! - `Forbidden` - the actor is authenticated but not allowed; never mutates
//! - `Conflict` - a business-rule violation (duplicate join request, email
//!   already taken, already a member)
//! - `BadRequest` - an invalid request (blank content, kicking the owner,
//!   assigning a non-member)
//! - `Unauthenticated` - no valid identity on the request
//!
//! `Database` and `Internal` cover infrastructure failures and always map to
//! 500 without leaking detail strings to the client.

use axum::http::StatusCode;
use thiserror::Error;

/// Result alias used throughout the server.
pub type ApiResult<T> = Result<T, ApiError>;

#[derive(Debug, Error)]
pub enum ApiError {
    /// Referenced resource does not exist.
    #[error("{0} not found")]
    NotFound(&'static str),

    /// The actor is not allowed to perform this action.
    #[error("{0}")]
    Forbidden(&'static str),

    /// The request conflicts with current state.
    #[error("{0}")]
    Conflict(&'static str),

    /// The request itself is invalid.
    #[error("{0}")]
    BadRequest(String),

    /// Missing or invalid credentials.
    #[error("{0}")]
    Unauthenticated(&'static str),

    /// Directory (database) failure.
    #[error("database error: {0}")]
    Database(#[from] sqlx::Error),

    /// Anything else that should never reach a client verbatim.
    #[error("internal error: {0}")]
    Internal(String),
}

impl ApiError {
    pub fn bad_request(message: impl Into<String>) -> Self {
        Self::BadRequest(message.into())
    }

    pub fn internal(message: impl Into<String>) -> Self {
        Self::Internal(message.into())
    }

    /// HTTP status code for this error.
    pub fn status_code(&self) -> StatusCode {
        match self {
            Self::NotFound(_) => StatusCode::NOT_FOUND,
            Self::Forbidden(_) => StatusCode::FORBIDDEN,
            Self::Conflict(_) => StatusCode::CONFLICT,
            Self::BadRequest(_) => StatusCode::BAD_REQUEST,
            Self::Unauthenticated(_) => StatusCode::UNAUTHORIZED,
            Self::Database(_) | Self::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    /// Message included in the JSON error body.
    ///
    /// Infrastructure errors are collapsed to a generic string; their detail
    /// goes to the log, not the client.
    pub fn message(&self) -> String {
        match self {
            Self::Database(_) | Self::Internal(_) => "internal server error".to_string(),
            other => other.to_string(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn status_code_mapping() {
        assert_eq!(
            ApiError::NotFound("room").status_code(),
            StatusCode::NOT_FOUND
        );
        assert_eq!(
            ApiError::Forbidden("only the owner can perform this action").status_code(),
            StatusCode::FORBIDDEN
        );
        assert_eq!(
            ApiError::Conflict("already a member").status_code(),
            StatusCode::CONFLICT
        );
        assert_eq!(
            ApiError::bad_request("cannot kick the owner").status_code(),
            StatusCode::BAD_REQUEST
        );
        assert_eq!(
            ApiError::Unauthenticated("invalid credentials").status_code(),
            StatusCode::UNAUTHORIZED
        );
        assert_eq!(
            ApiError::internal("boom").status_code(),
            StatusCode::INTERNAL_SERVER_ERROR
        );
    }

    #[test]
    fn infrastructure_detail_is_not_exposed() {
        let err = ApiError::internal("connection pool exhausted");
        assert_eq!(err.message(), "internal server error");

        let err = ApiError::Database(sqlx::Error::RowNotFound);
        assert_eq!(err.message(), "internal server error");
    }

    #[test]
    fn not_found_names_the_resource() {
        assert_eq!(ApiError::NotFound("thought").message(), "thought not found");
    }
}
