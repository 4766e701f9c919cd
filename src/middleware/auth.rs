//! Authentication middleware.
//!
//! Protects the API routes: extracts the bearer token from the
//! `Authorization` header, verifies it, confirms the user still exists, and
//! attaches an [`AuthenticatedUser`] to the request extensions. Handlers
//! receive it through the [`AuthUser`] extractor.

use axum::{
    extract::{Request, State},
    http::header::AUTHORIZATION,
    middleware::Next,
    response::Response,
};
use uuid::Uuid;

use crate::auth::sessions::verify_token;
use crate::auth::users::get_user_by_id;
use crate::error::{ApiError, ApiResult};
use crate::server::state::AppState;

/// Identity attached to every authenticated request.
#[derive(Clone, Debug)]
pub struct AuthenticatedUser {
    pub user_id: Uuid,
    pub email: String,
}

/// Verify the bearer token and stash the caller's identity.
///
/// Returns `Unauthenticated` when the header is missing or malformed, the
/// token does not verify, or the account behind it has been deleted (a valid
/// token must not outlive its user).
pub async fn auth_middleware(
    State(app_state): State<AppState>,
    mut request: Request,
    next: Next,
) -> ApiResult<Response> {
    let auth_header = request
        .headers()
        .get(AUTHORIZATION)
        .and_then(|header| header.to_str().ok())
        .ok_or(ApiError::Unauthenticated("missing authorization header"))?;

    let token = auth_header
        .strip_prefix("Bearer ")
        .ok_or(ApiError::Unauthenticated("invalid authorization header"))?;

    let claims = verify_token(token).map_err(|err| {
        tracing::debug!("token rejected: {err}");
        ApiError::Unauthenticated("invalid token")
    })?;

    let user_id = Uuid::parse_str(&claims.sub)
        .map_err(|_| ApiError::Unauthenticated("invalid token"))?;

    get_user_by_id(&app_state.db_pool, user_id)
        .await?
        .ok_or(ApiError::Unauthenticated("unknown user"))?;

    request.extensions_mut().insert(AuthenticatedUser {
        user_id,
        email: claims.email,
    });

    Ok(next.run(request).await)
}

/// Extractor for the authenticated user set by [`auth_middleware`].
#[derive(Clone, Debug)]
pub struct AuthUser(pub AuthenticatedUser);

impl axum::extract::FromRequestParts<AppState> for AuthUser {
    type Rejection = ApiError;

    async fn from_request_parts(
        parts: &mut axum::http::request::Parts,
        _state: &AppState,
    ) -> Result<Self, Self::Rejection> {
        parts
            .extensions
            .get::<AuthenticatedUser>()
            .cloned()
            .map(AuthUser)
            .ok_or(ApiError::Unauthenticated("missing authenticated user"))
    }
}
