//! Error conversion into HTTP responses.
//!
//! All [`ApiError`] values can be returned directly from handlers; they are
//! rendered as a JSON body of the form:
//!
//! ```json
//! { "error": "room not found", "status": 404 }
//! ```

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};

use crate::error::types::ApiError;

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = self.status_code();

        if status == StatusCode::INTERNAL_SERVER_ERROR {
            tracing::error!("request failed: {self}");
        } else {
            tracing::debug!("request rejected: {self}");
        }

        let body = serde_json::json!({
            "error": self.message(),
            "status": status.as_u16(),
        });

        (status, Json(body)).into_response()
    }
}
