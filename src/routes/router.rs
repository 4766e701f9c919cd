//! Router assembly.
//!
//! Public routes (signup, login, health) are registered directly; everything
//! else goes through [`configure_api_routes`] behind the auth middleware.
//! CORS is restricted to the configured frontend origin, and every request
//! is traced.

use axum::http::{header, HeaderValue, Method};
use axum::routing::{get, post};
use axum::{middleware, Router};
use tower_http::cors::CorsLayer;
use tower_http::trace::TraceLayer;

use crate::auth::handlers::{login, signup};
use crate::middleware::auth::auth_middleware;
use crate::routes::api_routes::configure_api_routes;
use crate::server::config;
use crate::server::state::AppState;

/// Create the router with all routes, middleware, and layers configured.
pub fn create_router(app_state: AppState) -> Router<()> {
    let protected = configure_api_routes(Router::new()).route_layer(
        middleware::from_fn_with_state(app_state.clone(), auth_middleware),
    );

    Router::new()
        .route("/health", get(health))
        .route("/api/auth/signup", post(signup))
        .route("/api/auth/login", post(login))
        .merge(protected)
        .fallback(|| async { (axum::http::StatusCode::NOT_FOUND, "404 Not Found") })
        .layer(cors_layer())
        .layer(TraceLayer::new_for_http())
        .with_state(app_state)
}

async fn health() -> &'static str {
    "OK"
}

fn cors_layer() -> CorsLayer {
    let origin = config::frontend_url();
    match origin.parse::<HeaderValue>() {
        Ok(value) => CorsLayer::new()
            .allow_origin(value)
            .allow_methods([
                Method::GET,
                Method::POST,
                Method::PUT,
                Method::DELETE,
                Method::OPTIONS,
            ])
            .allow_headers([header::AUTHORIZATION, header::CONTENT_TYPE]),
        Err(_) => {
            tracing::warn!("invalid FRONTEND_URL {origin:?}, CORS disabled");
            CorsLayer::new()
        }
    }
}
