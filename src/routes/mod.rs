//! Route configuration.
//!
//! - `router` - router assembly, CORS, tracing layers
//! - `api_routes` - the protected `/api` surface

pub mod api_routes;
pub mod router;

pub use router::create_router;
