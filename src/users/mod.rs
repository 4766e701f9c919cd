//! User profile and account lifecycle endpoints.

pub mod handlers;
