//! HTTP handlers for the auth endpoints.

pub mod login;
pub mod me;
pub mod signup;
pub mod types;

pub use login::login;
pub use me::me;
pub use signup::signup;
