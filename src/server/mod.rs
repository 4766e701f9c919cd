//! Server assembly: configuration, shared state, initialization.

pub mod config;
pub mod init;
pub mod state;

pub use init::{build_app, create_app};
pub use state::AppState;
