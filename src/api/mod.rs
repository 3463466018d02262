//! API module for HTTP endpoints
//!
//! Thin request/response plumbing over the `LogController`.

pub mod http;
pub mod rest;
pub mod state;

pub use http::create_router;
pub use state::AppState;
