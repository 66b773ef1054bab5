//! realty-server: HTTP API for property listings and two-party chats
//!
//! Listings can be filtered publicly, created and edited by their owners,
//! and bookmarked by any signed-in user. Chats connect exactly two users.
//! Identity comes from a signed token in the `token` cookie.

pub mod auth;
pub mod db;
pub mod http;
pub mod models;

pub use http::{build_router, run_server, ApiError, AppState, ServerConfig, ServerError};
