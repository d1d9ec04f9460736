// ABOUTME: HTTP request API: /chat, /chat/stream (SSE), tenant/document admin routes, auth middleware
// ABOUTME: WebServer::build_app(state) -> Router is the seam meridian-cli depends on to serve the process

#![warn(missing_debug_implementations)]

pub mod auth;
pub mod config;
pub mod error;
pub mod routes;
pub mod server;
pub mod state;

pub use config::WebConfig;
pub use error::ApiError;
pub use server::WebServer;
pub use state::AppState;

pub mod prelude {
    pub use crate::{AppState, WebConfig, WebServer};
}
