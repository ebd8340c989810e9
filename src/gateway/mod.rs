//! HTTP Gateway
//!
//! Receives Telegram webhook calls and exposes the visibility report over
//! plain JSON.

mod handlers;
mod server;

pub use handlers::SECRET_HEADER;
pub use server::{AppState, GatewayParams, build_router, start_server};
