//! # CodeSync Web
//!
//! Local transport between the editor extension and the Grasshopper host.
//!
//! This crate provides:
//! - A WebSocket endpoint speaking the `setScript` / `healthCheck` envelopes
//! - A small HTTP API for health checks and exporting a component
//! - The host executor that runs every component update on one thread

#![warn(clippy::all)]

pub mod handler;
pub mod host;
pub mod protocol;
pub mod server;

pub use handler::MessageHandler;
pub use host::{HostError, HostExecutor, HostHandle};
pub use protocol::{ClientMessage, ProtocolError, ServerMessage};
pub use server::{run_session, AppState, WebServer, WebServerConfig};

/// Web server version information
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Default web server configuration
impl Default for WebServerConfig {
    fn default() -> Self {
        Self {
            host: "127.0.0.1".to_string(),
            port: 51234,
            enable_cors: true,
        }
    }
}
