//! MCP server: dispatch service and transports

mod http;
mod router;
mod service;
pub mod stdio;

pub use http::HttpServer;
pub use router::{AppState, create_router};
pub use service::McpService;
