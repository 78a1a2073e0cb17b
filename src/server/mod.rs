//! The file server: configuration, request handling and the TCP listener.

mod response;
mod compression;
mod config;
mod error;
mod handler;
mod http_server;

// Re-export public items
pub use response::{HttpResponse, StatusCode};
pub use compression::gzip_response;
pub use config::{ServerConfig, ALWAYS_IGNORED, DEFAULT_CACHE_SECONDS, DEFAULT_PORT};
pub use error::Error;
pub use handler::RequestHandler;
pub use http_server::{HttpServer, HOSTED_ENV_VAR};
