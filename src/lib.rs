//! A small static file server.
//!
//! Serves a directory over HTTP with browsable listings, single-page
//! application fallback, conditional caching and gzip compression.
//!
//! # Features
//!
//! - Files are served with a content type guessed from the extension, or
//!   from the bytes when the extension is unknown
//! - `ETag`, `Cache-Control` and `If-Modified-Since` / 304 handling
//! - Directory listings with breadcrumbs, hiding `.DS_Store`, `.git/` and
//!   any configured names
//! - `index.html` inside a directory replaces its listing
//! - Optional single-page mode: unresolved paths serve the root `index.html`
//! - Custom `404.html` at the root
//! - Gzip for textual responses unless disabled
//!
//! # Examples
//!
//! ## Handling a request without a socket
//!
//! ```no_run
//! use std::sync::Arc;
//!
//! use dirserve::{parse_request, RequestHandler, ServerConfig, StatusCode};
//!
//! # async fn run() -> Result<(), dirserve::ServerError> {
//! let config = ServerConfig::new("./public")?.with_single_page(true);
//! let handler = RequestHandler::new(Arc::new(config))?;
//!
//! let request = parse_request(b"GET /a.txt HTTP/1.1\r\nHost: localhost\r\n\r\n")?;
//! let response = handler.handle(&request).await?;
//! assert_eq!(response.status, StatusCode::Ok);
//! # Ok(())
//! # }
//! ```
//!
//! ## Running the server
//!
//! ```no_run
//! use dirserve::{HttpServer, ServerConfig};
//!
//! # async fn run() -> Result<(), dirserve::ServerError> {
//! let config = ServerConfig::new(".")?.with_port(8080).with_ignored(["target/"]);
//! HttpServer::new(config)?.start().await?;
//! # Ok(())
//! # }
//! ```

pub mod cli;

pub mod parser;

pub mod resource;

pub mod server;

// Re-export commonly used items for convenience
pub use parser::{Error as ParserError, HttpRequest, HttpVersion, Method, parse_request};
pub use resource::ResolvedTarget;
pub use server::{Error as ServerError, HttpResponse, HttpServer, RequestHandler, ServerConfig, StatusCode};
