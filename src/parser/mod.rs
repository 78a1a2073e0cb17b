//! HTTP request parser.
//!
//! Reads the request line and header block of a single HTTP/1.x request.
//! Bodies are never consumed: every request is served as a read.

mod request;
mod method;
mod version;
mod error;

// Re-export public items
pub use request::HttpRequest;
pub use method::Method;
pub use version::HttpVersion;
pub use error::Error;

pub use request::parse_request;
