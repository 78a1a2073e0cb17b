//! Request resolution and response building blocks.
//!
//! Maps request paths onto the served directory, renders directory listings,
//! classifies file contents and negotiates conditional caching. The
//! [`RequestHandler`](crate::server::RequestHandler) drives these per request.

mod assets;
mod cache;
mod classify;
mod listing;
mod resolver;
mod tests;

pub use assets::{embedded_asset, EmbeddedAsset};
pub use cache::{negotiate, parse_http_date, CacheMetadata, FileIdentity};
pub use classify::{content_type, content_type_for, extension_of, is_binary};
pub use listing::{breadcrumbs, format_size, list_entries, Breadcrumb, DirectoryEntry, DirectoryRenderer};
pub use resolver::{PathResolver, ResolvedTarget};
