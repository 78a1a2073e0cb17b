//! Server configuration.

use std::collections::BTreeSet;
use std::net::{IpAddr, Ipv4Addr, SocketAddr};
use std::path::{Path, PathBuf};

use rand::distributions::Alphanumeric;
use rand::Rng;

use crate::server::error::Error;

/// Port used when neither `--port` nor `PORT` is given.
pub const DEFAULT_PORT: u16 = 3000;

/// Default `max-age` for served files, in seconds.
pub const DEFAULT_CACHE_SECONDS: u64 = 3600;

/// Names that never show up in a listing, whatever the user configures.
pub const ALWAYS_IGNORED: [&str; 2] = [".DS_Store", ".git/"];

const ASSET_NAMESPACE_LEN: usize = 24;

/// Immutable server configuration, built once at startup.
#[derive(Debug, Clone)]
pub struct ServerConfig {
    /// Address to bind to.
    pub host: IpAddr,
    /// Port to listen on.
    pub port: u16,
    /// `max-age` sent in `Cache-Control`.
    pub cache_seconds: u64,
    /// Serve the root `index.html` for anything that cannot be resolved.
    pub single_page: bool,
    /// Never gzip responses.
    pub gzip_disabled: bool,
    /// Listing display names to hide. Directories carry a trailing `/`.
    pub ignored_names: BTreeSet<String>,
    /// Absolute, canonical directory being served.
    pub root_directory: PathBuf,
    /// Random path segment under which the assets are mounted.
    pub asset_namespace: String,
    /// The maximum number of concurrent connections.
    pub max_connections: usize,
    /// The read buffer size for a request head.
    pub read_buffer_size: usize,
}

impl ServerConfig {
    /// Build a configuration serving `root` with default settings.
    ///
    /// Fails if `root` does not exist or is not a directory.
    pub fn new(root: impl AsRef<Path>) -> Result<Self, Error> {
        let root = root.as_ref();
        let root_directory = match root.canonicalize() {
            Ok(path) => path,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                return Err(Error::RootNotFound(root.to_path_buf()));
            }
            Err(e) => return Err(Error::IoError(e)),
        };
        if !root_directory.is_dir() {
            return Err(Error::RootNotDirectory(root_directory));
        }

        Ok(Self {
            host: IpAddr::V4(Ipv4Addr::UNSPECIFIED),
            port: DEFAULT_PORT,
            cache_seconds: DEFAULT_CACHE_SECONDS,
            single_page: false,
            gzip_disabled: false,
            ignored_names: ALWAYS_IGNORED.iter().map(|name| name.to_string()).collect(),
            root_directory,
            asset_namespace: generate_asset_namespace(),
            max_connections: 1024,
            read_buffer_size: 8192,
        })
    }

    pub fn with_host(mut self, host: IpAddr) -> Self {
        self.host = host;
        self
    }

    pub fn with_port(mut self, port: u16) -> Self {
        self.port = port;
        self
    }

    pub fn with_cache_seconds(mut self, seconds: u64) -> Self {
        self.cache_seconds = seconds;
        self
    }

    pub fn with_single_page(mut self, enabled: bool) -> Self {
        self.single_page = enabled;
        self
    }

    pub fn with_gzip_disabled(mut self, disabled: bool) -> Self {
        self.gzip_disabled = disabled;
        self
    }

    /// Add names to hide from listings. Blank entries are skipped and the
    /// built-in names stay in place.
    pub fn with_ignored<I, S>(mut self, names: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        self.ignored_names.extend(
            names
                .into_iter()
                .map(|name| name.as_ref().trim().to_string())
                .filter(|name| !name.is_empty()),
        );
        self
    }

    pub fn with_max_connections(mut self, max: usize) -> Self {
        self.max_connections = max;
        self
    }

    /// The socket address the listener binds to.
    pub fn addr(&self) -> SocketAddr {
        SocketAddr::new(self.host, self.port)
    }

    /// Whether a listing entry with this display name is hidden.
    pub fn is_ignored(&self, display_name: &str) -> bool {
        self.ignored_names.contains(display_name)
    }
}

fn generate_asset_namespace() -> String {
    rand::thread_rng()
        .sample_iter(&Alphanumeric)
        .take(ASSET_NAMESPACE_LEN)
        .map(char::from)
        .collect()
}
