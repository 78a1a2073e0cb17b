//! Command line arguments.

use std::net::{IpAddr, Ipv4Addr};
use std::path::PathBuf;

use clap::Parser;

use crate::server::{Error, ServerConfig, DEFAULT_CACHE_SECONDS, DEFAULT_PORT};

#[derive(Debug, Parser)]
#[command(name = "dirserve", version, about = "Serve a directory over HTTP", long_about = None)]
pub struct Cli {
    /// Directory to serve
    #[arg(default_value = ".")]
    pub directory: PathBuf,

    /// Address to bind to
    #[arg(long, default_value_t = IpAddr::V4(Ipv4Addr::UNSPECIFIED))]
    pub host: IpAddr,

    /// Port to listen on
    #[arg(short, long, env = "PORT", default_value_t = DEFAULT_PORT)]
    pub port: u16,

    /// Time in seconds for caching files
    #[arg(short, long = "cache", default_value_t = DEFAULT_CACHE_SECONDS)]
    pub cache: u64,

    /// Serve the root index.html for paths that do not resolve
    #[arg(short, long, default_value_t = false)]
    pub single: bool,

    /// Disable gzip compression
    #[arg(short, long, default_value_t = false)]
    pub unzipped: bool,

    /// Names to hide from listings, comma separated (directories end in /)
    #[arg(short, long, value_delimiter = ',')]
    pub ignore: Vec<String>,
}

impl Cli {
    /// Validate the arguments into a configuration. Fails if the directory
    /// does not exist.
    pub fn into_config(self) -> Result<ServerConfig, Error> {
        Ok(ServerConfig::new(&self.directory)?
            .with_host(self.host)
            .with_port(self.port)
            .with_cache_seconds(self.cache)
            .with_single_page(self.single)
            .with_gzip_disabled(self.unzipped)
            .with_ignored(self.ignore))
    }
}
