use clap::Parser;
use log::error;

use dirserve::cli::Cli;
use dirserve::HttpServer;

#[tokio::main]
async fn main() {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    let config = match Cli::parse().into_config() {
        Ok(config) => config,
        Err(e) => {
            error!("{e}");
            std::process::exit(1);
        }
    };

    let result = match HttpServer::new(config) {
        Ok(server) => server.start().await,
        Err(e) => Err(e),
    };

    if let Err(e) = result {
        error!("{e}");
        std::process::exit(1);
    }
}
