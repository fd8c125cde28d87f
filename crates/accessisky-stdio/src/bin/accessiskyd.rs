use std::io;

use accessisky_stdio::{ServerConfig, ViewingServer};
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;
use tracing_subscriber::EnvFilter;

fn main() -> io::Result<()> {
    // stdout carries the protocol; logs go to stderr.
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn"));
    let _ = tracing_subscriber::registry()
        .with(filter)
        .with(tracing_subscriber::fmt::layer().with_writer(io::stderr))
        .try_init();

    let config = ServerConfig::from_env().map_err(io::Error::other)?;
    let server = ViewingServer::new(config).map_err(io::Error::other)?;
    tracing::info!("accessiskyd serving on stdio");
    server.serve_stdio()
}
