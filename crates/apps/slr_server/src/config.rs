use std::net::SocketAddr;

use clap::Parser;

pub const DEFAULT_ADDR: &str = "127.0.0.1:9200";

#[derive(Parser, Debug, Clone)]
#[command(author, version, about = "Backend for the LiDAR / sea-level-rise map")]
pub struct ServerArgs {
    /// Address to listen on
    #[arg(long, env = "SLR_ADDR", default_value = DEFAULT_ADDR)]
    pub addr: SocketAddr,

    /// GeoJSON endpoint serving NOAA sea-level-rise polygons. When unset the
    /// overlay is served empty.
    #[arg(long, env = "SLR_OVERLAY_URL")]
    pub overlay_url: Option<String>,

    /// Timeout for the one-shot overlay fetch, in seconds
    #[arg(long, env = "SLR_FETCH_TIMEOUT_SECS", default_value_t = 30)]
    pub fetch_timeout_secs: u64,
}
