//! Command-line configuration.

use std::net::{IpAddr, Ipv4Addr, SocketAddr};
use std::path::PathBuf;

use clap::Parser;

use crate::api::Mode;

#[derive(Clone, Debug, Parser)]
#[command(name = "articles")]
#[command(about = "In-memory article CRUD service")]
#[command(version = env!("CARGO_PKG_VERSION"))]
pub struct Config {
    #[arg(long, default_value_t = IpAddr::V4(Ipv4Addr::UNSPECIFIED))]
    pub host: IpAddr,

    #[arg(short, long, default_value_t = 8000)]
    pub port: u16,

    /// Directory served under /swaggerui/
    #[arg(long, default_value = "./swaggerui")]
    pub assets: PathBuf,

    /// Answer misses and malformed bodies with 200 instead of 404/400
    #[arg(long)]
    pub lenient: bool,

    /// Disable the cross-origin policy
    #[arg(long)]
    pub no_cors: bool,

    /// Log filter used when RUST_LOG is unset
    #[arg(long, default_value = "info")]
    pub log_level: String,

    #[arg(long)]
    pub json_logs: bool,
}

impl Config {
    pub fn addr(&self) -> SocketAddr {
        SocketAddr::new(self.host, self.port)
    }

    pub fn mode(&self) -> Mode {
        if self.lenient { Mode::Lenient } else { Mode::Strict }
    }
}
