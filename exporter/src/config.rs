use crate::errors::{Error, Result};
use crate::locations::{ChannelLocations, ChannelMatcher};
use crate::EXIT_FATAL;
use clap::Parser;
use std::net::{Ipv4Addr, SocketAddr};

/// Exports rtl_433 F007TH sensor readings from a serial receiver as Prometheus metrics.
#[derive(Debug, Clone, Parser)]
#[command(version, about)]
pub struct Args {
    /// Serial port to read from ("-" reads standard input)
    #[arg(long, env = "RTL433_SERIAL", default_value = "/dev/ttyACM0")]
    pub serial: String,

    /// Address to listen on; ":port" listens on all IPv4 interfaces only,
    /// use "[::]:port" for IPv6
    #[arg(long, env = "RTL433_LISTEN", default_value = ":9550")]
    pub listen: String,

    /// Path the metrics are served on
    #[arg(long, env = "RTL433_METRICS_PATH", default_value = "/metrics")]
    pub metrics_path: String,

    /// Channel to location mapping, e.g. "1,Bedroom"; may be repeated
    #[arg(
        long = "channel-matcher",
        env = "RTL433_CHANNEL_MATCHERS",
        value_delimiter = ';'
    )]
    pub channel_matchers: Vec<String>,
}

#[derive(Debug, Clone)]
pub struct Config {
    pub serial: String,
    pub listen: SocketAddr,
    pub metrics_path: String,
    pub locations: ChannelLocations,
}

impl Config {
    pub fn from_args(args: Args) -> Result<Self> {
        let matchers = args
            .channel_matchers
            .iter()
            .map(|m| m.parse::<ChannelMatcher>())
            .collect::<Result<Vec<_>>>()?;

        if !is_plain_route(&args.metrics_path) {
            return Err(Error::MetricsPath(args.metrics_path));
        }

        Ok(Self {
            listen: parse_listen_addr(&args.listen)?,
            serial: args.serial,
            metrics_path: args.metrics_path,
            locations: ChannelLocations::new(matchers),
        })
    }
}

/// A literal route: rooted, with no `:param` or `*wildcard` syntax the
/// router would interpret.
fn is_plain_route(path: &str) -> bool {
    path.starts_with('/') && !path.contains(&[':', '*'][..])
}

/// Exit status for a failed command line parse. Help and version requests
/// succeed; usage errors count as startup failures so they never look like
/// a closed device stream.
pub fn usage_exit_code(err: &clap::Error) -> i32 {
    if err.use_stderr() {
        EXIT_FATAL
    } else {
        0
    }
}

/// Accepts `host:port` socket addresses as well as the bare `:port` form.
pub fn parse_listen_addr(addr: &str) -> Result<SocketAddr> {
    let invalid = || Error::ListenAddr(addr.to_string());
    match addr.strip_prefix(':') {
        Some(port) => {
            let port = port.parse::<u16>().map_err(|_| invalid())?;
            Ok(SocketAddr::from((Ipv4Addr::UNSPECIFIED, port)))
        }
        None => addr.parse().map_err(|_| invalid()),
    }
}
