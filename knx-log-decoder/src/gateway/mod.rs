//! Bus gateway access
//!
//! Telegrams are received from a knxd daemon through its client socket
//! protocol. The daemon is addressed with the same URL syntax its own tools
//! use:
//!
//! - `ip:<host>[:<port>]` - TCP, port 6720 by default
//! - `local:<path>` - Unix domain socket (e.g. `local:/run/knx`)
//!
//! Every source implements [`TelegramSource`], a blocking pull interface that
//! can be turned into an endless iterator of telegrams.

use crate::types::{DecoderError, Result, Telegram};
use std::fmt;
use std::path::PathBuf;
use std::str::FromStr;

pub mod knxd;

// Re-export gateway types
pub use knxd::{BusStream, KnxdConnection};

/// Default TCP port of the knxd client socket
pub const DEFAULT_PORT: u16 = 6720;

/// Something that delivers bus telegrams one at a time
pub trait TelegramSource {
    /// Block until the next telegram arrives
    fn next_telegram(&mut self) -> Result<Telegram>;

    /// Turn this source into an iterator that never ends on its own
    fn telegrams(self) -> Telegrams<Self>
    where
        Self: Sized,
    {
        Telegrams { source: self }
    }
}

/// Iterator over the telegrams of a [`TelegramSource`]
///
/// Yields `Err` items for failed receptions; the consumer decides whether to
/// stop.
#[derive(Debug)]
pub struct Telegrams<S> {
    source: S,
}

impl<S: TelegramSource> Iterator for Telegrams<S> {
    type Item = Result<Telegram>;

    fn next(&mut self) -> Option<Self::Item> {
        Some(self.source.next_telegram())
    }
}

/// Location of a knxd client socket
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum BusUrl {
    /// TCP connection (`ip:host[:port]`)
    Ip { host: String, port: u16 },
    /// Unix domain socket (`local:/path`)
    Local(PathBuf),
}

impl BusUrl {
    /// Parse a knxd URL
    pub fn parse(url: &str) -> Result<Self> {
        if let Some(path) = url.strip_prefix("local:") {
            if path.is_empty() {
                return Err(DecoderError::InvalidUrl(format!("'{}': missing socket path", url)));
            }
            return Ok(BusUrl::Local(PathBuf::from(path)));
        }

        if let Some(target) = url.strip_prefix("ip:") {
            let (host, port) = match target.split_once(':') {
                Some((host, port)) => {
                    let port = port.parse::<u16>().map_err(|_| {
                        DecoderError::InvalidUrl(format!("'{}': invalid port '{}'", url, port))
                    })?;
                    (host, port)
                }
                None => (target, DEFAULT_PORT),
            };

            let host = if host.is_empty() { "localhost" } else { host };
            return Ok(BusUrl::Ip {
                host: host.to_string(),
                port,
            });
        }

        Err(DecoderError::InvalidUrl(format!(
            "'{}': expected ip:<host>[:<port>] or local:<path>",
            url
        )))
    }
}

impl FromStr for BusUrl {
    type Err = DecoderError;

    fn from_str(s: &str) -> Result<Self> {
        Self::parse(s)
    }
}

impl fmt::Display for BusUrl {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            BusUrl::Ip { host, port } => write!(f, "ip:{}:{}", host, port),
            BusUrl::Local(path) => write!(f, "local:{}", path.display()),
        }
    }
}
