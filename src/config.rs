//! Server configuration from environment variables
//!
//! - `HOSTINFO_HOST` - IP address to bind (default `0.0.0.0`)
//! - `HOSTINFO_PORT` - TCP port to bind (default `5000`)

use std::net::{IpAddr, Ipv4Addr, SocketAddr};
use thiserror::Error;

/// Default bind port
pub const DEFAULT_PORT: u16 = 5000;

pub const HOST_ENV: &str = "HOSTINFO_HOST";
pub const PORT_ENV: &str = "HOSTINFO_PORT";

#[derive(Debug, Error, PartialEq, Eq)]
pub enum ConfigError {
    #[error("HOSTINFO_HOST={0:?} is not a valid IP address")]
    InvalidHost(String),

    #[error("HOSTINFO_PORT={0:?} is not a valid port")]
    InvalidPort(String),
}

/// Listen address for the HTTP server
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Config {
    pub bind_addr: SocketAddr,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            bind_addr: SocketAddr::new(IpAddr::V4(Ipv4Addr::UNSPECIFIED), DEFAULT_PORT),
        }
    }
}

impl Config {
    /// Read configuration from the process environment
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Read configuration through an arbitrary variable lookup
    ///
    /// Unset or blank variables fall back to defaults; anything else must parse.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let defaults = Self::default();

        let ip = match non_blank(lookup(HOST_ENV)) {
            Some(v) => v.parse::<IpAddr>().map_err(|_| ConfigError::InvalidHost(v))?,
            None => defaults.bind_addr.ip(),
        };

        let port = match non_blank(lookup(PORT_ENV)) {
            Some(v) => v.parse::<u16>().map_err(|_| ConfigError::InvalidPort(v))?,
            None => defaults.bind_addr.port(),
        };

        Ok(Self {
            bind_addr: SocketAddr::new(ip, port),
        })
    }
}

fn non_blank(value: Option<String>) -> Option<String> {
    value
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
}

#[cfg(test)]
#[path = "config_test.rs"]
mod tests;
