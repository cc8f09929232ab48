//! Environment-backed configuration for the `spool` server.
//!
//! Every setting has a default. Override with `SPOOL_*` environment variables.

pub mod error;


pub use error::ConfigError;

use std::env;
use std::net::IpAddr;
use std::path::PathBuf;

use crate::middleware::DEFAULT_CHUNK_SIZE;

/// Server configuration loaded from environment variables.
///
/// Use [`Config::from_env`] to read `SPOOL_*` overrides on top of defaults.
#[derive(Debug, Clone)]
pub struct Config {
    /// HTTP server port. Default: `8080`.
    pub port: u16,

    /// IP address to bind to. Default: `127.0.0.1`.
    pub bind_addr: IpAddr,

    /// Directory served (and cached) by the binary. Default: `./public`.
    pub root_dir: PathBuf,

    /// Bytes per relayed body chunk. Default: [`DEFAULT_CHUNK_SIZE`].
    pub chunk_size: usize,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            port: 8080,
            bind_addr: IpAddr::V4(std::net::Ipv4Addr::new(127, 0, 0, 1)),
            root_dir: PathBuf::from("./public"),
            chunk_size: DEFAULT_CHUNK_SIZE,
        }
    }
}

impl Config {
    const ENV_PORT: &'static str = "SPOOL_PORT";
    const ENV_BIND_ADDR: &'static str = "SPOOL_BIND_ADDR";
    const ENV_ROOT: &'static str = "SPOOL_ROOT";
    const ENV_CHUNK_SIZE: &'static str = "SPOOL_CHUNK_SIZE";

    /// Loads configuration from environment variables (falling back to defaults).
    pub fn from_env() -> Result<Self, ConfigError> {
        let defaults = Self::default();

        let port = Self::parse_port_from_env(defaults.port)?;
        let bind_addr = Self::parse_bind_addr_from_env(defaults.bind_addr)?;
        let root_dir = Self::parse_path_from_env(Self::ENV_ROOT, defaults.root_dir);
        let chunk_size = Self::parse_chunk_size_from_env(defaults.chunk_size)?;

        Ok(Self {
            port,
            bind_addr,
            root_dir,
            chunk_size,
        })
    }

    /// Validates paths and basic invariants (does not create directories).
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.root_dir.exists() && !self.root_dir.is_dir() {
            return Err(ConfigError::NotADirectory {
                path: self.root_dir.clone(),
            });
        }

        if self.chunk_size == 0 {
            return Err(ConfigError::InvalidChunkSize {
                value: self.chunk_size.to_string(),
            });
        }

        Ok(())
    }

    /// Returns `"{bind_addr}:{port}"` (useful for logging/binding).
    pub fn socket_addr(&self) -> String {
        format!("{}:{}", self.bind_addr, self.port)
    }

    fn parse_port_from_env(default: u16) -> Result<u16, ConfigError> {
        match env::var(Self::ENV_PORT) {
            Ok(value) => {
                let port: u16 = value.parse().map_err(|e| ConfigError::PortParseError {
                    value: value.clone(),
                    source: e,
                })?;

                if port == 0 {
                    return Err(ConfigError::InvalidPort { value });
                }

                Ok(port)
            }
            Err(_) => Ok(default),
        }
    }

    fn parse_bind_addr_from_env(default: IpAddr) -> Result<IpAddr, ConfigError> {
        match env::var(Self::ENV_BIND_ADDR) {
            Ok(value) => value
                .parse()
                .map_err(|e| ConfigError::InvalidBindAddr { value, source: e }),
            Err(_) => Ok(default),
        }
    }

    fn parse_chunk_size_from_env(default: usize) -> Result<usize, ConfigError> {
        match env::var(Self::ENV_CHUNK_SIZE) {
            Ok(value) => match value.trim().parse::<usize>() {
                Ok(size) if size > 0 => Ok(size),
                _ => Err(ConfigError::InvalidChunkSize { value }),
            },
            Err(_) => Ok(default),
        }
    }

    fn parse_path_from_env(var_name: &str, default: PathBuf) -> PathBuf {
        env::var(var_name)
            .ok()
            .map(|v| v.trim().to_string())
            .filter(|v| !v.is_empty())
            .map(PathBuf::from)
            .unwrap_or(default)
    }
}
